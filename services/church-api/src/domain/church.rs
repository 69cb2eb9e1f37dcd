/// 教会（コミュニティ）とその配下のイベント
///
/// Churchは常に`follower_count == members.len()`を満たし、membersに重複を持たない。
/// 作成時は作成者のみがメンバー（follower_count = 1）。
use chrono::DateTime;
use serde::{Deserialize, Serialize};

use super::validation::{optional_text, ValidationErrors};

/// GET /churches が返す最大件数
pub const CHURCH_LIST_LIMIT: usize = 50;

/// POST /churches のリクエストボディ
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChurchInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// 検証済みの教会作成内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChurchDraft {
    pub name: String,
    pub description: String,
    pub location: Option<String>,
}

/// 教会ドキュメント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Church {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub owner_id: String,
    pub members: Vec<String>,
    pub follower_count: u64,
    pub created_at: String,
}

impl Church {
    /// 作成者を唯一のメンバーとして新しい教会を作る
    pub fn founded(id: String, owner_id: String, draft: ChurchDraft, created_at: String) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            location: draft.location,
            members: vec![owner_id.clone()],
            owner_id,
            follower_count: 1,
            created_at,
        }
    }

    pub fn is_member(&self, member_id: &str) -> bool {
        self.members.iter().any(|m| m == member_id)
    }
}

impl CreateChurchInput {
    pub fn validate(self) -> Result<ChurchDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.require_text("name", self.name);

        match name {
            Some(name) => Ok(ChurchDraft {
                name,
                description: optional_text(self.description).unwrap_or_default(),
                location: optional_text(self.location),
            }),
            None => Err(errors),
        }
    }
}

/// join操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// 新たにメンバーとして追加された（追加後のフォロワー数）
    Joined { follower_count: u64 },
    /// 既にメンバーだった（何も変更していない）
    AlreadyMember,
}

/// POST /churches/:churchId/events のリクエストボディ
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChurchEventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// RFC 3339形式の開始日時
    pub starts_at: Option<String>,
}

/// 検証済みのイベント作成内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChurchEventDraft {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<String>,
}

/// 教会配下のイベントドキュメント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurchEvent {
    pub church_id: String,
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    pub created_by: String,
    pub created_at: String,
}

impl ChurchEvent {
    pub fn new(
        church_id: String,
        id: String,
        created_by: String,
        draft: ChurchEventDraft,
        created_at: String,
    ) -> Self {
        Self {
            church_id,
            id,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            starts_at: draft.starts_at,
            created_by,
            created_at,
        }
    }
}

impl CreateChurchEventInput {
    pub fn validate(self) -> Result<ChurchEventDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = errors.require_text("title", self.title);

        let starts_at = optional_text(self.starts_at);
        if let Some(starts_at) = &starts_at {
            if DateTime::parse_from_rfc3339(starts_at).is_err() {
                errors.push("startsAt", "startsAt must be an RFC 3339 timestamp");
            }
        }

        match title {
            Some(title) if errors.is_empty() => Ok(ChurchEventDraft {
                title,
                description: optional_text(self.description),
                location: optional_text(self.location),
                starts_at,
            }),
            _ => Err(errors),
        }
    }
}
