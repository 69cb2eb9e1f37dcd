/// 投稿とリアクション
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::validation::{is_http_url, optional_text, ValidationErrors};

/// GET /posts が返す最大件数
pub const LATEST_POSTS_LIMIT: usize = 20;

/// リアクション名の最大長
pub const MAX_REACTION_NAME_LENGTH: usize = 32;

/// POST /posts のリクエストボディ
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub church_id: Option<String>,
}

/// 検証済みの投稿内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub content: String,
    pub media_url: Option<String>,
    pub church_id: Option<String>,
}

/// 保存済み投稿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub church_id: Option<String>,
    /// リアクション名 -> 件数
    #[serde(default)]
    pub reactions: BTreeMap<String, u64>,
    pub created_at: String,
}

impl Post {
    /// 新規投稿を作成（リアクションは空）
    pub fn new(id: String, author_id: String, draft: PostDraft, created_at: String) -> Self {
        Self {
            id,
            author_id,
            content: draft.content,
            media_url: draft.media_url,
            church_id: draft.church_id,
            reactions: BTreeMap::new(),
            created_at,
        }
    }
}

impl CreatePostInput {
    pub fn validate(self) -> Result<PostDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let content = errors.require_text("content", self.content);
        let media_url = optional_text(self.media_url);
        if let Some(url) = &media_url {
            if !is_http_url(url) {
                errors.push("mediaUrl", "mediaUrl must be an http(s) URL");
            }
        }

        match content {
            Some(content) if errors.is_empty() => Ok(PostDraft {
                content,
                media_url,
                church_id: optional_text(self.church_id),
            }),
            _ => Err(errors),
        }
    }
}

/// POST /posts/:postId/react のリクエストボディ
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReactInput {
    pub reaction: Option<String>,
}

impl ReactInput {
    /// リアクション名を検証する
    ///
    /// 1〜32文字のASCII英数字とアンダースコアのみ許可。
    pub fn validate(self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let reaction = errors.require_text("reaction", self.reaction);

        match reaction {
            Some(reaction) if is_valid_reaction_name(&reaction) => Ok(reaction),
            Some(_) => Err(ValidationErrors::single(
                "reaction",
                format!(
                    "reaction must be 1-{} characters of letters, digits or '_'",
                    MAX_REACTION_NAME_LENGTH
                ),
            )),
            None => Err(errors),
        }
    }
}

pub fn is_valid_reaction_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_REACTION_NAME_LENGTH
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_input_validates_content() {
        let draft = CreatePostInput {
            content: Some(" Sunday service was great ".to_string()),
            media_url: None,
            church_id: Some("c1".to_string()),
        }
        .validate()
        .unwrap();

        assert_eq!(draft.content, "Sunday service was great");
        assert_eq!(draft.church_id, Some("c1".to_string()));
    }

    #[test]
    fn test_create_post_input_rejects_empty_content() {
        let errors = CreatePostInput::default().validate().unwrap_err();
        assert_eq!(errors.errors()[0].field, "content");
    }

    #[test]
    fn test_create_post_input_rejects_bad_media_url() {
        let errors = CreatePostInput {
            content: Some("hi".to_string()),
            media_url: Some("not a url".to_string()),
            church_id: None,
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.errors()[0].field, "mediaUrl");
    }

    #[test]
    fn test_new_post_has_no_reactions() {
        let draft = PostDraft {
            content: "hello".to_string(),
            media_url: None,
            church_id: None,
        };
        let post = Post::new("p1".to_string(), "u1".to_string(), draft, "t".to_string());

        assert!(post.reactions.is_empty());
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["authorId"], "u1");
        assert_eq!(json["reactions"], serde_json::json!({}));
        assert!(json.get("mediaUrl").is_none());
    }

    #[test]
    fn test_reaction_names() {
        assert!(is_valid_reaction_name("like"));
        assert!(is_valid_reaction_name("praying_hands"));
        assert!(!is_valid_reaction_name(""));
        assert!(!is_valid_reaction_name("a.b"));
        assert!(!is_valid_reaction_name("has space"));
        assert!(!is_valid_reaction_name(&"x".repeat(MAX_REACTION_NAME_LENGTH + 1)));
    }

    #[test]
    fn test_react_input_validate() {
        let reaction = ReactInput {
            reaction: Some("amen".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(reaction, "amen");

        assert!(ReactInput { reaction: None }.validate().is_err());
        assert!(ReactInput {
            reaction: Some("#bad".to_string())
        }
        .validate()
        .is_err());
    }
}
