/// 教会フォロー（join）のメンバーシップサービス
///
/// 1人のメンバーは教会に高々1回だけ追加され、フォロワー数は常にメンバー数と一致する。
/// 原子性はリポジトリ実装（DynamoDBの条件付き更新、またはメモリストアのロック）が担う。
use std::sync::Arc;

use thiserror::Error;

use crate::domain::JoinOutcome;
use crate::infrastructure::{AddMemberResult, ChurchRepository, RepositoryError};

/// メンバーシップ操作のエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    /// メンバーIDが空
    #[error("Member id must not be empty")]
    InvalidMember,
    /// 教会が存在しない
    #[error("Church not found: {0}")]
    CommunityNotFound(String),
    /// ストアに到達できない（変更は一切コミットされていない）
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<RepositoryError> for MembershipError {
    fn from(err: RepositoryError) -> Self {
        MembershipError::StoreUnavailable(err.to_string())
    }
}

/// 教会メンバーシップサービス
#[derive(Clone)]
pub struct MembershipService {
    churches: Arc<dyn ChurchRepository>,
}

impl MembershipService {
    pub fn new(churches: Arc<dyn ChurchRepository>) -> Self {
        Self { churches }
    }

    /// メンバーを教会に参加させる
    ///
    /// # 戻り値
    /// * 新規参加なら`Ok(JoinOutcome::Joined)`（参加後のフォロワー数）
    /// * 既にメンバーなら`Ok(JoinOutcome::AlreadyMember)`（何も変更しない）
    /// * 教会が無ければ`Err(MembershipError::CommunityNotFound)`
    /// * ストア障害なら`Err(MembershipError::StoreUnavailable)`
    pub async fn join(
        &self,
        church_id: &str,
        member_id: &str,
    ) -> Result<JoinOutcome, MembershipError> {
        let member_id = member_id.trim();
        if member_id.is_empty() {
            return Err(MembershipError::InvalidMember);
        }

        let result = self
            .churches
            .add_member(church_id, member_id)
            .await
            .map_err(|e| {
                tracing::error!(church_id = church_id, member_id = member_id, error = %e, "教会参加の書き込み失敗");
                MembershipError::from(e)
            })?;

        match result {
            AddMemberResult::Added { follower_count } => {
                tracing::info!(
                    church_id = church_id,
                    member_id = member_id,
                    follower_count = follower_count,
                    "教会に参加"
                );
                Ok(JoinOutcome::Joined { follower_count })
            }
            AddMemberResult::AlreadyMember => {
                tracing::debug!(church_id = church_id, member_id = member_id, "既にメンバー");
                Ok(JoinOutcome::AlreadyMember)
            }
            AddMemberResult::ChurchNotFound => {
                tracing::warn!(church_id = church_id, "参加対象の教会が存在しない");
                Err(MembershipError::CommunityNotFound(church_id.to_string()))
            }
        }
    }
}
