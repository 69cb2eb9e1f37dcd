/// 認証済みの呼び出し元
///
/// 外部IDプロバイダーが発行したトークンのsubjectをそのまま利用者IDとして扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// IDプロバイダー上の利用者ID（トークンの`sub`）
    pub user_id: String,
}

impl AuthenticatedUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
