// アプリケーション層モジュール
pub mod membership_service;

// 再エクスポート
pub use membership_service::{MembershipError, MembershipService};
