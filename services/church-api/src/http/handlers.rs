// ルートハンドラー
pub mod churches;
pub mod content;
pub mod media;
pub mod posts;
pub mod users;
