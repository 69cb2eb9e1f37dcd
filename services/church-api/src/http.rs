// HTTP層モジュール
pub mod auth;
pub mod error;
pub mod handlers;
pub mod json;
pub mod router;
pub mod state;

// 再エクスポート
pub use error::ApiError;
pub use router::{create_router, create_unready_router};
pub use state::{AppState, StartupError};
