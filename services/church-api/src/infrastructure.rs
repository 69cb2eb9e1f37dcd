// Infrastructure layer modules
pub mod church_repository;
pub mod config;
pub mod dynamo_item;
pub mod friend_request_repository;
pub mod logging;
pub mod media_repository;
pub mod memory_store;
pub mod post_repository;
pub mod repository_error;
pub mod static_content_config;
pub mod token_verifier;
pub mod user_repository;

// Re-exports
pub use church_repository::{AddMemberResult, ChurchRepository, DynamoChurchRepository};
pub use config::{ConfigError, DynamoDbConfig, TableNames};
pub use friend_request_repository::{DynamoFriendRequestRepository, FriendRequestRepository};
pub use logging::{init_local_logging, init_logging};
pub use media_repository::{DynamoMediaRepository, MediaRepository};
pub use memory_store::InMemoryStore;
pub use post_repository::{DynamoPostRepository, PostRepository, ReactionResult};
pub use repository_error::RepositoryError;
pub use static_content_config::{
    default_static_content, load_static_content, StaticContentError,
};
pub use token_verifier::{
    AuthConfig, AuthError, DevTokenVerifier, JwksTokenVerifier, TokenVerifier,
};
pub use user_repository::{DynamoUserRepository, UserRepository, USER_SEARCH_LIMIT};
