// Domain layer modules
pub mod church;
pub mod document;
pub mod friend_request;
pub mod identity;
pub mod media;
pub mod post;
pub mod profile;
pub mod static_content;
pub mod validation;

// Re-exports
pub use church::{
    Church, ChurchDraft, ChurchEvent, ChurchEventDraft, CreateChurchEventInput, CreateChurchInput,
    JoinOutcome, CHURCH_LIST_LIMIT,
};
pub use document::{format_timestamp, new_document_id, now_timestamp};
pub use friend_request::{FriendRequest, FriendRequestInput, FriendRequestParties, FriendRequestStatus};
pub use identity::AuthenticatedUser;
pub use media::{CreateMediaInput, Media, MediaDraft, MediaType, MEDIA_LIST_LIMIT};
pub use post::{CreatePostInput, Post, PostDraft, ReactInput, LATEST_POSTS_LIMIT};
pub use profile::{normalize_search_name, ProfileUpdate, SignupProfileInput, UserProfile};
pub use static_content::{StaticContent, TrendingSong, Verse};
pub use validation::{FieldError, ValidationErrors};
