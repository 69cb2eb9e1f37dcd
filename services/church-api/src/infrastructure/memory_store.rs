/// プロセス内ドキュメントストア
///
/// 全リポジトリトレイトをメモリ上のHashMapで実装する。
/// ローカル開発サーバー（`--store memory`）とテストで使用する。
/// 各操作は単一のロック内で完結するため、joinの検査と更新も原子的に行われる。
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::church_repository::{AddMemberResult, ChurchRepository};
use super::friend_request_repository::FriendRequestRepository;
use super::media_repository::{newest_first, MediaRepository};
use super::post_repository::{PostRepository, ReactionResult};
use super::repository_error::RepositoryError;
use super::user_repository::UserRepository;
use crate::domain::{
    normalize_search_name, Church, ChurchEvent, FriendRequest, Media, Post, ProfileUpdate,
    UserProfile,
};

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<String, UserProfile>,
    friend_requests: HashMap<String, FriendRequest>,
    posts: HashMap<String, Post>,
    churches: HashMap<String, Church>,
    /// churchId -> イベント一覧
    church_events: HashMap<String, Vec<ChurchEvent>>,
    media: HashMap<String, Media>,
}

/// メモリ上のドキュメントストア
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<Mutex<Collections>>,
    /// 次の操作で返すエラー（ストア障害時の挙動確認用）
    next_error: Arc<Mutex<Option<RepositoryError>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の1操作を指定したエラーで失敗させる
    pub fn fail_next_operation(&self, error: RepositoryError) {
        *lock(&self.next_error) = Some(error);
    }

    pub fn church_count(&self) -> usize {
        lock(&self.collections).churches.len()
    }

    fn begin(&self) -> Result<MutexGuard<'_, Collections>, RepositoryError> {
        if let Some(error) = lock(&self.next_error).take() {
            return Err(error);
        }
        Ok(lock(&self.collections))
    }
}

/// ロックを取得する（パニックしたスレッドが残したデータもそのまま使う）
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn duplicate_id(id: &str) -> RepositoryError {
    RepositoryError::WriteError(format!("document already exists: {}", id))
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn save_profile(
        &self,
        update: &ProfileUpdate,
        now: &str,
    ) -> Result<UserProfile, RepositoryError> {
        let mut collections = self.begin()?;
        let merged = UserProfile::merged(collections.users.get(&update.user_id), update, now);
        collections
            .users
            .insert(update.user_id.clone(), merged.clone());
        Ok(merged)
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.begin()?.users.get(user_id).cloned())
    }

    async fn search_by_name_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<UserProfile>, RepositoryError> {
        let prefix = normalize_search_name(prefix);
        let collections = self.begin()?;

        let mut matches: Vec<UserProfile> = collections
            .users
            .values()
            .filter(|p| p.search_name.starts_with(&prefix))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.search_name.cmp(&b.search_name));
        matches.truncate(limit);
        Ok(matches)
    }
}

#[async_trait]
impl FriendRequestRepository for InMemoryStore {
    async fn put(&self, request: &FriendRequest) -> Result<(), RepositoryError> {
        self.begin()?
            .friend_requests
            .insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<FriendRequest>, RepositoryError> {
        Ok(self.begin()?.friend_requests.get(id).cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: &Post) -> Result<(), RepositoryError> {
        let mut collections = self.begin()?;
        if collections.posts.contains_key(&post.id) {
            return Err(duplicate_id(&post.id));
        }
        collections.posts.insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn list_latest(&self, limit: usize) -> Result<Vec<Post>, RepositoryError> {
        let collections = self.begin()?;
        let mut posts: Vec<Post> = collections.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit);
        Ok(posts)
    }

    async fn increment_reaction(
        &self,
        post_id: &str,
        reaction: &str,
    ) -> Result<ReactionResult, RepositoryError> {
        let mut collections = self.begin()?;
        let Some(post) = collections.posts.get_mut(post_id) else {
            return Ok(ReactionResult::PostNotFound);
        };

        let count = post.reactions.entry(reaction.to_string()).or_insert(0);
        *count += 1;
        Ok(ReactionResult::Incremented { count: *count })
    }
}

#[async_trait]
impl ChurchRepository for InMemoryStore {
    async fn create(&self, church: &Church) -> Result<(), RepositoryError> {
        let mut collections = self.begin()?;
        if collections.churches.contains_key(&church.id) {
            return Err(duplicate_id(&church.id));
        }
        collections.churches.insert(church.id.clone(), church.clone());
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<Church>, RepositoryError> {
        let collections = self.begin()?;
        let mut churches: Vec<Church> = collections.churches.values().cloned().collect();
        churches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        churches.truncate(limit);
        Ok(churches)
    }

    async fn get(&self, church_id: &str) -> Result<Option<Church>, RepositoryError> {
        Ok(self.begin()?.churches.get(church_id).cloned())
    }

    async fn add_member(
        &self,
        church_id: &str,
        member_id: &str,
    ) -> Result<AddMemberResult, RepositoryError> {
        let mut collections = self.begin()?;
        let Some(church) = collections.churches.get_mut(church_id) else {
            return Ok(AddMemberResult::ChurchNotFound);
        };
        if church.is_member(member_id) {
            return Ok(AddMemberResult::AlreadyMember);
        }

        church.members.push(member_id.to_string());
        church.follower_count += 1;
        Ok(AddMemberResult::Added {
            follower_count: church.follower_count,
        })
    }

    async fn create_event(&self, event: &ChurchEvent) -> Result<(), RepositoryError> {
        self.begin()?
            .church_events
            .entry(event.church_id.clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn list_events(&self, church_id: &str) -> Result<Vec<ChurchEvent>, RepositoryError> {
        let collections = self.begin()?;
        let mut events = collections
            .church_events
            .get(church_id)
            .cloned()
            .unwrap_or_default();
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(events)
    }
}

#[async_trait]
impl MediaRepository for InMemoryStore {
    async fn create(&self, media: &Media) -> Result<(), RepositoryError> {
        let mut collections = self.begin()?;
        if collections.media.contains_key(&media.id) {
            return Err(duplicate_id(&media.id));
        }
        collections.media.insert(media.id.clone(), media.clone());
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<Media>, RepositoryError> {
        let media: Vec<Media> = self.begin()?.media.values().cloned().collect();
        Ok(newest_first(media, limit))
    }
}
