//! In-process store used for local development and the HTTP test suites
//!
//! All state sits behind one `RwLock`, so every write is serialised and the
//! same constraints the PostgreSQL schema enforces (unique usernames and
//! slugs, unique follow pairs, no self-follow, foreign keys) are checked
//! under the write lock.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    BlogStore, CommentRepository, FollowRepository, GroupRepository, PostRepository, RepoError,
    RepoResult, UserRepository, Window, FOLLOWS_NO_SELF_FOLLOW, FOLLOWS_UNIQUE_PAIR,
    USERS_USERNAME_KEY,
};
use crate::models::{
    Comment, Follow, Group, NewComment, NewGroup, NewPost, Post, PostChanges, User,
};

#[derive(Debug, Clone)]
struct FollowRow {
    id: i64,
    user_id: i64,
    following_id: i64,
}

#[derive(Default)]
struct State {
    users: BTreeMap<i64, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    follows: BTreeMap<i64, FollowRow>,
    next_id: Sequences,
}

#[derive(Default)]
struct Sequences {
    user: i64,
    group: i64,
    post: i64,
    comment: i64,
    follow: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl State {
    fn username(&self, user_id: i64) -> RepoResult<String> {
        self.users
            .get(&user_id)
            .map(|u| u.username.clone())
            .ok_or_else(|| RepoError::ForeignKey(format!("user {user_id}")))
    }

    fn check_group(&self, group_id: Option<i64>) -> RepoResult<()> {
        match group_id {
            Some(id) if !self.groups.contains_key(&id) => {
                Err(RepoError::ForeignKey(format!("group {id}")))
            }
            _ => Ok(()),
        }
    }

    fn follow(&self, row: &FollowRow) -> RepoResult<Follow> {
        Ok(Follow {
            id: row.id,
            user: self.username(row.user_id)?,
            user_id: row.user_id,
            following: self.username(row.following_id)?,
            following_id: row.following_id,
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == username) {
            return Err(RepoError::UniqueViolation(USERS_USERNAME_KEY.to_string()));
        }

        let user = User {
            id: next(&mut state.next_id.user),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            date_joined: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn list_groups(&self) -> RepoResult<Vec<Group>> {
        Ok(self.state.read().await.groups.values().cloned().collect())
    }

    async fn find_group(&self, id: i64) -> RepoResult<Option<Group>> {
        Ok(self.state.read().await.groups.get(&id).cloned())
    }

    async fn create_group(&self, group: &NewGroup) -> RepoResult<Group> {
        let mut state = self.state.write().await;
        if state.groups.values().any(|g| g.slug == group.slug) {
            return Err(RepoError::UniqueViolation("groups_slug_key".to_string()));
        }

        let group = Group {
            id: next(&mut state.next_id.group),
            title: group.title.clone(),
            slug: group.slug.clone(),
            description: group.description.clone(),
        };
        state.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn delete_group(&self, id: i64) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        if state.groups.remove(&id).is_none() {
            return Ok(false);
        }
        for post in state.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn count_posts(&self) -> RepoResult<i64> {
        Ok(self.state.read().await.posts.len() as i64)
    }

    async fn list_posts(&self, window: Option<Window>) -> RepoResult<Vec<Post>> {
        let state = self.state.read().await;
        let mut posts: Vec<Post> = state.posts.values().cloned().collect();
        posts.sort_by(|a, b| a.pub_date.cmp(&b.pub_date).then(a.id.cmp(&b.id)));

        Ok(match window {
            Some(w) => posts
                .into_iter()
                .skip(w.offset.max(0) as usize)
                .take(w.limit.max(0) as usize)
                .collect(),
            None => posts,
        })
    }

    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn create_post(&self, post: &NewPost) -> RepoResult<Post> {
        let mut state = self.state.write().await;
        let author = state.username(post.author_id)?;
        state.check_group(post.group_id)?;

        let post = Post {
            id: next(&mut state.next_id.post),
            text: post.text.clone(),
            author,
            author_id: post.author_id,
            pub_date: Utc::now(),
            image: post.image.clone(),
            group_id: post.group_id,
        };
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: i64, changes: &PostChanges) -> RepoResult<Option<Post>> {
        let mut state = self.state.write().await;
        if let Some(group_id) = changes.group_id {
            state.check_group(group_id)?;
        }

        let Some(post) = state.posts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(text) = &changes.text {
            post.text = text.clone();
        }
        if let Some(image) = &changes.image {
            post.image = image.clone();
        }
        if let Some(group_id) = changes.group_id {
            post.group_id = group_id;
        }
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        if state.posts.remove(&id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, c| c.post_id != id);
        Ok(true)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn list_comments(&self, post_id: i64) -> RepoResult<Vec<Comment>> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn find_comment(&self, post_id: i64, id: i64) -> RepoResult<Option<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .get(&id)
            .filter(|c| c.post_id == post_id)
            .cloned())
    }

    async fn create_comment(&self, comment: &NewComment) -> RepoResult<Comment> {
        let mut state = self.state.write().await;
        let author = state.username(comment.author_id)?;
        if !state.posts.contains_key(&comment.post_id) {
            return Err(RepoError::ForeignKey(format!("post {}", comment.post_id)));
        }

        let comment = Comment {
            id: next(&mut state.next_id.comment),
            text: comment.text.clone(),
            author,
            author_id: comment.author_id,
            post_id: comment.post_id,
            created: Utc::now(),
        };
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        post_id: i64,
        id: i64,
        text: &str,
    ) -> RepoResult<Option<Comment>> {
        let mut state = self.state.write().await;
        Ok(state
            .comments
            .get_mut(&id)
            .filter(|c| c.post_id == post_id)
            .map(|c| {
                c.text = text.to_string();
                c.clone()
            }))
    }

    async fn delete_comment(&self, post_id: i64, id: i64) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        match state.comments.get(&id) {
            Some(c) if c.post_id == post_id => {
                state.comments.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn list_follows(&self, user_id: i64, terms: &[String]) -> RepoResult<Vec<Follow>> {
        let state = self.state.read().await;
        let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();

        let mut follows = Vec::new();
        for row in state.follows.values().filter(|f| f.user_id == user_id) {
            let follow = state.follow(row)?;
            let user = follow.user.to_lowercase();
            let following = follow.following.to_lowercase();
            if terms
                .iter()
                .all(|t| user.contains(t.as_str()) || following.contains(t.as_str()))
            {
                follows.push(follow);
            }
        }
        Ok(follows)
    }

    async fn follow_exists(&self, user_id: i64, following_id: i64) -> RepoResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .values()
            .any(|f| f.user_id == user_id && f.following_id == following_id))
    }

    async fn create_follow(&self, user_id: i64, following_id: i64) -> RepoResult<Follow> {
        let mut state = self.state.write().await;
        if user_id == following_id {
            return Err(RepoError::CheckViolation(FOLLOWS_NO_SELF_FOLLOW.to_string()));
        }
        if state
            .follows
            .values()
            .any(|f| f.user_id == user_id && f.following_id == following_id)
        {
            return Err(RepoError::UniqueViolation(FOLLOWS_UNIQUE_PAIR.to_string()));
        }
        state.username(user_id)?;
        state.username(following_id)?;

        let row = FollowRow {
            id: next(&mut state.next_id.follow),
            user_id,
            following_id,
        };
        state.follows.insert(row.id, row.clone());
        state.follow(&row)
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}
