use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::core::helpers::now;
use crate::models::models::{Comment, Follow, Like, Post, Session, User};

pub struct NewUser {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Profile fields to change. `None` leaves a field untouched; an empty string
/// clears it.
#[derive(Default)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Repository interface consumed by the route handlers. Handlers never touch
/// the maps directly, so the store can be swapped for a real database without
/// touching them.
pub trait Storage {
    fn get_user(&self, id: u64) -> Option<User>;
    fn get_user_by_username(&self, username: &str) -> Option<User>;
    fn create_user(&mut self, new_user: NewUser) -> User;
    fn update_user_profile(&mut self, id: u64, changes: ProfileChanges) -> Option<User>;

    fn create_post(&mut self, user_id: u64, content: String, image_url: Option<String>) -> Post;
    fn get_post(&self, id: u64) -> Option<Post>;
    /// Posts authored by the user or by anyone the user follows, newest first.
    fn get_feed(&self, user_id: u64) -> Vec<Post>;
    fn get_user_posts(&self, user_id: u64) -> Vec<Post>;

    fn follow_user(&mut self, follower_id: u64, following_id: u64) -> Follow;
    fn unfollow_user(&mut self, follower_id: u64, following_id: u64);
    fn is_following(&self, follower_id: u64, following_id: u64) -> bool;
    fn get_following(&self, user_id: u64) -> Vec<u64>;

    fn like_post(&mut self, user_id: u64, post_id: u64) -> Like;
    fn unlike_post(&mut self, user_id: u64, post_id: u64);
    fn get_post_likes(&self, post_id: u64) -> Vec<Like>;

    fn add_comment(&mut self, user_id: u64, post_id: u64, content: String) -> Comment;
    /// Comments on a post, newest first.
    fn get_post_comments(&self, post_id: u64) -> Vec<Comment>;

    fn create_session(&mut self, user_id: u64) -> String;
    fn get_session(&self, token: &str) -> Option<Session>;
    fn delete_session(&mut self, token: &str);
}

/// In-memory store. Every query is a full scan; fine for a store that lives
/// for one process and never grows beyond what fits in memory.
pub struct MemStorage {
    users: HashMap<u64, User>,
    posts: HashMap<u64, Post>,
    comments: HashMap<u64, Comment>,
    likes: HashMap<u64, Like>,
    follows: HashMap<u64, Follow>,
    sessions: HashMap<String, Session>,
    next_user_id: u64,
    next_post_id: u64,
    next_comment_id: u64,
    next_like_id: u64,
    next_follow_id: u64,
}

impl MemStorage {
    pub fn new() -> Self {
        MemStorage {
            users: HashMap::new(),
            posts: HashMap::new(),
            comments: HashMap::new(),
            likes: HashMap::new(),
            follows: HashMap::new(),
            sessions: HashMap::new(),
            next_user_id: 1,
            next_post_id: 1,
            next_comment_id: 1,
            next_like_id: 1,
            next_follow_id: 1,
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        MemStorage::new()
    }
}

fn bump(counter: &mut u64) -> u64 {
    let id = *counter;
    *counter += 1;
    id
}

// Newest first: creation time descending, id descending as a tiebreak for
// posts created within the same timestamp granularity.
fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

impl Storage for MemStorage {
    fn get_user(&self, id: u64) -> Option<User> {
        self.users.get(&id).cloned()
    }

    fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.users.values().find(|u| u.username == username).cloned()
    }

    fn create_user(&mut self, new_user: NewUser) -> User {
        let id = bump(&mut self.next_user_id);
        let user = User {
            id,
            username: new_user.username,
            password: new_user.password,
            display_name: new_user.display_name,
            bio: new_user.bio,
            avatar_url: new_user.avatar_url,
        };
        self.users.insert(id, user.clone());
        user
    }

    fn update_user_profile(&mut self, id: u64, changes: ProfileChanges) -> Option<User> {
        let user = self.users.get_mut(&id)?;
        if let Some(display_name) = changes.display_name {
            user.display_name = if display_name.is_empty() { None } else { Some(display_name) };
        }
        if let Some(bio) = changes.bio {
            user.bio = if bio.is_empty() { None } else { Some(bio) };
        }
        if let Some(avatar_url) = changes.avatar_url {
            user.avatar_url = if avatar_url.is_empty() { None } else { Some(avatar_url) };
        }
        Some(user.clone())
    }

    fn create_post(&mut self, user_id: u64, content: String, image_url: Option<String>) -> Post {
        let id = bump(&mut self.next_post_id);
        let post = Post {
            id,
            user_id,
            content,
            image_url,
            created_at: now(),
        };
        self.posts.insert(id, post.clone());
        post
    }

    fn get_post(&self, id: u64) -> Option<Post> {
        self.posts.get(&id).cloned()
    }

    fn get_feed(&self, user_id: u64) -> Vec<Post> {
        let following: HashSet<u64> = self
            .follows
            .values()
            .filter(|f| f.follower_id == user_id)
            .map(|f| f.following_id)
            .collect();

        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|p| p.user_id == user_id || following.contains(&p.user_id))
            .cloned()
            .collect();
        sort_newest_first(&mut posts);
        posts
    }

    fn get_user_posts(&self, user_id: u64) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut posts);
        posts
    }

    fn follow_user(&mut self, follower_id: u64, following_id: u64) -> Follow {
        // One edge per (follower, followee) pair.
        if let Some(existing) = self
            .follows
            .values()
            .find(|f| f.follower_id == follower_id && f.following_id == following_id)
        {
            return existing.clone();
        }
        let id = bump(&mut self.next_follow_id);
        let follow = Follow {
            id,
            follower_id,
            following_id,
        };
        self.follows.insert(id, follow.clone());
        follow
    }

    fn unfollow_user(&mut self, follower_id: u64, following_id: u64) {
        self.follows
            .retain(|_, f| !(f.follower_id == follower_id && f.following_id == following_id));
    }

    fn is_following(&self, follower_id: u64, following_id: u64) -> bool {
        self.follows
            .values()
            .any(|f| f.follower_id == follower_id && f.following_id == following_id)
    }

    fn get_following(&self, user_id: u64) -> Vec<u64> {
        self.follows
            .values()
            .filter(|f| f.follower_id == user_id)
            .map(|f| f.following_id)
            .collect()
    }

    fn like_post(&mut self, user_id: u64, post_id: u64) -> Like {
        if let Some(existing) = self
            .likes
            .values()
            .find(|l| l.user_id == user_id && l.post_id == post_id)
        {
            return existing.clone();
        }
        let id = bump(&mut self.next_like_id);
        let like = Like {
            id,
            user_id,
            post_id,
        };
        self.likes.insert(id, like.clone());
        like
    }

    fn unlike_post(&mut self, user_id: u64, post_id: u64) {
        self.likes
            .retain(|_, l| !(l.user_id == user_id && l.post_id == post_id));
    }

    fn get_post_likes(&self, post_id: u64) -> Vec<Like> {
        self.likes
            .values()
            .filter(|l| l.post_id == post_id)
            .cloned()
            .collect()
    }

    fn add_comment(&mut self, user_id: u64, post_id: u64, content: String) -> Comment {
        let id = bump(&mut self.next_comment_id);
        let comment = Comment {
            id,
            user_id,
            post_id,
            content,
            created_at: now(),
        };
        self.comments.insert(id, comment.clone());
        comment
    }

    fn get_post_comments(&self, post_id: u64) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        comments
    }

    fn create_session(&mut self, user_id: u64) -> String {
        let token = Uuid::new_v4().to_string();
        let session = Session {
            user_id,
            created_at: now(),
        };
        self.sessions.insert(token.clone(), session);
        token
    }

    fn get_session(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).cloned()
    }

    fn delete_session(&mut self, token: &str) {
        self.sessions.remove(token);
    }
}
