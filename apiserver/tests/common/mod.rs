#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use apiserver::domain::pagination::Pagination;
use apiserver::domain::post::errors::PostError;
use apiserver::domain::post::models::NewPost;
use apiserver::domain::post::models::Post;
use apiserver::domain::post::models::PostId;
use apiserver::domain::post::ports::PostRepository;
use apiserver::domain::post::service::PostService;
use apiserver::domain::user::errors::UserError;
use apiserver::domain::user::models::NewUser;
use apiserver::domain::user::models::User;
use apiserver::domain::user::models::UserId;
use apiserver::domain::user::models::Username;
use apiserver::domain::user::ports::UserRepository;
use apiserver::domain::user::service::UserService;
use apiserver::inbound::http::router::create_router;
use async_trait::async_trait;
use auth::Authenticator;
use auth::IdGenerator;
use auth::PasswordHasher;
use auth::TokenConfig;
use chrono::Duration;
use serde_json::json;
use serde_json::Value;

pub const SIGNING_KEY: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const PASSWORD: &str = "pass_word!";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
    pub users: Arc<InMemoryUserRepository>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let authenticator = Arc::new(test_authenticator(SIGNING_KEY));
        let id_generator = Arc::new(IdGenerator::new("test-salt").unwrap());

        let users = Arc::new(InMemoryUserRepository::default());
        let posts = Arc::new(InMemoryPostRepository::default());

        let user_service = Arc::new(UserService::new(
            Arc::clone(&users),
            Arc::clone(&authenticator),
            Arc::clone(&id_generator),
        ));
        let post_service = Arc::new(PostService::new(posts, id_generator));

        let router = create_router(user_service, post_service, Arc::clone(&authenticator));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            authenticator,
            users,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(format!("{}{}", self.address, path))
    }

    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.put(path).bearer_auth(token)
    }

    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.delete(path).bearer_auth(token)
    }

    /// Register a user and return its public ID.
    pub async fn create_user(&self, username: &str) -> String {
        let response = self
            .post("/v1/users")
            .json(&user_body(username))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["userID"]
            .as_str()
            .expect("userID in response")
            .to_string()
    }

    /// Log in and return the bearer token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("token in response")
            .to_string()
    }

    /// Register and log in, returning `(user_id, token)`.
    pub async fn signed_in_user(&self, username: &str) -> (String, String) {
        let user_id = self.create_user(username).await;
        let token = self.login(username, PASSWORD).await;
        (user_id, token)
    }
}

pub fn user_body(username: &str) -> Value {
    json!({
        "username": username,
        "password": PASSWORD,
        "nickname": "Nico",
        "email": format!("{}@example.com", username),
        "phone": "5550100"
    })
}

pub fn test_authenticator(signing_key: &str) -> Authenticator {
    let config = TokenConfig::new(signing_key, "x-user-id", Duration::hours(2))
        .expect("valid token config");
    let hasher = PasswordHasher::with_work_factor(1024, 1, 1).expect("valid work factor");
    Authenticator::with_password_hasher(config, hasher)
}

enum UserRow {
    Allocated(NewUser),
    Ready(User),
}

impl UserRow {
    fn username(&self) -> &Username {
        match self {
            UserRow::Allocated(user) => &user.username,
            UserRow::Ready(user) => &user.username,
        }
    }
}

/// User storage backed by a map; keys are handed out in creation order.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<BTreeMap<i64, UserRow>>,
    sequence: AtomicI64,
    attach_failure: AtomicBool,
}

impl InMemoryUserRepository {
    /// Make the next `attach_public_id` call fail once.
    pub fn fail_next_attach(&self) {
        self.attach_failure.store(true, Ordering::SeqCst);
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn allocate(&self, user: NewUser) -> Result<i64, UserError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|row| *row.username() == user.username) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }

        let key = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        rows.insert(key, UserRow::Allocated(user));
        Ok(key)
    }

    async fn attach_public_id(&self, key: i64, user_id: &UserId) -> Result<(), UserError> {
        if self.attach_failure.swap(false, Ordering::SeqCst) {
            return Err(UserError::DatabaseError("connection reset".to_string()));
        }

        let mut rows = self.rows.lock().unwrap();
        match rows.remove(&key) {
            Some(UserRow::Allocated(new_user)) => {
                rows.insert(
                    key,
                    UserRow::Ready(User::from_new(key, user_id.clone(), new_user)),
                );
                Ok(())
            }
            Some(ready) => {
                rows.insert(key, ready);
                Err(UserError::DatabaseError(format!("key {} already attached", key)))
            }
            None => Err(UserError::NotFound(key.to_string())),
        }
    }

    async fn discard(&self, key: i64) -> Result<(), UserError> {
        self.rows.lock().unwrap().remove(&key);
        Ok(())
    }

    async fn find_by_user_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find_map(|row| match row {
            UserRow::Ready(user) if user.user_id == *id => Some(user.clone()),
            _ => None,
        }))
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find_map(|row| match row {
            UserRow::Ready(user) if user.username == *username => Some(user.clone()),
            _ => None,
        }))
    }

    async fn list(&self, page: &Pagination) -> Result<Vec<User>, UserError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .rev()
            .filter_map(|row| match row {
                UserRow::Ready(user) => Some(user.clone()),
                UserRow::Allocated(_) => None,
            })
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, UserError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|row| matches!(row, UserRow::Ready(_)))
            .count() as i64)
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut rows = self.rows.lock().unwrap();
        let taken = rows
            .iter()
            .any(|(key, row)| *key != user.key && *row.username() == user.username);
        if taken {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }

        match rows.get_mut(&user.key) {
            Some(row) if matches!(row, UserRow::Ready(_)) => {
                *row = UserRow::Ready(user.clone());
                Ok(user)
            }
            _ => Err(UserError::NotFound(user.user_id.to_string())),
        }
    }

    async fn update_password(&self, id: &UserId, password_hash: &str) -> Result<(), UserError> {
        let mut rows = self.rows.lock().unwrap();
        for row in rows.values_mut() {
            if let UserRow::Ready(user) = row {
                if user.user_id == *id {
                    user.password_hash = password_hash.to_string();
                    return Ok(());
                }
            }
        }
        Err(UserError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let mut rows = self.rows.lock().unwrap();
        let key = rows.iter().find_map(|(key, row)| match row {
            UserRow::Ready(user) if user.user_id == *id => Some(*key),
            _ => None,
        });

        match key {
            Some(key) => {
                rows.remove(&key);
                Ok(())
            }
            None => Err(UserError::NotFound(id.to_string())),
        }
    }
}

enum PostRow {
    Allocated(NewPost),
    Ready(Post),
}

#[derive(Default)]
pub struct InMemoryPostRepository {
    rows: Mutex<BTreeMap<i64, PostRow>>,
    sequence: AtomicI64,
}

impl InMemoryPostRepository {
    fn owned_posts(rows: &BTreeMap<i64, PostRow>, owner: &UserId) -> Vec<Post> {
        rows.values()
            .rev()
            .filter_map(|row| match row {
                PostRow::Ready(post) if post.owner == *owner => Some(post.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn allocate(&self, post: NewPost) -> Result<i64, PostError> {
        let mut rows = self.rows.lock().unwrap();
        let key = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        rows.insert(key, PostRow::Allocated(post));
        Ok(key)
    }

    async fn attach_public_id(&self, key: i64, post_id: &PostId) -> Result<(), PostError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.remove(&key) {
            Some(PostRow::Allocated(new_post)) => {
                rows.insert(
                    key,
                    PostRow::Ready(Post::from_new(key, post_id.clone(), new_post)),
                );
                Ok(())
            }
            Some(ready) => {
                rows.insert(key, ready);
                Err(PostError::DatabaseError(format!("key {} already attached", key)))
            }
            None => Err(PostError::NotFound(key.to_string())),
        }
    }

    async fn discard(&self, key: i64) -> Result<(), PostError> {
        self.rows.lock().unwrap().remove(&key);
        Ok(())
    }

    async fn find(&self, owner: &UserId, id: &PostId) -> Result<Option<Post>, PostError> {
        let rows = self.rows.lock().unwrap();
        Ok(Self::owned_posts(&rows, owner)
            .into_iter()
            .find(|post| post.post_id == *id))
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
        page: &Pagination,
    ) -> Result<Vec<Post>, PostError> {
        let rows = self.rows.lock().unwrap();
        Ok(Self::owned_posts(&rows, owner)
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn count_by_owner(&self, owner: &UserId) -> Result<i64, PostError> {
        let rows = self.rows.lock().unwrap();
        Ok(Self::owned_posts(&rows, owner).len() as i64)
    }

    async fn update(&self, post: Post) -> Result<Post, PostError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&post.key) {
            Some(row) if matches!(row, PostRow::Ready(_)) => {
                *row = PostRow::Ready(post.clone());
                Ok(post)
            }
            _ => Err(PostError::NotFound(post.post_id.to_string())),
        }
    }

    async fn delete_many(&self, owner: &UserId, ids: &[PostId]) -> Result<u64, PostError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, row| match row {
            PostRow::Ready(post) => !(post.owner == *owner && ids.contains(&post.post_id)),
            PostRow::Allocated(_) => true,
        });
        Ok((before - rows.len()) as u64)
    }
}
