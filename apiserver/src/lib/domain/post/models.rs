use std::fmt;

use auth::ResourceKind;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::post::errors::ContentError;
use crate::domain::post::errors::PostIdError;
use crate::domain::post::errors::TitleError;
use crate::domain::user::models::UserId;

/// Blog post entity, always owned by exactly one user.
#[derive(Debug, Clone)]
pub struct Post {
    pub key: i64,
    pub post_id: PostId,
    pub owner: UserId,
    pub title: Title,
    pub content: Content,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn from_new(key: i64, post_id: PostId, new_post: NewPost) -> Self {
        Self {
            key,
            post_id,
            owner: new_post.owner,
            title: new_post.title,
            content: new_post.content,
            created_at: new_post.created_at,
            updated_at: new_post.created_at,
        }
    }
}

/// Post record before storage has allocated its key.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub owner: UserId,
    pub title: Title,
    pub content: Content,
    pub created_at: DateTime<Utc>,
}

/// Public post identifier, `post-` followed by a six character code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostId(String);

impl PostId {
    /// # Errors
    /// * `InvalidFormat` - Not of the form `post-XXXXXX`
    pub fn from_string(s: &str) -> Result<Self, PostIdError> {
        let code = s
            .strip_prefix(ResourceKind::Post.prefix())
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(|| PostIdError::InvalidFormat(s.to_string()))?;

        if code.len() == auth::rid::CODE_LENGTH && code.chars().all(|c| c.is_ascii_alphanumeric())
        {
            Ok(Self(s.to_string()))
        } else {
            Err(PostIdError::InvalidFormat(s.to_string()))
        }
    }

    pub fn generated(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    const MAX_LENGTH: usize = 256;

    pub fn new(title: String) -> Result<Self, TitleError> {
        let length = title.chars().count();
        if title.trim().is_empty() {
            Err(TitleError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(TitleError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(title))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content(String);

impl Content {
    pub fn new(content: String) -> Result<Self, ContentError> {
        if content.trim().is_empty() {
            Err(ContentError::Empty)
        } else {
            Ok(Self(content))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug)]
pub struct CreatePostCommand {
    pub title: Title,
    pub content: Content,
}

#[derive(Debug, Default)]
pub struct UpdatePostCommand {
    pub title: Option<Title>,
    pub content: Option<Content>,
}

/// One page of a user's posts plus their total number of posts.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub total_count: i64,
    pub posts: Vec<Post>,
}
