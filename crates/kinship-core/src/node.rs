//! Node types: users, posts and comments

use crate::id::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Node label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    User,
    Post,
    Comment,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::User, Label::Post, Label::Comment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Post => "Post",
            Self::Comment => "Comment",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person in the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: NodeId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: NodeId,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            created_at,
        }
    }
}

/// A post authored by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: NodeId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        id: NodeId,
        title: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            created_at,
        }
    }
}

/// A comment placed under a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: NodeId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(id: NodeId, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            content: content.into(),
            created_at,
        }
    }
}

/// Any stored node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "label")]
pub enum Node {
    User(User),
    Post(Post),
    Comment(Comment),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Self::User(u) => u.id,
            Self::Post(p) => p.id,
            Self::Comment(c) => c.id,
        }
    }

    pub fn label(&self) -> Label {
        match self {
            Self::User(_) => Label::User,
            Self::Post(_) => Label::Post,
            Self::Comment(_) => Label::Comment,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::User(u) => u.created_at,
            Self::Post(p) => p.created_at,
            Self::Comment(c) => c.created_at,
        }
    }

    pub fn into_user(self) -> Option<User> {
        match self {
            Self::User(u) => Some(u),
            _ => None,
        }
    }

    pub fn into_post(self) -> Option<Post> {
        match self {
            Self::Post(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_comment(self) -> Option<Comment> {
        match self {
            Self::Comment(c) => Some(c),
            _ => None,
        }
    }

    /// Apply a partial update in place.
    ///
    /// Returns `false` without touching the node when the patch targets a
    /// different label.
    pub fn apply(&mut self, patch: &NodePatch) -> bool {
        match (self, patch) {
            (Self::User(user), NodePatch::User(p)) => {
                if let Some(name) = &p.name {
                    user.name = name.clone();
                }
                if let Some(email) = &p.email {
                    user.email = email.clone();
                }
                true
            }
            (Self::Post(post), NodePatch::Post(p)) => {
                if let Some(title) = &p.title {
                    post.title = title.clone();
                }
                if let Some(content) = &p.content {
                    post.content = content.clone();
                }
                true
            }
            (Self::Comment(comment), NodePatch::Comment(p)) => {
                if let Some(content) = &p.content {
                    comment.content = content.clone();
                }
                true
            }
            _ => false,
        }
    }
}

impl From<User> for Node {
    fn from(u: User) -> Self {
        Self::User(u)
    }
}

impl From<Post> for Node {
    fn from(p: Post) -> Self {
        Self::Post(p)
    }
}

impl From<Comment> for Node {
    fn from(c: Comment) -> Self {
        Self::Comment(c)
    }
}

/// Partial update for a user; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// Partial update for a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl PostPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Partial update for a comment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl CommentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}

/// Partial update for any node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "label")]
pub enum NodePatch {
    User(UserPatch),
    Post(PostPatch),
    Comment(CommentPatch),
}

impl NodePatch {
    pub fn label(&self) -> Label {
        match self {
            Self::User(_) => Label::User,
            Self::Post(_) => Label::Post,
            Self::Comment(_) => Label::Comment,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::User(p) => p.is_empty(),
            Self::Post(p) => p.is_empty(),
            Self::Comment(p) => p.is_empty(),
        }
    }
}

impl From<UserPatch> for NodePatch {
    fn from(p: UserPatch) -> Self {
        Self::User(p)
    }
}

impl From<PostPatch> for NodePatch {
    fn from(p: PostPatch) -> Self {
        Self::Post(p)
    }
}

impl From<CommentPatch> for NodePatch {
    fn from(p: CommentPatch) -> Self {
        Self::Comment(p)
    }
}
