use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Author, Group};
use crate::form::CleanedPost;

/// Post entity - a single blog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
}

impl Post {
    /// Create a new post from a cleaned form. `pub_date` is taken from the clock
    /// and never changes afterwards.
    pub fn new(author_id: Uuid, cleaned: CleanedPost) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: cleaned.text,
            pub_date: Utc::now(),
            author_id,
            group_id: cleaned.group_id,
        }
    }

    /// Apply an edit. Only the form fields change.
    pub fn apply(&mut self, cleaned: CleanedPost) {
        self.text = cleaned.text;
        self.group_id = cleaned.group_id;
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// A post together with what listings show next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEntry {
    pub post: Post,
    pub author: Author,
    pub group: Option<Group>,
}
