//! The post form: cleans a submitted (text, group) pair before it is saved.

use uuid::Uuid;

use crate::error::{DomainError, ValidationErrors};
use crate::ports::GroupRepository;

/// Raw post form input, as submitted for both create and edit.
///
/// `group` is kept unparsed so a malformed reference is a field error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    pub text: String,
    pub group: Option<String>,
}

/// A form that passed validation. Author and publication date are not part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPost {
    pub text: String,
    pub group_id: Option<Uuid>,
}

impl PostForm {
    pub fn new(text: impl Into<String>, group: Option<Uuid>) -> Self {
        Self::submitted(text, group.map(|id| id.to_string()))
    }

    /// The form exactly as a client sent it.
    pub fn submitted(text: impl Into<String>, group: Option<String>) -> Self {
        Self {
            text: text.into(),
            group,
        }
    }

    /// Validate every field and report all failures at once.
    ///
    /// Only reads from `groups`; nothing is written.
    pub async fn clean(self, groups: &dyn GroupRepository) -> Result<CleanedPost, DomainError> {
        let mut errors = ValidationErrors::new();

        let text = self.text.trim();
        if text.is_empty() {
            errors.add("text", "This field is required.");
        }

        // An empty reference means no group.
        let reference = self.group.as_deref().map(str::trim).filter(|g| !g.is_empty());
        let mut group_id = None;
        if let Some(reference) = reference {
            group_id = match Uuid::parse_str(reference) {
                Ok(id) => groups.find_by_id(id).await?.map(|g| g.id),
                Err(_) => None,
            };
            if group_id.is_none() {
                errors.add(
                    "group",
                    "Select a valid choice. That choice is not one of the available choices.",
                );
            }
        }

        errors.into_result()?;

        Ok(CleanedPost {
            text: text.to_string(),
            group_id,
        })
    }
}
