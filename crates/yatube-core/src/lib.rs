//! # Yatube Core
//!
//! The domain layer of Yatube.
//! Entities, ports, the post listing query and the post form live here,
//! with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod form;
pub mod listing;
pub mod ports;
pub mod service;

pub use error::{DomainError, FieldError, ValidationErrors};
pub use form::{CleanedPost, PostForm};
pub use listing::{PAGE_SIZE, Page, PageRequest, Paginator, PostFilter, PostQuery, Scope};
pub use service::PostService;
