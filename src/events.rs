// Event types for async communication

use crate::error::LifecycleError;
use crate::models::{GeneratedBlog, SavedBlog};

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A generate or confirmed regenerate request resolved
    GenerateFinished(Result<GeneratedBlog, LifecycleError>),
    /// A save request resolved with the server's confirmation
    SaveFinished(Result<String, LifecycleError>),
    /// The saved-blog list arrived
    LibraryLoaded(Result<Vec<SavedBlog>, LifecycleError>),
    /// A saved blog was deleted
    BlogDeleted { id: i64, result: Result<String, LifecycleError> },
    /// Result of the startup reachability check
    BackendStatus(bool),
}
