//! Request lifecycle for generate, save, regenerate and the saved-blog library.
//!
//! The controller has no rendering dependency. It validates input, performs a
//! single round trip through a [`BlogBackend`] and returns plain values; the
//! caller owns the current [`GeneratedBlog`] and passes it back in to save.
//!
//! Each action has its own busy flag held by a [`BusyGuard`] for the duration
//! of the request. A second request for an action that is still in flight is
//! rejected with [`LifecycleError::InFlight`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{BlogBackend, GenerateRequest, SaveRequest};
use crate::error::{Action, LifecycleError, RequestError, ValidationError};
use crate::models::{GeneratedBlog, SavedBlog, Topic};

const GENERATE_FAILED: &str = "Failed to generate blog";
const SAVE_FAILED: &str = "Failed to save blog";
const SAVE_SUCCEEDED: &str = "Blog saved successfully!";
const LIST_FAILED: &str = "Failed to load blogs";
const DELETE_FAILED: &str = "Failed to delete blog";
const DELETE_SUCCEEDED: &str = "Blog deleted successfully!";

/// Clears its flag when dropped, whichever way the request ended.
#[derive(Debug)]
pub struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>, action: Action) -> Result<Self, LifecycleError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LifecycleError::InFlight(action))?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct Controller {
    backend: Arc<dyn BlogBackend>,
    generating: Arc<AtomicBool>,
    saving: Arc<AtomicBool>,
    library: Arc<AtomicBool>,
}

impl Controller {
    pub fn new(backend: Arc<dyn BlogBackend>) -> Self {
        Self {
            backend,
            generating: Arc::new(AtomicBool::new(false)),
            saving: Arc::new(AtomicBool::new(false)),
            library: Arc::new(AtomicBool::new(false)),
        }
    }

    #[cfg(test)]
    fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    #[cfg(test)]
    fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    #[cfg(test)]
    fn is_loading_library(&self) -> bool {
        self.library.load(Ordering::Acquire)
    }

    pub async fn generate(&self, raw_topic: &str) -> Result<GeneratedBlog, LifecycleError> {
        let topic = Topic::parse(raw_topic)?;
        let _busy = BusyGuard::acquire(&self.generating, Action::Generate)?;

        let request_id = Uuid::new_v4();
        info!(%request_id, topic = topic.as_str(), "generating blog");

        let request = GenerateRequest {
            topic: topic.as_str().to_string(),
        };
        let envelope = self.backend.generate(&request).await.map_err(|e| {
            warn!(%request_id, error = %format!("{e:#}"), "generate request failed");
            RequestError::new(GENERATE_FAILED)
        })?;

        if !envelope.success {
            let err = RequestError::from_server(envelope.error, GENERATE_FAILED);
            warn!(%request_id, message = %err.message, "backend refused generation");
            return Err(err.into());
        }

        let Some(content) = envelope.content else {
            warn!(%request_id, "generate response had no content");
            return Err(RequestError::new(GENERATE_FAILED).into());
        };
        let topic = envelope
            .topic
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| topic.as_str().to_string());

        info!(%request_id, chars = content.chars().count(), "blog generated");
        Ok(GeneratedBlog::new(topic, content))
    }

    /// Generate again for the same topic, but only once the user confirmed.
    ///
    /// Declining returns `Ok(None)` without touching the backend.
    pub async fn regenerate(
        &self,
        raw_topic: &str,
        confirmed: bool,
    ) -> Result<Option<GeneratedBlog>, LifecycleError> {
        if raw_topic.trim().is_empty() {
            return Err(ValidationError::EmptyTopic.into());
        }
        if !confirmed {
            info!("regeneration declined");
            return Ok(None);
        }
        self.generate(raw_topic).await.map(Some)
    }

    pub async fn save(&self, current: Option<&GeneratedBlog>) -> Result<String, LifecycleError> {
        let blog = current.ok_or(ValidationError::NoBlogToSave)?;
        let _busy = BusyGuard::acquire(&self.saving, Action::Save)?;

        let request_id = Uuid::new_v4();
        info!(%request_id, topic = %blog.topic, "saving blog");

        let request = SaveRequest {
            topic: blog.topic.clone(),
            content: blog.content.clone(),
        };
        let envelope = self.backend.save(&request).await.map_err(|e| {
            warn!(%request_id, error = %format!("{e:#}"), "save request failed");
            RequestError::new(SAVE_FAILED)
        })?;

        if !envelope.success {
            let err = RequestError::from_server(envelope.error, SAVE_FAILED);
            warn!(%request_id, message = %err.message, "backend refused save");
            return Err(err.into());
        }

        info!(%request_id, blog_id = ?envelope.blog_id, "blog saved");
        Ok(envelope
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| SAVE_SUCCEEDED.to_string()))
    }

    pub async fn list_blogs(&self) -> Result<Vec<SavedBlog>, LifecycleError> {
        let _busy = BusyGuard::acquire(&self.library, Action::Library)?;

        let response = self.backend.list_blogs().await.map_err(|e| {
            warn!(error = %format!("{e:#}"), "list request failed");
            RequestError::new(LIST_FAILED)
        })?;

        if let Some(error) = response.error {
            return Err(RequestError::from_server(Some(error), LIST_FAILED).into());
        }

        info!(count = response.blogs.len(), "loaded saved blogs");
        Ok(response.blogs)
    }

    pub async fn delete_blog(&self, id: i64) -> Result<String, LifecycleError> {
        let _busy = BusyGuard::acquire(&self.library, Action::Library)?;

        info!(blog_id = id, "deleting blog");
        let envelope = self.backend.delete_blog(id).await.map_err(|e| {
            warn!(blog_id = id, error = %format!("{e:#}"), "delete request failed");
            RequestError::new(DELETE_FAILED)
        })?;

        if !envelope.success {
            return Err(RequestError::from_server(envelope.error, DELETE_FAILED).into());
        }

        Ok(envelope
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DELETE_SUCCEEDED.to_string()))
    }
}
