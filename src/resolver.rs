//! Turns a bus stop ID into a stop record
pub mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ResolutionError;
use crate::model::{Source, StopRecord};

pub use gemini::GeminiResolver;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub stop: StopRecord,
    /// Citations the lookup was based on. Only used for display.
    pub sources: Vec<Source>,
}

/// Anything able to look up a stop by its ID.
#[async_trait]
pub trait StopResolver: Send + Sync {
    async fn resolve(&self, stop_id: &str) -> Result<Resolution, ResolutionError>;
}

#[async_trait]
impl<T: StopResolver + ?Sized> StopResolver for Arc<T> {
    async fn resolve(&self, stop_id: &str) -> Result<Resolution, ResolutionError> {
        (**self).resolve(stop_id).await
    }
}
