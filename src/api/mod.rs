//! REST collaborator consumed by the effect coordinator.
//!
//! The store never talks HTTP directly: effects call an [`EntityApi`]
//! implementation and turn its result into an outcome action.

mod client;
mod error;

use async_trait::async_trait;

use crate::domain::Entity;

pub use client::{RestClient, RestResource};
pub use error::{extract_message, ApiError};

/// Backend operations for one entity type.
#[async_trait]
pub trait EntityApi<E: Entity>: Send + Sync {
    async fn list_all(&self) -> Result<Vec<E>, ApiError>;

    async fn get_by_id(&self, id: &E::Key) -> Result<E, ApiError>;

    async fn create(&self, draft: &E::Draft) -> Result<E, ApiError>;

    async fn update(&self, id: &E::Key, draft: &E::Draft) -> Result<E, ApiError>;

    async fn delete_by_id(&self, id: &E::Key) -> Result<(), ApiError>;
}
