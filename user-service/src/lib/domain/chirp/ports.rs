use async_trait::async_trait;

use crate::domain::chirp::errors::ChirpError;
use crate::domain::chirp::models::Chirp;
use crate::domain::chirp::models::ChirpId;
use crate::domain::chirp::models::CreateChirpCommand;
use crate::domain::chirp::models::ListChirpsQuery;
use crate::domain::user::models::UserId;

/// Port for chirp domain service operations.
#[async_trait]
pub trait ChirpServicePort: Send + Sync + 'static {
    /// Publish a chirp on behalf of its authenticated author.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create_chirp(&self, command: CreateChirpCommand) -> Result<Chirp, ChirpError>;

    /// Retrieve chirp by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - Chirp does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_chirp(&self, id: &ChirpId) -> Result<Chirp, ChirpError>;

    /// List chirps, optionally only those of one author.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_chirps(&self, query: ListChirpsQuery) -> Result<Vec<Chirp>, ChirpError>;

    /// Delete a chirp owned by `requester`.
    ///
    /// # Errors
    /// * `NotFound` - Chirp does not exist
    /// * `Forbidden` - Chirp belongs to another user
    /// * `DatabaseError` - Database operation failed
    async fn delete_chirp(&self, id: &ChirpId, requester: &UserId) -> Result<(), ChirpError>;
}

/// Persistence operations for chirp aggregate.
#[async_trait]
pub trait ChirpRepository: Send + Sync + 'static {
    async fn create(&self, chirp: Chirp) -> Result<Chirp, ChirpError>;

    /// # Returns
    /// Optional chirp entity (None if not found)
    async fn find_by_id(&self, id: &ChirpId) -> Result<Option<Chirp>, ChirpError>;

    /// Chirps matching the query, ordered by creation time.
    async fn list(&self, query: &ListChirpsQuery) -> Result<Vec<Chirp>, ChirpError>;

    /// # Errors
    /// * `NotFound` - Chirp does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &ChirpId) -> Result<(), ChirpError>;
}
