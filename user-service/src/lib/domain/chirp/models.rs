use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::chirp::errors::ChirpBodyError;
use crate::domain::chirp::errors::ChirpIdError;
use crate::domain::user::models::UserId;

/// Maximum chirp length in characters.
pub const MAX_CHIRP_LENGTH: usize = 140;

/// Chirp aggregate entity. A short message owned by its author.
#[derive(Debug, Clone)]
pub struct Chirp {
    pub id: ChirpId,
    pub body: ChirpBody,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChirpId(pub Uuid);

impl ChirpId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a chirp ID from its canonical string form.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, ChirpIdError> {
        Uuid::parse_str(s)
            .map(ChirpId)
            .map_err(|e| ChirpIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for ChirpId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChirpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Chirp text, at most [`MAX_CHIRP_LENGTH`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChirpBody(String);

impl ChirpBody {
    /// # Errors
    /// * `TooLong` - Body exceeds the maximum length
    pub fn new(body: String) -> Result<Self, ChirpBodyError> {
        let length = body.chars().count();
        if length > MAX_CHIRP_LENGTH {
            return Err(ChirpBodyError::TooLong {
                length,
                max: MAX_CHIRP_LENGTH,
            });
        }
        Ok(Self(body))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Order of a chirp listing by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// `desc` selects descending order; anything else, including nothing, is ascending.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("desc") => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }
}

/// Command to publish a chirp
#[derive(Debug)]
pub struct CreateChirpCommand {
    pub body: ChirpBody,
    pub author_id: UserId,
}

/// Filter and order for listing chirps
#[derive(Debug, Default)]
pub struct ListChirpsQuery {
    pub author_id: Option<UserId>,
    pub sort: SortOrder,
}
