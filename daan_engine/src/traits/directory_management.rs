use thiserror::Error;

use crate::db_types::{Event, Favorite, MinorUnits, NewEvent, NewOrganization, Organization};

/// A devotee may favorite at most this many organizations.
pub const MAX_FAVORITES: i64 = 5;

/// Organizations, their events and the devotee favorites that gate donations.
#[allow(async_fn_in_trait)]
pub trait DirectoryManagement {
    async fn insert_organization(&self, org: NewOrganization) -> Result<Organization, DirectoryError>;

    async fn fetch_organization(&self, id: i64) -> Result<Option<Organization>, DirectoryError>;

    async fn set_organization_active(&self, id: i64, active: bool) -> Result<Organization, DirectoryError>;

    /// Validates and stores a new, active event. The owning organization must exist.
    async fn insert_event(&self, event: NewEvent) -> Result<Event, DirectoryError>;

    async fn set_event_active(&self, id: i64, active: bool) -> Result<Event, DirectoryError>;

    async fn fetch_events_for_organization(&self, org_id: i64) -> Result<Vec<Event>, DirectoryError>;

    async fn is_favorite(&self, devotee_id: i64, org_id: i64) -> Result<bool, DirectoryError>;

    /// The devotee's favorites, ordered by position.
    async fn fetch_favorites(&self, devotee_id: i64) -> Result<Vec<Favorite>, DirectoryError>;

    /// Appends the organization to the devotee's favorites, taking the next free position.
    ///
    /// Fails with [`DirectoryError::AlreadyFavorited`] for duplicates and [`DirectoryError::FavoritesLimitReached`]
    /// once the devotee has [`MAX_FAVORITES`] favorites. The cap holds under concurrent calls.
    async fn add_favorite(&self, devotee_id: i64, org_id: i64) -> Result<Favorite, DirectoryError>;

    /// Removes the favorite and closes the gap in positions. Returns `false` if it was not a favorite.
    async fn remove_favorite(&self, devotee_id: i64, org_id: i64) -> Result<bool, DirectoryError>;
}

#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Organization {0} does not exist")]
    OrganizationNotFound(i64),
    #[error("Event {0} does not exist")]
    EventNotFound(i64),
    #[error("A devotee may have at most {MAX_FAVORITES} favorite organizations")]
    FavoritesLimitReached,
    #[error("Organization {0} is already a favorite")]
    AlreadyFavorited(i64),
    #[error("Invalid event. {0}")]
    InvalidEvent(String),
    #[error("{0} cannot be added to an event total")]
    InvalidAmount(MinorUnits),
}

impl From<sqlx::Error> for DirectoryError {
    fn from(e: sqlx::Error) -> Self {
        DirectoryError::DatabaseError(e.to_string())
    }
}
