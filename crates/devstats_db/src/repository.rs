//! Repository factory trait
//!
//! Services ask a factory for their repository instead of naming the SQL
//! implementation, which keeps the storage backend swappable.

/// A trait for database repository factories
///
/// Generic over the repository type and the configuration type.
pub trait RepositoryFactory<R, C> {
    /// Create a new repository instance
    fn create_repository(&self, config: C) -> R;
}
