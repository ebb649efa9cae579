use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::models::{Education, Experience, Profile, ProfileFields, UserSummary};
use crate::utils::AppError;

/// Persistence operations the profile API needs.
///
/// Every method is a single document read or write; sub-collection changes
/// are atomic per document so concurrent requests do not lose entries.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Profile owned by `user`, if any
    async fn find_profile(&self, user: &ObjectId) -> Result<Option<Profile>, AppError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError>;

    /// Update-or-insert keyed by `user`; returns the document after the write
    async fn upsert_profile(&self, user: &ObjectId, fields: &ProfileFields) -> Result<Profile, AppError>;

    /// Returns whether a profile was removed
    async fn delete_profile(&self, user: &ObjectId) -> Result<bool, AppError>;

    /// Returns whether an account was removed
    async fn delete_user(&self, user: &ObjectId) -> Result<bool, AppError>;

    /// `_id`, `name` and `avatar` of each listed user that exists
    async fn find_users(&self, ids: &[ObjectId]) -> Result<Vec<UserSummary>, AppError>;

    /// Inserts `entry` at position 0. `None` when `user` has no profile.
    async fn prepend_experience(&self, user: &ObjectId, entry: Experience) -> Result<Option<Profile>, AppError>;

    /// Inserts `entry` at position 0. `None` when `user` has no profile.
    async fn prepend_education(&self, user: &ObjectId, entry: Education) -> Result<Option<Profile>, AppError>;

    /// Removes the experience entry `id`. `None` when no profile of `user` holds it.
    async fn remove_experience(&self, user: &ObjectId, id: &ObjectId) -> Result<Option<Profile>, AppError>;

    /// Removes the education entry `id`. `None` when no profile of `user` holds it.
    async fn remove_education(&self, user: &ObjectId, id: &ObjectId) -> Result<Option<Profile>, AppError>;

    async fn ping(&self) -> bool;
}
