use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Projection of a `users` document: just what profile responses embed.
///
/// Accounts are created and mutated by the user-management module; this
/// service only reads these two fields and deletes the account along with
/// its profile.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: Option<String>,
    pub avatar: Option<String>,
}
