use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Mutex;

use super::ProfileStore;
use crate::models::{Education, Experience, Profile, ProfileFields, UserSummary};
use crate::utils::AppError;

/// In-memory `ProfileStore` for handler tests
#[derive(Default)]
pub struct MemoryStore {
    profiles: Mutex<Vec<Profile>>,
    users: Mutex<Vec<UserSummary>>,
    /// When set, every operation fails like an unreachable database
    pub offline: bool,
}

impl MemoryStore {
    pub fn offline() -> Self {
        MemoryStore { offline: true, ..MemoryStore::default() }
    }

    pub fn add_user(&self, name: &str) -> ObjectId {
        let id = ObjectId::new();
        self.users.lock().unwrap().push(UserSummary {
            id,
            name: Some(name.to_string()),
            avatar: Some(format!("//www.gravatar.com/avatar/{}", name)),
        });
        id
    }

    pub fn has_user(&self, id: &ObjectId) -> bool {
        self.users.lock().unwrap().iter().any(|u| u.id == *id)
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.offline {
            return Err(AppError::DatabaseError("server selection timeout".to_string()));
        }
        Ok(())
    }

    fn update<F>(&self, user: &ObjectId, f: F) -> Result<Option<Profile>, AppError>
    where
        F: FnOnce(&mut Profile) -> bool,
    {
        self.check()?;
        let mut profiles = self.profiles.lock().unwrap();
        let Some(profile) = profiles.iter_mut().find(|p| p.user == *user) else {
            return Ok(None);
        };
        if f(profile) {
            Ok(Some(profile.clone()))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile(&self, user: &ObjectId) -> Result<Option<Profile>, AppError> {
        self.check()?;
        Ok(self.profiles.lock().unwrap().iter().find(|p| p.user == *user).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.check()?;
        Ok(self.profiles.lock().unwrap().clone())
    }

    async fn upsert_profile(&self, user: &ObjectId, fields: &ProfileFields) -> Result<Profile, AppError> {
        self.check()?;
        let mut profiles = self.profiles.lock().unwrap();
        let index = match profiles.iter().position(|p| p.user == *user) {
            Some(index) => index,
            None => {
                profiles.push(Profile::new(*user));
                profiles.len() - 1
            }
        };
        fields.apply_to(&mut profiles[index]);
        Ok(profiles[index].clone())
    }

    async fn delete_profile(&self, user: &ObjectId) -> Result<bool, AppError> {
        self.check()?;
        let mut profiles = self.profiles.lock().unwrap();
        let before = profiles.len();
        profiles.retain(|p| p.user != *user);
        Ok(profiles.len() < before)
    }

    async fn delete_user(&self, user: &ObjectId) -> Result<bool, AppError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != *user);
        Ok(users.len() < before)
    }

    async fn find_users(&self, ids: &[ObjectId]) -> Result<Vec<UserSummary>, AppError> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn prepend_experience(&self, user: &ObjectId, entry: Experience) -> Result<Option<Profile>, AppError> {
        self.update(user, |p| {
            p.experience.insert(0, entry);
            true
        })
    }

    async fn prepend_education(&self, user: &ObjectId, entry: Education) -> Result<Option<Profile>, AppError> {
        self.update(user, |p| {
            p.education.insert(0, entry);
            true
        })
    }

    async fn remove_experience(&self, user: &ObjectId, id: &ObjectId) -> Result<Option<Profile>, AppError> {
        self.update(user, |p| {
            let before = p.experience.len();
            p.experience.retain(|e| e.id != *id);
            p.experience.len() < before
        })
    }

    async fn remove_education(&self, user: &ObjectId, id: &ObjectId) -> Result<Option<Profile>, AppError> {
        self.update(user, |p| {
            let before = p.education.len();
            p.education.retain(|e| e.id != *id);
            p.education.len() < before
        })
    }

    async fn ping(&self) -> bool {
        !self.offline
    }
}
