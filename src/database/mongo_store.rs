use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;
use mongodb::Collection;

use super::{MongoDB, ProfileStore, PROFILES, USERS};
use crate::models::{Education, Experience, Profile, ProfileFields, UserSummary};
use crate::utils::AppError;

impl MongoDB {
    fn profiles(&self) -> Collection<Profile> {
        self.collection::<Profile>(PROFILES)
    }

    /// `$push` at the head of `field`, returning the updated profile
    async fn prepend(&self, user: &ObjectId, field: &str, entry: Bson) -> Result<Option<Profile>, AppError> {
        let mut push = Document::new();
        push.insert(field, doc! { "$each": [entry], "$position": 0 });

        let profile = self
            .profiles()
            .find_one_and_update(doc! { "user": *user }, doc! { "$push": push })
            .return_document(ReturnDocument::After)
            .await?;

        Ok(profile)
    }

    /// `$pull` of the entry `id` from `field`; only matches profiles that hold it
    async fn pull(&self, user: &ObjectId, field: &str, id: &ObjectId) -> Result<Option<Profile>, AppError> {
        let mut filter = doc! { "user": *user };
        filter.insert(format!("{}._id", field), *id);

        let mut pull = Document::new();
        pull.insert(field, doc! { "_id": *id });

        let profile = self
            .profiles()
            .find_one_and_update(filter, doc! { "$pull": pull })
            .return_document(ReturnDocument::After)
            .await?;

        Ok(profile)
    }
}

#[async_trait]
impl ProfileStore for MongoDB {
    async fn find_profile(&self, user: &ObjectId) -> Result<Option<Profile>, AppError> {
        Ok(self.profiles().find_one(doc! { "user": *user }).await?)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let cursor = self.profiles().find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn upsert_profile(&self, user: &ObjectId, fields: &ProfileFields) -> Result<Profile, AppError> {
        let update = doc! {
            "$set": fields.to_set_document(user)?,
            "$setOnInsert": {
                "date": BsonDateTime::now(),
                "experience": [],
                "education": [],
            },
        };

        self.profiles()
            .find_one_and_update(doc! { "user": *user }, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::DatabaseError("Upsert returned no document".to_string()))
    }

    async fn delete_profile(&self, user: &ObjectId) -> Result<bool, AppError> {
        let result = self.profiles().delete_one(doc! { "user": *user }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_user(&self, user: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .collection::<Document>(USERS)
            .delete_one(doc! { "_id": *user })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn find_users(&self, ids: &[ObjectId]) -> Result<Vec<UserSummary>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Bson> = ids.iter().map(|id| Bson::ObjectId(*id)).collect();
        let cursor = self
            .collection::<UserSummary>(USERS)
            .find(doc! { "_id": { "$in": ids } })
            .projection(doc! { "name": 1, "avatar": 1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn prepend_experience(&self, user: &ObjectId, entry: Experience) -> Result<Option<Profile>, AppError> {
        self.prepend(user, "experience", mongodb::bson::to_bson(&entry)?).await
    }

    async fn prepend_education(&self, user: &ObjectId, entry: Education) -> Result<Option<Profile>, AppError> {
        self.prepend(user, "education", mongodb::bson::to_bson(&entry)?).await
    }

    async fn remove_experience(&self, user: &ObjectId, id: &ObjectId) -> Result<Option<Profile>, AppError> {
        self.pull(user, "experience", id).await
    }

    async fn remove_education(&self, user: &ObjectId, id: &ObjectId) -> Result<Option<Profile>, AppError> {
        self.pull(user, "education", id).await
    }

    async fn ping(&self) -> bool {
        self.health_check().await
    }
}
