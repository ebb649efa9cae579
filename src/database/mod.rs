mod mongo_store;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use store::ProfileStore;

use mongodb::{Client, Collection, Database};
use std::error::Error;

pub const PROFILES: &str = "profiles";
pub const USERS: &str = "users";

const DEFAULT_DATABASE: &str = "devconnector";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = database_name(uri);

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes profile queries rely on
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        // profiles(user) unique - one profile per user, upserts are keyed on it
        let profiles = self.database().collection::<mongodb::bson::Document>(PROFILES);

        let profile_user_index = IndexModel::builder()
            .keys(doc! { "user": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match profiles.create_index(profile_user_index).await {
            Ok(_) => log::info!("   ✅ Index created: profiles(user) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // profiles(education._id) / profiles(experience._id) - sub-entry removal
        for path in ["education._id", "experience._id"] {
            let mut keys = mongodb::bson::Document::new();
            keys.insert(path, 1);
            let index = IndexModel::builder().keys(keys).build();

            match profiles.create_index(index).await {
                Ok(_) => log::info!("   ✅ Index created: profiles({})", path),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Check if the connection is healthy
    pub async fn health_check(&self) -> bool {
        self.db.list_collection_names().await.is_ok()
    }
}

/// Database named in the URI path, e.g. `mongodb://host:27017/<name>?opts`
fn database_name(uri: &str) -> &str {
    let authority_and_path = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);

    authority_and_path
        .split_once('/')
        .and_then(|(_, path)| path.split('?').next())
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DATABASE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Education, Experience, ProfileFields};
    use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};

    #[test]
    fn test_database_name_from_uri() {
        assert_eq!(database_name("mongodb://localhost:27017/profiles_db"), "profiles_db");
        assert_eq!(database_name("mongodb+srv://u:p@cluster.net/app?retryWrites=true"), "app");
        assert_eq!(database_name("mongodb://localhost:27017"), "devconnector");
        assert_eq!(database_name("mongodb://localhost:27017/"), "devconnector");
        assert_eq!(database_name("mongodb://localhost"), "devconnector");
        assert_eq!(database_name("mongodb+srv://cluster.example.net"), "devconnector");
        assert_eq!(database_name("mongodb+srv://u:p@cluster.example.net/?w=majority"), "devconnector");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/profile_service_test".to_string());

        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
        assert!(db.unwrap().health_check().await);
    }

    async fn test_db() -> MongoDB {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/profile_service_test".to_string());
        MongoDB::new(&uri).await.expect("MongoDB must be running")
    }

    fn fields(status: &str) -> ProfileFields {
        ProfileFields {
            status: Some(status.to_string()),
            skills: vec!["rust".to_string()],
            ..ProfileFields::default()
        }
    }

    fn experience(title: &str) -> Experience {
        Experience {
            id: ObjectId::new(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: None,
            from: BsonDateTime::now(),
            to: None,
            current: false,
            description: None,
        }
    }

    fn education(school: &str) -> Education {
        Education {
            id: ObjectId::new(),
            school: school.to_string(),
            degree: "BSc".to_string(),
            fieldofstudy: "CS".to_string(),
            from: BsonDateTime::now(),
            to: None,
            current: false,
            description: None,
        }
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_upsert_twice_keeps_one_profile() {
        let db = test_db().await;
        let user = ObjectId::new();

        let created = db.upsert_profile(&user, &fields("Student")).await.unwrap();
        assert!(created.experience.is_empty());
        assert!(created.education.is_empty());

        db.prepend_experience(&user, experience("Junior")).await.unwrap();

        let updated = db.upsert_profile(&user, &fields("Developer")).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.status.as_deref(), Some("Developer"));
        assert_eq!(updated.experience.len(), 1);
        assert_eq!(updated.date, created.date);

        let count = db
            .collection::<Document>(PROFILES)
            .count_documents(doc! { "user": user })
            .await
            .unwrap();
        assert_eq!(count, 1);

        db.delete_profile(&user).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_prepend_puts_newest_first() {
        let db = test_db().await;
        let user = ObjectId::new();

        assert!(db.prepend_education(&user, education("Nowhere")).await.unwrap().is_none());

        db.upsert_profile(&user, &fields("Developer")).await.unwrap();
        db.prepend_experience(&user, experience("Junior")).await.unwrap();
        let profile = db.prepend_experience(&user, experience("Senior")).await.unwrap().unwrap();

        let titles: Vec<&str> = profile.experience.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Senior", "Junior"]);

        db.delete_profile(&user).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_pull_of_unknown_entry_leaves_profile_untouched() {
        let db = test_db().await;
        let user = ObjectId::new();

        db.upsert_profile(&user, &fields("Developer")).await.unwrap();
        db.prepend_education(&user, education("First")).await.unwrap();
        let profile = db.prepend_education(&user, education("Second")).await.unwrap().unwrap();

        assert!(db.remove_education(&user, &ObjectId::new()).await.unwrap().is_none());
        assert_eq!(db.find_profile(&user).await.unwrap().unwrap().education.len(), 2);

        let first = profile.education[1].id;
        let profile = db.remove_education(&user, &first).await.unwrap().unwrap();
        let schools: Vec<&str> = profile.education.iter().map(|e| e.school.as_str()).collect();
        assert_eq!(schools, vec!["Second"]);

        db.delete_profile(&user).await.unwrap();
    }
}
