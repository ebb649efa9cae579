use chrono::{DateTime, Utc};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserSummary;

/// Links to the user's social accounts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Social {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

/// Work experience entry (stored inside the profile document)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: BsonDateTime,
    pub to: Option<BsonDateTime>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

/// Education entry (stored inside the profile document)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: BsonDateTime,
    pub to: Option<BsonDateTime>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

/// Profile document (one per user, stored in MongoDB)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Owning user (`users._id`), unique across profiles
    pub user: ObjectId,

    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub bio: Option<String>,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub social: Social,

    /// Most recent entry first
    #[serde(default)]
    pub experience: Vec<Experience>,

    /// Most recent entry first
    #[serde(default)]
    pub education: Vec<Education>,

    #[serde(default = "BsonDateTime::now")]
    pub date: BsonDateTime,
}

#[cfg(test)]
impl Profile {
    /// Empty profile for `user`, as it looks right after an upsert-insert
    pub fn new(user: ObjectId) -> Self {
        Profile {
            id: Some(ObjectId::new()),
            user,
            company: None,
            website: None,
            location: None,
            status: None,
            githubusername: None,
            bio: None,
            skills: Vec::new(),
            social: Social::default(),
            experience: Vec::new(),
            education: Vec::new(),
            date: BsonDateTime::now(),
        }
    }
}

/// Partial update built from a create/update request.
///
/// Only fields that were sent (and non-empty) are set; `skills` and `social`
/// are always written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Vec<String>,
    pub social: Social,
}

impl ProfileFields {
    /// `$set` document for the upsert
    pub fn to_set_document(&self, user: &ObjectId) -> Result<Document, mongodb::bson::ser::Error> {
        let mut set = doc! { "user": *user };

        if let Some(company) = &self.company { set.insert("company", company.as_str()); }
        if let Some(website) = &self.website { set.insert("website", website.as_str()); }
        if let Some(location) = &self.location { set.insert("location", location.as_str()); }
        if let Some(bio) = &self.bio { set.insert("bio", bio.as_str()); }
        if let Some(status) = &self.status { set.insert("status", status.as_str()); }
        if let Some(github) = &self.githubusername { set.insert("githubusername", github.as_str()); }

        set.insert("skills", self.skills.clone());
        set.insert("social", mongodb::bson::to_bson(&self.social)?);

        Ok(set)
    }

    /// Same semantics as `to_set_document`, applied to an in-memory profile
    #[cfg(test)]
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(company) = &self.company { profile.company = Some(company.clone()); }
        if let Some(website) = &self.website { profile.website = Some(website.clone()); }
        if let Some(location) = &self.location { profile.location = Some(location.clone()); }
        if let Some(bio) = &self.bio { profile.bio = Some(bio.clone()); }
        if let Some(status) = &self.status { profile.status = Some(status.clone()); }
        if let Some(github) = &self.githubusername { profile.githubusername = Some(github.clone()); }

        profile.skills = self.skills.clone();
        profile.social = self.social.clone();
    }
}

// ==================== REQUESTS ====================

/// Create/update body for `POST /api/profile`
#[derive(Debug, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct ProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    #[validate(
        required(message = "Status is required"),
        length(min = 1, message = "Status is required")
    )]
    pub status: Option<String>,
    pub github: Option<String>,
    /// Comma-separated list, e.g. `"rust, actix, mongodb"`
    #[validate(
        required(message = "Skills is required"),
        length(min = 1, message = "Skills is required")
    )]
    pub skills: Option<String>,
    pub youtube: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct ExperienceRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, message = "Title is required")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "Company is required"),
        length(min = 1, message = "Company is required")
    )]
    pub company: Option<String>,
    pub location: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    #[validate(
        required(message = "From date is required"),
        length(min = 1, message = "From date is required")
    )]
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct EducationRequest {
    #[validate(
        required(message = "School is required"),
        length(min = 1, message = "School is required")
    )]
    pub school: Option<String>,
    #[validate(
        required(message = "Degree is required"),
        length(min = 1, message = "Degree is required")
    )]
    pub degree: Option<String>,
    #[validate(
        required(message = "Field of study is required"),
        length(min = 1, message = "Field of study is required")
    )]
    pub fieldofstudy: Option<String>,
    #[validate(
        required(message = "From date is required"),
        length(min = 1, message = "From date is required")
    )]
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

// ==================== RESPONSES ====================

/// `user` as returned to clients: bare id, populated with name/avatar, or
/// `null` once the account is gone
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum ProfileOwner {
    Id(String),
    Populated(UserSummaryResponse),
    Missing,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserSummaryResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl From<UserSummary> for UserSummaryResponse {
    fn from(user: UserSummary) -> Self {
        UserSummaryResponse {
            id: user.id.to_hex(),
            name: user.name,
            avatar: user.avatar,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ExperienceResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<Experience> for ExperienceResponse {
    fn from(e: Experience) -> Self {
        ExperienceResponse {
            id: e.id.to_hex(),
            title: e.title,
            company: e.company,
            location: e.location,
            from: to_chrono(e.from),
            to: e.to.map(to_chrono),
            current: e.current,
            description: e.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct EducationResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<Education> for EducationResponse {
    fn from(e: Education) -> Self {
        EducationResponse {
            id: e.id.to_hex(),
            school: e.school,
            degree: e.degree,
            fieldofstudy: e.fieldofstudy,
            from: to_chrono(e.from),
            to: e.to.map(to_chrono),
            current: e.current,
            description: e.description,
        }
    }
}

/// Profile as returned by the API
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: ProfileOwner,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub social: Social,
    pub experience: Vec<ExperienceResponse>,
    pub education: Vec<EducationResponse>,
    pub date: DateTime<Utc>,
}

impl ProfileResponse {
    /// Replaces the bare `user` id with the user's name and avatar
    pub fn populated(profile: Profile, owner: Option<UserSummary>) -> Self {
        let mut response = ProfileResponse::from(profile);
        response.user = match owner {
            Some(owner) => ProfileOwner::Populated(owner.into()),
            None => ProfileOwner::Missing,
        };
        response
    }
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        ProfileResponse {
            id: p.id.map(|id| id.to_hex()).unwrap_or_default(),
            user: ProfileOwner::Id(p.user.to_hex()),
            company: p.company,
            website: p.website,
            location: p.location,
            status: p.status,
            githubusername: p.githubusername,
            bio: p.bio,
            skills: p.skills,
            social: p.social,
            experience: p.experience.into_iter().map(ExperienceResponse::from).collect(),
            education: p.education.into_iter().map(EducationResponse::from).collect(),
            date: to_chrono(p.date),
        }
    }
}

fn to_chrono(dt: BsonDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_document_routes_each_field_to_its_own_key() {
        let user = ObjectId::new();
        let fields = ProfileFields {
            company: Some("Acme".into()),
            location: Some("Lisbon".into()),
            status: Some("Developer".into()),
            githubusername: Some("octocat".into()),
            skills: vec!["rust".into(), "actix".into()],
            social: Social {
                linkedin: Some("in/octo".into()),
                instagram: Some("@octo".into()),
                ..Social::default()
            },
            ..ProfileFields::default()
        };

        let set = fields.to_set_document(&user).unwrap();

        assert_eq!(set.get_object_id("user").unwrap(), user);
        assert_eq!(set.get_str("company").unwrap(), "Acme");
        assert_eq!(set.get_str("location").unwrap(), "Lisbon");
        assert_eq!(set.get_str("status").unwrap(), "Developer");
        assert_eq!(set.get_str("githubusername").unwrap(), "octocat");
        assert!(!set.contains_key("website"));
        assert!(!set.contains_key("bio"));

        let social = set.get_document("social").unwrap();
        assert_eq!(social.get_str("linkedin").unwrap(), "in/octo");
        assert_eq!(social.get_str("instagram").unwrap(), "@octo");
        assert!(!social.contains_key("youtube"));
    }

    #[test]
    fn test_apply_keeps_unsent_fields_and_replaces_social() {
        let mut profile = Profile::new(ObjectId::new());
        profile.bio = Some("old bio".into());
        profile.social.youtube = Some("yt".into());

        let fields = ProfileFields {
            status: Some("Student".into()),
            skills: vec!["go".into()],
            ..ProfileFields::default()
        };
        fields.apply_to(&mut profile);

        assert_eq!(profile.bio.as_deref(), Some("old bio"));
        assert_eq!(profile.status.as_deref(), Some("Student"));
        assert_eq!(profile.skills, vec!["go".to_string()]);
        assert_eq!(profile.social, Social::default());
    }

    #[test]
    fn test_response_renders_ids_as_hex() {
        let user = ObjectId::new();
        let profile = Profile::new(user);
        let id = profile.id.unwrap();

        let json = serde_json::to_value(ProfileResponse::from(profile)).unwrap();

        assert_eq!(json["_id"], id.to_hex());
        assert_eq!(json["user"], user.to_hex());
        assert!(json.get("company").is_none());
        assert_eq!(json["skills"], serde_json::json!([]));
    }

    #[test]
    fn test_populated_response_embeds_name_and_avatar() {
        let user = ObjectId::new();
        let owner = UserSummary {
            id: user,
            name: Some("Ada".into()),
            avatar: Some("//gravatar/ada".into()),
        };

        let json = serde_json::to_value(ProfileResponse::populated(Profile::new(user), Some(owner))).unwrap();

        assert_eq!(json["user"]["_id"], user.to_hex());
        assert_eq!(json["user"]["name"], "Ada");
        assert_eq!(json["user"]["avatar"], "//gravatar/ada");
    }

    #[test]
    fn test_populated_response_without_account_has_null_user() {
        let json = serde_json::to_value(ProfileResponse::populated(Profile::new(ObjectId::new()), None)).unwrap();

        assert!(json["user"].is_null());
        assert!(json["_id"].is_string());
    }
}
