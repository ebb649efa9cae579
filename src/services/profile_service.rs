use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use std::collections::{HashMap, HashSet};

use crate::database::ProfileStore;
use crate::models::{
    Education, EducationRequest, Experience, ExperienceRequest, Profile, ProfileFields,
    ProfileRequest, ProfileResponse, Social,
};
use crate::utils::{validate_body, AppError, FieldError};

pub const NO_PROFILE: &str = "No profile for this user";
pub const PROFILE_NOT_FOUND: &str = "Profile not found";

/// `"node, react ,  express"` -> `["node", "react", "express"]`
pub fn parse_skills(input: &str) -> Vec<String> {
    input.split(',').map(|skill| skill.trim().to_string()).collect()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Builds the partial update from whichever fields the request carries
pub fn build_profile_fields(request: &ProfileRequest) -> ProfileFields {
    ProfileFields {
        company: non_empty(&request.company),
        website: non_empty(&request.website),
        location: non_empty(&request.location),
        bio: non_empty(&request.bio),
        status: non_empty(&request.status),
        githubusername: non_empty(&request.github),
        skills: request.skills.as_deref().map(parse_skills).unwrap_or_default(),
        social: Social {
            youtube: non_empty(&request.youtube),
            twitter: non_empty(&request.twitter),
            facebook: non_empty(&request.facebook),
            linkedin: non_empty(&request.linkedin),
            instagram: non_empty(&request.instagram),
        },
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC)
pub fn parse_date(param: &str, label: &str, value: &str) -> Result<BsonDateTime, AppError> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        });

    match parsed {
        Some(dt) => Ok(BsonDateTime::from_millis(dt.timestamp_millis())),
        None => Err(AppError::Validation(vec![FieldError::body(
            param,
            &format!("{} date is invalid", label),
        )])),
    }
}

fn parse_optional_date(param: &str, label: &str, value: &Option<String>) -> Result<Option<BsonDateTime>, AppError> {
    match non_empty(value) {
        Some(v) => parse_date(param, label, &v).map(Some),
        None => Ok(None),
    }
}

/// Validates the request and turns it into a new entry with a fresh id
pub fn new_experience(request: ExperienceRequest) -> Result<Experience, AppError> {
    validate_body(&request)?;

    let from = parse_date("from", "From", request.from.as_deref().unwrap_or_default())?;
    let to = parse_optional_date("to", "To", &request.to)?;

    Ok(Experience {
        id: ObjectId::new(),
        title: request.title.unwrap_or_default(),
        company: request.company.unwrap_or_default(),
        location: non_empty(&request.location),
        from,
        to,
        current: request.current.unwrap_or(false),
        description: non_empty(&request.description),
    })
}

/// Validates the request and turns it into a new entry with a fresh id
pub fn new_education(request: EducationRequest) -> Result<Education, AppError> {
    validate_body(&request)?;

    let from = parse_date("from", "From", request.from.as_deref().unwrap_or_default())?;
    let to = parse_optional_date("to", "To", &request.to)?;

    Ok(Education {
        id: ObjectId::new(),
        school: request.school.unwrap_or_default(),
        degree: request.degree.unwrap_or_default(),
        fieldofstudy: request.fieldofstudy.unwrap_or_default(),
        from,
        to,
        current: request.current.unwrap_or(false),
        description: non_empty(&request.description),
    })
}

/// Replaces each profile's `user` reference with the user's name and avatar
async fn populate(store: &dyn ProfileStore, profiles: Vec<Profile>) -> Result<Vec<ProfileResponse>, AppError> {
    let ids: Vec<ObjectId> = profiles
        .iter()
        .map(|p| p.user)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let users: HashMap<ObjectId, _> = store
        .find_users(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(profiles
        .into_iter()
        .map(|p| {
            let owner = users.get(&p.user).cloned();
            ProfileResponse::populated(p, owner)
        })
        .collect())
}

async fn populate_one(store: &dyn ProfileStore, profile: Profile) -> Result<ProfileResponse, AppError> {
    populate(store, vec![profile])
        .await?
        .pop()
        .ok_or_else(|| AppError::DatabaseError("Populate dropped the profile".to_string()))
}

/// GET /me
pub async fn get_own_profile(store: &dyn ProfileStore, user: &ObjectId) -> Result<ProfileResponse, AppError> {
    match store.find_profile(user).await? {
        Some(profile) => populate_one(store, profile).await,
        None => Err(AppError::NotFound(NO_PROFILE.to_string())),
    }
}

/// POST / - nothing is written unless validation passes
pub async fn upsert_profile(
    store: &dyn ProfileStore,
    user: &ObjectId,
    request: &ProfileRequest,
) -> Result<ProfileResponse, AppError> {
    validate_body(request)?;

    let fields = build_profile_fields(request);
    let profile = store.upsert_profile(user, &fields).await?;

    Ok(ProfileResponse::from(profile))
}

/// GET /
pub async fn list_profiles(store: &dyn ProfileStore) -> Result<Vec<ProfileResponse>, AppError> {
    let profiles = store.list_profiles().await?;
    populate(store, profiles).await
}

/// GET /user/{user_id} - a malformed id reads as "not found"
pub async fn get_profile_by_user_id(store: &dyn ProfileStore, user_id: &str) -> Result<ProfileResponse, AppError> {
    let user = ObjectId::parse_str(user_id)
        .map_err(|_| AppError::NotFound(PROFILE_NOT_FOUND.to_string()))?;

    match store.find_profile(&user).await? {
        Some(profile) => populate_one(store, profile).await,
        None => Err(AppError::NotFound(PROFILE_NOT_FOUND.to_string())),
    }
}

/// DELETE / - removes the profile, then the account; neither has to exist
pub async fn delete_profile_and_user(store: &dyn ProfileStore, user: &ObjectId) -> Result<(), AppError> {
    let profile_deleted = store.delete_profile(user).await?;
    let user_deleted = store.delete_user(user).await?;

    log::debug!(
        "Deleted profile={} user={} for {}",
        profile_deleted,
        user_deleted,
        user
    );
    Ok(())
}

/// PUT /experience
pub async fn add_experience(
    store: &dyn ProfileStore,
    user: &ObjectId,
    request: ExperienceRequest,
) -> Result<ProfileResponse, AppError> {
    let entry = new_experience(request)?;

    store
        .prepend_experience(user, entry)
        .await?
        .map(ProfileResponse::from)
        .ok_or_else(|| AppError::NotFound(NO_PROFILE.to_string()))
}

/// PUT /education
pub async fn add_education(
    store: &dyn ProfileStore,
    user: &ObjectId,
    request: EducationRequest,
) -> Result<ProfileResponse, AppError> {
    let entry = new_education(request)?;

    store
        .prepend_education(user, entry)
        .await?
        .map(ProfileResponse::from)
        .ok_or_else(|| AppError::NotFound(NO_PROFILE.to_string()))
}

/// Tells "no profile" apart from "no such entry" after a removal matched nothing
async fn removal_miss(store: &dyn ProfileStore, user: &ObjectId, entry_kind: &str) -> AppError {
    match store.find_profile(user).await {
        Ok(Some(_)) => AppError::NotFound(format!("{} not found", entry_kind)),
        Ok(None) => AppError::NotFound(NO_PROFILE.to_string()),
        Err(e) => e,
    }
}

/// DELETE /experience/{exp_id}
pub async fn remove_experience(
    store: &dyn ProfileStore,
    user: &ObjectId,
    exp_id: &str,
) -> Result<ProfileResponse, AppError> {
    let id = ObjectId::parse_str(exp_id)
        .map_err(|_| AppError::NotFound("Experience not found".to_string()))?;

    match store.remove_experience(user, &id).await? {
        Some(profile) => Ok(ProfileResponse::from(profile)),
        None => Err(removal_miss(store, user, "Experience").await),
    }
}

/// DELETE /education/{edu_id}
pub async fn remove_education(
    store: &dyn ProfileStore,
    user: &ObjectId,
    edu_id: &str,
) -> Result<ProfileResponse, AppError> {
    let id = ObjectId::parse_str(edu_id)
        .map_err(|_| AppError::NotFound("Education not found".to_string()))?;

    match store.remove_education(user, &id).await? {
        Some(profile) => Ok(ProfileResponse::from(profile)),
        None => Err(removal_miss(store, user, "Education").await),
    }
}
