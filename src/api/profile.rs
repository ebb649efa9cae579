use actix_web::{guard, web, HttpResponse, ResponseError};
use mongodb::bson::oid::ObjectId;

use crate::api::JsonBody;
use crate::database::ProfileStore;
use crate::middleware::auth::Claims;
use crate::middleware::AuthMiddleware;
use crate::models::{EducationRequest, ExperienceRequest, ProfileRequest, ProfileResponse};
use crate::services::github_service::{self, GithubRepo};
use crate::services::profile_service;
use crate::utils::AppError;

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub msg: String,
}

/// Routes mounted under `/api/profile`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/me")
            .wrap(AuthMiddleware)
            .route(web::get().to(get_my_profile)),
    )
    // Public listing shares the path with the authenticated write routes
    .service(
        web::resource(["", "/"])
            .guard(guard::Get())
            .route(web::get().to(list_profiles)),
    )
    .service(
        web::resource(["", "/"])
            .wrap(AuthMiddleware)
            .route(web::post().to(upsert_profile))
            .route(web::delete().to(delete_profile)),
    )
    .service(web::resource("/user/{user_id}").route(web::get().to(get_profile_by_user)))
    .service(
        web::resource("/experience")
            .wrap(AuthMiddleware)
            .route(web::put().to(add_experience)),
    )
    .service(
        web::resource("/experience/{exp_id}")
            .wrap(AuthMiddleware)
            .route(web::delete().to(delete_experience)),
    )
    .service(
        web::resource("/education")
            .wrap(AuthMiddleware)
            .route(web::put().to(add_education)),
    )
    .service(
        web::resource("/education/{edu_id}")
            .wrap(AuthMiddleware)
            .route(web::delete().to(delete_education)),
    )
    .service(web::resource("/github/{username}").route(web::get().to(get_github_repos)));
}

fn caller(claims: &Claims) -> Result<ObjectId, AppError> {
    claims.user_id().map_err(AppError::Unauthorized)
}

/// Logs the failure at a level matching its status and renders it
fn failure(route: &str, e: AppError) -> HttpResponse {
    if e.status_code().is_server_error() {
        log::error!("❌ {} failed: {}", route, e);
    } else {
        log::warn!("⚠️ {} rejected: {}", route, e);
    }
    e.error_response()
}

#[utoipa::path(
    get,
    path = "/api/profile/me",
    tag = "Profile",
    responses(
        (status = 200, description = "Caller's profile with user name/avatar", body = ProfileResponse),
        (status = 400, description = "No profile for this user", body = MessageResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_my_profile(
    user: web::ReqData<Claims>,
    store: web::Data<dyn ProfileStore>,
) -> HttpResponse {
    log::info!("👤 GET /api/profile/me - user {}", user.sub);

    let user_id = match caller(&user) {
        Ok(id) => id,
        Err(e) => return failure("GET /api/profile/me", e),
    };

    match profile_service::get_own_profile(store.get_ref(), &user_id).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => failure("GET /api/profile/me", e),
    }
}

#[utoipa::path(
    post,
    path = "/api/profile",
    tag = "Profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile created or updated", body = ProfileResponse),
        (status = 400, description = "Missing status or skills"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upsert_profile(
    user: web::ReqData<Claims>,
    store: web::Data<dyn ProfileStore>,
    request: JsonBody<ProfileRequest>,
) -> HttpResponse {
    log::info!("📝 POST /api/profile - user {}", user.sub);

    let user_id = match caller(&user) {
        Ok(id) => id,
        Err(e) => return failure("POST /api/profile", e),
    };

    match profile_service::upsert_profile(store.get_ref(), &user_id, &request.0).await {
        Ok(profile) => {
            log::info!("✅ Profile saved for user {}", user_id);
            HttpResponse::Ok().json(profile)
        }
        Err(e) => failure("POST /api/profile", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    responses(
        (status = 200, description = "All profiles with user name/avatar", body = [ProfileResponse])
    )
)]
pub async fn list_profiles(store: web::Data<dyn ProfileStore>) -> HttpResponse {
    log::info!("📋 GET /api/profile");

    match profile_service::list_profiles(store.get_ref()).await {
        Ok(profiles) => {
            log::info!("✅ Listed {} profiles", profiles.len());
            HttpResponse::Ok().json(profiles)
        }
        Err(e) => failure("GET /api/profile", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/profile/user/{user_id}",
    tag = "Profile",
    params(
        ("user_id" = String, Path, description = "Owner's user id")
    ),
    responses(
        (status = 200, description = "The user's profile", body = ProfileResponse),
        (status = 400, description = "Profile not found", body = MessageResponse)
    )
)]
pub async fn get_profile_by_user(
    path: web::Path<String>,
    store: web::Data<dyn ProfileStore>,
) -> HttpResponse {
    let user_id = path.into_inner();
    log::info!("🔎 GET /api/profile/user/{}", user_id);

    match profile_service::get_profile_by_user_id(store.get_ref(), &user_id).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => failure("GET /api/profile/user", e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/profile",
    tag = "Profile",
    responses(
        (status = 200, description = "Profile and user account deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_profile(
    user: web::ReqData<Claims>,
    store: web::Data<dyn ProfileStore>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /api/profile - user {}", user.sub);

    let user_id = match caller(&user) {
        Ok(id) => id,
        Err(e) => return failure("DELETE /api/profile", e),
    };

    match profile_service::delete_profile_and_user(store.get_ref(), &user_id).await {
        Ok(()) => {
            log::info!("✅ Profile and account deleted: {}", user_id);
            HttpResponse::Ok().json(MessageResponse {
                msg: "User Profile Deleted".to_string(),
            })
        }
        Err(e) => failure("DELETE /api/profile", e),
    }
}

#[utoipa::path(
    put,
    path = "/api/profile/experience",
    tag = "Profile",
    request_body = ExperienceRequest,
    responses(
        (status = 200, description = "Entry added at the top of the experience list", body = ProfileResponse),
        (status = 400, description = "Missing fields or no profile"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_experience(
    user: web::ReqData<Claims>,
    store: web::Data<dyn ProfileStore>,
    request: JsonBody<ExperienceRequest>,
) -> HttpResponse {
    log::info!("💼 PUT /api/profile/experience - user {}", user.sub);

    let user_id = match caller(&user) {
        Ok(id) => id,
        Err(e) => return failure("PUT /api/profile/experience", e),
    };

    match profile_service::add_experience(store.get_ref(), &user_id, request.into_inner()).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => failure("PUT /api/profile/experience", e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/profile/experience/{exp_id}",
    tag = "Profile",
    params(
        ("exp_id" = String, Path, description = "Experience entry id")
    ),
    responses(
        (status = 200, description = "Entry removed", body = ProfileResponse),
        (status = 400, description = "No profile or no such entry", body = MessageResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_experience(
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    store: web::Data<dyn ProfileStore>,
) -> HttpResponse {
    let exp_id = path.into_inner();
    log::info!("🗑️ DELETE /api/profile/experience/{} - user {}", exp_id, user.sub);

    let user_id = match caller(&user) {
        Ok(id) => id,
        Err(e) => return failure("DELETE /api/profile/experience", e),
    };

    match profile_service::remove_experience(store.get_ref(), &user_id, &exp_id).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => failure("DELETE /api/profile/experience", e),
    }
}

#[utoipa::path(
    put,
    path = "/api/profile/education",
    tag = "Profile",
    request_body = EducationRequest,
    responses(
        (status = 200, description = "Entry added at the top of the education list", body = ProfileResponse),
        (status = 400, description = "Missing fields or no profile"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_education(
    user: web::ReqData<Claims>,
    store: web::Data<dyn ProfileStore>,
    request: JsonBody<EducationRequest>,
) -> HttpResponse {
    log::info!("🎓 PUT /api/profile/education - user {}", user.sub);

    let user_id = match caller(&user) {
        Ok(id) => id,
        Err(e) => return failure("PUT /api/profile/education", e),
    };

    match profile_service::add_education(store.get_ref(), &user_id, request.into_inner()).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => failure("PUT /api/profile/education", e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/profile/education/{edu_id}",
    tag = "Profile",
    params(
        ("edu_id" = String, Path, description = "Education entry id")
    ),
    responses(
        (status = 200, description = "Entry removed", body = ProfileResponse),
        (status = 400, description = "No profile or no such entry", body = MessageResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_education(
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    store: web::Data<dyn ProfileStore>,
) -> HttpResponse {
    let edu_id = path.into_inner();
    log::info!("🗑️ DELETE /api/profile/education/{} - user {}", edu_id, user.sub);

    let user_id = match caller(&user) {
        Ok(id) => id,
        Err(e) => return failure("DELETE /api/profile/education", e),
    };

    match profile_service::remove_education(store.get_ref(), &user_id, &edu_id).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => failure("DELETE /api/profile/education", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/profile/github/{username}",
    tag = "Profile",
    params(
        ("username" = String, Path, description = "GitHub login")
    ),
    responses(
        (status = 200, description = "Latest public repositories", body = [GithubRepo]),
        (status = 400, description = "No Github profile found", body = MessageResponse)
    )
)]
pub async fn get_github_repos(path: web::Path<String>) -> HttpResponse {
    let username = path.into_inner();
    log::info!("🐙 GET /api/profile/github/{}", username);

    match github_service::get_user_repos(&username).await {
        Ok(repos) => HttpResponse::Ok().json(repos),
        Err(e) => failure("GET /api/profile/github", e),
    }
}
