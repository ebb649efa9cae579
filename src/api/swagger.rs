use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Profile Service API",
        version = "1.0.0",
        description = "User profiles with work experience and education.\n\n**Authentication:** write endpoints and `/me` require a JWT Bearer token (or the `x-auth-token` header)."
    ),
    paths(
        // Profile endpoints
        crate::api::profile::get_my_profile,
        crate::api::profile::upsert_profile,
        crate::api::profile::list_profiles,
        crate::api::profile::get_profile_by_user,
        crate::api::profile::delete_profile,
        crate::api::profile::add_experience,
        crate::api::profile::delete_experience,
        crate::api::profile::add_education,
        crate::api::profile::delete_education,
        crate::api::profile::get_github_repos,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            // Profile
            crate::models::ProfileRequest,
            crate::models::ExperienceRequest,
            crate::models::EducationRequest,
            crate::models::ProfileResponse,
            crate::models::ProfileOwner,
            crate::models::UserSummaryResponse,
            crate::models::ExperienceResponse,
            crate::models::EducationResponse,
            crate::models::Social,
            crate::api::profile::MessageResponse,
            crate::services::github_service::GithubRepo,
            crate::utils::FieldError,

            // Health
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Profile", description = "Profile CRUD plus the experience and education sub-collections."),
        (name = "Health", description = "Liveness and database connectivity."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build()
                ),
            );
        }
    }
}
