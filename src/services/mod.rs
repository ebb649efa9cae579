pub mod auth_service;
pub mod github_service;
pub mod profile_service;
