use serde::{Deserialize, Serialize};

use crate::utils::AppError;

const GITHUB_API_BASE: &str = "https://api.github.com";
const REPO_LIMIT: u8 = 5;

pub const NO_GITHUB_PROFILE: &str = "No Github profile found";

/// Public repository, as shown on a profile page
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GithubRepo {
    pub id: u64,
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
}

fn get_github_api_base() -> String {
    std::env::var("GITHUB_API_URL").unwrap_or_else(|_| GITHUB_API_BASE.to_string())
}

/// Latest public repositories of `username`
pub fn repos_url(base: &str, username: &str) -> String {
    format!(
        "{}/users/{}/repos?per_page={}&sort=created:asc",
        base.trim_end_matches('/'),
        urlencoding::encode(username),
        REPO_LIMIT
    )
}

/// Fetches the user's most recent public repositories from GitHub
pub async fn get_user_repos(username: &str) -> Result<Vec<GithubRepo>, AppError> {
    log::info!("🐙 Fetching GitHub repos for: {}", username);

    let url = repos_url(&get_github_api_base(), username);

    let client = reqwest::Client::new();
    let mut request = client
        .get(&url)
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", concat!("profile-service/", env!("CARGO_PKG_VERSION")));

    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        request = request.header("Authorization", format!("token {}", token));
    }

    let response = request
        .send()
        .await
        .map_err(|e| AppError::ExternalError(format!("Failed to fetch from GitHub: {}", e)))?;

    if !response.status().is_success() {
        log::warn!("⚠️ GitHub API returned {} for {}", response.status(), username);
        return Err(AppError::NotFound(NO_GITHUB_PROFILE.to_string()));
    }

    let repos: Vec<GithubRepo> = response
        .json()
        .await
        .map_err(|e| AppError::ExternalError(format!("Failed to parse GitHub response: {}", e)))?;

    log::info!("✅ {} GitHub repos retrieved for {}", repos.len(), username);

    Ok(repos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repos_url() {
        assert_eq!(
            repos_url("https://api.github.com/", "octocat"),
            "https://api.github.com/users/octocat/repos?per_page=5&sort=created:asc"
        );
    }

    #[test]
    fn test_repos_url_encodes_username() {
        let url = repos_url(GITHUB_API_BASE, "../orgs/x y");
        assert!(url.starts_with("https://api.github.com/users/..%2Forgs%2Fx%20y/repos"));
    }

    #[test]
    fn test_repo_parses_github_payload() {
        let payload = serde_json::json!({
            "id": 1296269,
            "name": "Hello-World",
            "html_url": "https://github.com/octocat/Hello-World",
            "description": null,
            "stargazers_count": 80,
            "watchers_count": 80,
            "forks_count": 9,
            "private": false
        });

        let repo: GithubRepo = serde_json::from_value(payload).unwrap();
        assert_eq!(repo.name, "Hello-World");
        assert_eq!(repo.description, None);
        assert_eq!(repo.forks_count, 9);
    }

    #[tokio::test]
    #[ignore] // Requires network access to api.github.com
    async fn test_fetch_octocat_repos() {
        let repos = get_user_repos("octocat").await;
        assert!(repos.is_ok());
        assert!(repos.unwrap().len() <= REPO_LIMIT as usize);
    }
}
