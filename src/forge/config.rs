//! Configuration for the code hosting connection.
use secrecy::SecretString;

/// Remote repository connection configuration for authenticating and
/// interacting with the hosting API.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote forge host (e.g., "github.com").
    pub host: String,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Access token for authentication.
    pub token: SecretString,
}

impl RemoteConfig {
    /// Base URI of the REST API for this host.
    pub fn api_base_uri(&self) -> String {
        if self.host == "github.com" {
            format!("{}://api.{}", self.scheme, self.host)
        } else {
            // GitHub Enterprise serves its API under /api/v3
            format!("{}://{}/api/v3", self.scheme, self.host)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str) -> RemoteConfig {
        RemoteConfig {
            host: host.into(),
            scheme: "https".into(),
            owner: "bbc".into(),
            repo: "psammead".into(),
            token: SecretString::from("token".to_string()),
        }
    }

    #[test]
    fn api_base_uri_for_github_dot_com() {
        assert_eq!(config("github.com").api_base_uri(), "https://api.github.com");
    }

    #[test]
    fn api_base_uri_for_enterprise() {
        assert_eq!(
            config("github.example.com").api_base_uri(),
            "https://github.example.com/api/v3"
        );
    }
}
