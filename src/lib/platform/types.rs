use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub host: String,
    pub tenant_id: String,
    pub token: String,
}

impl PlatformConfig {
    pub fn new(host: &str, tenant_id: &str, token: &str) -> Self {
        PlatformConfig {
            host: host.to_string(),
            tenant_id: tenant_id.to_string(),
            token: token.to_string(),
        }
    }

    /// Tenant-scoped root every endpoint hangs off.
    pub fn base_url(&self) -> String {
        format!(
            "{}/subscriptions/{}",
            self.host.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

/// Client for the tenant API endpoints a redeploy touches.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    pub client: reqwest::Client,
    pub base_url: String,
    pub token: String,
}

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Failed to create new task definition version: {0}")]
    RegistrationFailed(StatusCode),

    #[error("Failed to update service {service}: {status}")]
    ServiceUpdateFailed { service: String, status: StatusCode },

    #[error("Unexpected status {status} from {endpoint}")]
    UnexpectedStatus {
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error("Could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

pub type PlatformResult<T> = Result<T, PlatformError>;
