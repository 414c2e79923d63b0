use reqwest::{Response, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;

use super::types::{PlatformClient, PlatformConfig, PlatformError, PlatformResult};
use crate::lib::tasks::{
    sanitize::is_truthy,
    types::{ServiceRecord, TaskDefinition, TaskInstance},
};

const GET_SERVICES: &str = "GetEcsServices";
const FIND_TASK_DEFINITION: &str = "FindEcsTaskDefinition";
const REGISTER_TASK_DEFINITION: &str = "UpdateEcsTaskDefinition";
const UPDATE_SERVICE: &str = "UpdateEcsService";
const GET_TASKS: &str = "GetEcsTasks";

impl PlatformClient {
    pub fn new(config: &PlatformConfig) -> Self {
        PlatformClient {
            client: reqwest::Client::new(),
            base_url: config.base_url(),
            token: config.token.clone(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn get(&self, endpoint: &'static str) -> PlatformResult<Response> {
        debug!("GET {}", endpoint);
        self.client
            .get(self.url(endpoint))
            .bearer_auth(&self.token)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|source| PlatformError::Request { endpoint, source })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        body: &B,
    ) -> PlatformResult<Response> {
        debug!("POST {}", endpoint);
        self.client
            .post(self.url(endpoint))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|source| PlatformError::Request { endpoint, source })
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &'static str,
        response: Response,
    ) -> PlatformResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::UnexpectedStatus { endpoint, status });
        }

        response
            .json()
            .await
            .map_err(|source| PlatformError::Request { endpoint, source })
    }

    /// Raw service listing; only the record picked by [`Self::find_service`]
    /// is decoded.
    pub async fn list_services(&self) -> PlatformResult<Vec<Value>> {
        let response = self.get(GET_SERVICES).await?;
        Self::decode(GET_SERVICES, response).await
    }

    pub async fn find_service(&self, name: &str) -> PlatformResult<ServiceRecord> {
        let record = self
            .list_services()
            .await?
            .into_iter()
            .find(|service| service["Name"].as_str() == Some(name))
            .ok_or_else(|| PlatformError::NotFound(format!("ECS service {}", name)))?;

        serde_json::from_value(record).map_err(|source| PlatformError::Decode {
            endpoint: GET_SERVICES,
            source,
        })
    }

    pub async fn find_task_definition(&self, arn: &str) -> PlatformResult<TaskDefinition> {
        let response = self.post(FIND_TASK_DEFINITION, &json!({ "Arn": arn })).await?;
        let body: Value = Self::decode(FIND_TASK_DEFINITION, response).await?;

        if !is_truthy(&body) {
            return Err(PlatformError::NotFound(format!("task definition {}", arn)));
        }

        serde_json::from_value(body).map_err(|source| PlatformError::Decode {
            endpoint: FIND_TASK_DEFINITION,
            source,
        })
    }

    /// Registers a new revision and returns its ARN.
    pub async fn register_task_definition(
        &self,
        definition: &TaskDefinition,
    ) -> PlatformResult<String> {
        let response = self.post(REGISTER_TASK_DEFINITION, definition).await?;
        debug!("{} returned {}", REGISTER_TASK_DEFINITION, response.status());

        if response.status() != StatusCode::OK {
            return Err(PlatformError::RegistrationFailed(response.status()));
        }

        response
            .json()
            .await
            .map_err(|source| PlatformError::Request {
                endpoint: REGISTER_TASK_DEFINITION,
                source,
            })
    }

    pub async fn update_service(&self, service: &ServiceRecord) -> PlatformResult<()> {
        let response = self.post(UPDATE_SERVICE, service).await?;

        if response.status() != StatusCode::OK {
            return Err(PlatformError::ServiceUpdateFailed {
                service: service.name.clone(),
                status: response.status(),
            });
        }

        Ok(())
    }

    pub async fn list_tasks(&self) -> PlatformResult<Vec<TaskInstance>> {
        let response = self.get(GET_TASKS).await?;
        Self::decode(GET_TASKS, response).await
    }
}
