use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A single container spec inside a task definition. Kept as a raw JSON
/// object so that fields the platform adds are carried through untouched.
pub type ContainerDefinition = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkMode {
    pub value: String,
}

impl NetworkMode {
    pub fn new(value: &str) -> Self {
        NetworkMode {
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskDefinition {
    #[serde(default)]
    pub container_definitions: Vec<ContainerDefinition>,
    #[serde(default)]
    pub cpu: Value,
    #[serde(default)]
    pub family: Value,
    #[serde(default)]
    pub inference_accelerators: Vec<Value>,
    #[serde(default)]
    pub memory: Value,
    #[serde(default)]
    pub network_mode: Option<NetworkMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRecord {
    pub name: String,
    pub task_definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    /// Everything else the platform returned; resubmitted verbatim on update.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskInstance {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub task_definition_arn: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub started_at: String,
}

/// Pending tasks report null for fields they have not reached yet.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Container details not found in task definition")]
    MissingContainerDefinitions,
}

pub type DefinitionResult<T> = Result<T, DefinitionError>;
