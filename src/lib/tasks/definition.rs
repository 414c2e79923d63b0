use serde_json::Value;

use super::sanitize::sanitize_object;
use super::types::{DefinitionError, DefinitionResult, NetworkMode, TaskDefinition};

/// Network mode stamped onto every definition registered through
/// [`build_definition`]. The source definition's own mode is discarded, so
/// services running bridge or host networking must not go through this path.
pub const AWSVPC_NETWORK_MODE: &str = "awsvpc";

/// Builds the payload for a new task definition revision running `image`.
///
/// Only the first container definition survives. It is sanitized and its
/// `Image` replaced; `Cpu`, `Family` and `Memory` are copied verbatim.
pub fn build_definition(existing: &TaskDefinition, image: &str) -> DefinitionResult<TaskDefinition> {
    build_definition_with(existing, image, NetworkMode::new(AWSVPC_NETWORK_MODE))
}

pub fn build_definition_with(
    existing: &TaskDefinition,
    image: &str,
    network_mode: NetworkMode,
) -> DefinitionResult<TaskDefinition> {
    let first = existing
        .container_definitions
        .first()
        .ok_or(DefinitionError::MissingContainerDefinitions)?;

    let mut container = sanitize_object(first);
    container.insert("Image".to_string(), Value::String(image.to_string()));

    Ok(TaskDefinition {
        container_definitions: vec![container],
        cpu: existing.cpu.clone(),
        family: existing.family.clone(),
        inference_accelerators: Vec::new(),
        memory: existing.memory.clone(),
        network_mode: Some(network_mode),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn existing() -> TaskDefinition {
        serde_json::from_value(json!({
            "ContainerDefinitions": [
                {
                    "Name": "api",
                    "Image": "registry.example.com/api:1.0.0",
                    "Essential": true,
                    "Environment": [],
                    "PortMappings": [{"ContainerPort": 8080, "HostPort": 8080}],
                    "LogConfiguration": null
                },
                {"Name": "sidecar", "Image": "envoy:1.29"}
            ],
            "Cpu": "512",
            "Memory": "1024",
            "Family": "duploservices-dev-api",
            "InferenceAccelerators": [{"DeviceName": "eia"}],
            "NetworkMode": {"Value": "bridge"}
        }))
        .unwrap()
    }

    #[test]
    fn keeps_only_the_first_container() {
        let built = build_definition(&existing(), "registry.example.com/api:1.1.0").unwrap();

        assert_eq!(built.container_definitions.len(), 1);
        assert_eq!(built.container_definitions[0]["Name"], json!("api"));
    }

    #[test]
    fn replaces_image_and_sanitizes_container() {
        let built = build_definition(&existing(), "registry.example.com/api:1.1.0").unwrap();

        assert_eq!(
            Value::Object(built.container_definitions[0].clone()),
            json!({
                "Name": "api",
                "Image": "registry.example.com/api:1.1.0",
                "Essential": true,
                "PortMappings": [{"ContainerPort": 8080, "HostPort": 8080}]
            })
        );
    }

    #[test]
    fn forces_awsvpc_and_clears_accelerators() {
        let built = build_definition(&existing(), "api:2").unwrap();

        assert_eq!(built.network_mode, Some(NetworkMode::new("awsvpc")));
        assert!(built.inference_accelerators.is_empty());
        assert_eq!(
            serde_json::to_value(&built).unwrap()["NetworkMode"],
            json!({"Value": "awsvpc"})
        );
    }

    #[test]
    fn carries_sizing_and_family_verbatim() {
        let built = build_definition(&existing(), "api:2").unwrap();

        assert_eq!(built.cpu, json!("512"));
        assert_eq!(built.memory, json!("1024"));
        assert_eq!(built.family, json!("duploservices-dev-api"));
    }

    #[test]
    fn inserts_image_when_missing() {
        let def = TaskDefinition {
            container_definitions: vec![json!({"Name": "worker"}).as_object().unwrap().clone()],
            ..Default::default()
        };

        let built = build_definition(&def, "worker:7").unwrap();
        assert_eq!(built.container_definitions[0]["Image"], json!("worker:7"));
    }

    #[test]
    fn custom_network_mode_is_respected() {
        let built = build_definition_with(&existing(), "api:2", NetworkMode::new("bridge")).unwrap();
        assert_eq!(built.network_mode, Some(NetworkMode::new("bridge")));
    }

    #[test]
    fn rejects_definition_without_containers() {
        let def = TaskDefinition {
            family: json!("empty"),
            ..Default::default()
        };

        assert_eq!(
            build_definition(&def, "api:2"),
            Err(DefinitionError::MissingContainerDefinitions)
        );
    }
}
