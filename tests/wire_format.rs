//! Wire format compliance tests
//!
//! Verifies the serialized shapes of parts, messages, artifacts, agent
//! cards, and the JSON-RPC invoke envelope against the protocol contract.

use serde_json::{json, Value};

use a2a_bridge::protocol::{
    agent::{AgentCard, Capability, ParameterSpec},
    artifact::Artifact,
    error::A2AError,
    message::{Message, Part, Role},
};

#[test]
fn part_discriminators_are_lowercase_type_tags() {
    let text = Part::text("Hello");
    let json = serde_json::to_value(&text).unwrap();
    assert_eq!(json["type"], "text");
    assert_eq!(json["content"], "Hello");

    let file = Part::file("/tmp/doc.pdf", "application/pdf");
    let json = serde_json::to_value(&file).unwrap();
    assert_eq!(json["type"], "file");
    assert_eq!(json["filePath"], "/tmp/doc.pdf");
    assert_eq!(json["contentType"], "application/pdf");

    let data = Part::data(json!({"k": "v"}));
    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json["type"], "data");
    assert_eq!(json["encoding"], "json");
}

#[test]
fn unknown_part_type_is_a_validation_error() {
    let result = Part::from_wire(&json!({"type": "video", "content": "..."}));
    assert!(matches!(result, Err(A2AError::Validation(_))));
}

#[test]
fn message_roles_serialize_lowercase() {
    for (role, expected) in [
        (Role::User, "user"),
        (Role::Agent, "agent"),
        (Role::System, "system"),
    ] {
        let msg = Message::new(role, vec![Part::text("x")]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], expected);
    }
}

#[test]
fn message_round_trips_through_wire() {
    let original = Message::new(
        Role::Agent,
        vec![
            Part::text("body"),
            Part::data(json!({"rows": [1, 2, 3]})),
        ],
    );

    let wire = original.to_wire();
    let parsed = Message::from_wire(&wire).unwrap();
    assert_eq!(original, parsed);
}

#[test]
fn agent_card_round_trips_through_wire() {
    let capability = Capability::new("text_analysis", "Analyze text sentiment")
        .with_parameter("text", ParameterSpec::required("string", "Text to analyze"))
        .with_returns(json!({"type": "object"}))
        .with_tag("ai")
        .with_example(json!({"text": "great"}), json!({"sentiment": "positive"}));

    let card = AgentCard::new(
        "Workflow Agent",
        "Runs registered workflows",
        "https://agent.example.com".parse().unwrap(),
        vec![capability],
    );

    let wire = card.to_wire();
    assert!(wire.get("serviceEndpointURL").is_some());
    assert_eq!(wire["version"], "1.0.0");
    assert_eq!(wire["supportedModalities"], json!(["text", "json"]));

    let parsed = AgentCard::from_wire(&wire).unwrap();
    assert_eq!(card, parsed);
}

#[test]
fn agent_card_with_empty_capabilities_is_rejected() {
    let wire = json!({
        "id": "1",
        "name": "Empty",
        "description": "d",
        "serviceEndpointURL": "https://x.example.com",
        "capabilities": [],
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    });

    assert!(matches!(
        AgentCard::from_wire(&wire),
        Err(A2AError::AgentCard(_))
    ));
}

#[test]
fn artifact_checksum_tracks_content_updates() {
    let mut artifact = Artifact::document("summary", "first draft");
    assert!(artifact.verify_checksum());

    let initial_checksum = artifact.checksum.clone();
    let initial_size = artifact.size;

    artifact.update_content(Value::String("second draft, somewhat longer".into()));

    assert_ne!(artifact.checksum, initial_checksum);
    assert_ne!(artifact.size, initial_size);
    assert!(artifact.verify_checksum());
    assert_eq!(artifact.size, "second draft, somewhat longer".len() as u64);
}

#[test]
fn artifact_wire_shape_is_tagged_and_camel_cased() {
    let artifact = Artifact::data("metrics", json!({"count": 3}));
    let wire = artifact.to_wire();

    assert_eq!(wire["type"], "data");
    assert!(wire.get("createdAt").is_some());
    assert!(wire.get("updatedAt").is_some());
    assert!(wire.get("checksum").is_some());
    assert!(wire.get("size").is_some());

    let parsed = Artifact::from_wire(&wire).unwrap();
    assert_eq!(artifact, parsed);
}

#[test]
fn unknown_artifact_type_is_a_validation_error() {
    let result = Artifact::from_wire(&json!({"type": "melody", "name": "x"}));
    assert!(matches!(result, Err(A2AError::Validation(_))));
}
