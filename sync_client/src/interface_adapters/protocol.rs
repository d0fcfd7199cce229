// Wire protocol DTOs and conversions for the pose sync session.
// Frames are JSON text tagged as {"type": ..., "data": ...}.

use crate::domain::{
    FireEvent, InboundEvent, OutboundEvent, ParticipantId, ParticipantSnapshot, Pose,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    // Local pose, once per tick.
    Move(MoveDto),
    // One fire action per gesture.
    Shoot(ShootDto),
}

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    // Assigned identity for the connection.
    Identity(IdentityDto),
    // Full snapshot of every connected participant keyed by id.
    Move(HashMap<String, PoseDto>),
    // Fire action relayed from some participant (possibly us).
    Shoot(ShootDto),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityDto {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveDto {
    pub id: String,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseDto {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShootDto {
    pub id: String,
    pub position: [f32; 3],
    pub direction: [f32; 3],
}

#[derive(Debug)]
pub enum ProtocolError {
    // Not JSON, unknown type, missing fields or wrong vector length.
    Decode(serde_json::Error),
    NonFinite { id: String, field: &'static str },
    EmptyId,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Decode(err) => write!(f, "malformed message: {err}"),
            ProtocolError::NonFinite { id, field } => {
                write!(f, "non-finite {field} for participant {id}")
            }
            ProtocolError::EmptyId => write!(f, "empty participant id"),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<&OutboundEvent> for ClientMessage {
    fn from(event: &OutboundEvent) -> Self {
        match event {
            OutboundEvent::Move { id, pose } => ClientMessage::Move(MoveDto {
                id: id.to_string(),
                position: pose.position,
                rotation: pose.orientation,
            }),
            OutboundEvent::Shoot(fire) => ClientMessage::Shoot(ShootDto::from(fire)),
        }
    }
}

impl From<&FireEvent> for ShootDto {
    fn from(fire: &FireEvent) -> Self {
        Self {
            id: fire.originator.to_string(),
            position: fire.origin,
            direction: fire.direction,
        }
    }
}

impl From<PoseDto> for Pose {
    fn from(pose: PoseDto) -> Self {
        Pose::new(pose.position, pose.rotation)
    }
}

pub fn encode_client_message(message: &ClientMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

/// Parses and validates one server frame.
///
/// A snapshot with any bad entry is rejected whole so the cache never holds a partial set.
pub fn decode_server_message(text: &str) -> Result<InboundEvent, ProtocolError> {
    let message = serde_json::from_str::<ServerMessage>(text).map_err(ProtocolError::Decode)?;

    match message {
        ServerMessage::Identity(identity) => Ok(InboundEvent::Identity(non_empty_id(identity.id)?)),
        ServerMessage::Move(entries) => {
            let mut snapshot = ParticipantSnapshot::with_capacity(entries.len());
            for (id, pose) in entries {
                check_finite(&id, "position", &pose.position)?;
                check_finite(&id, "rotation", &pose.rotation)?;
                snapshot.insert(non_empty_id(id)?, Pose::from(pose));
            }
            Ok(InboundEvent::Snapshot(snapshot))
        }
        ServerMessage::Shoot(shoot) => {
            check_finite(&shoot.id, "position", &shoot.position)?;
            check_finite(&shoot.id, "direction", &shoot.direction)?;
            Ok(InboundEvent::Fire(FireEvent {
                originator: non_empty_id(shoot.id)?,
                origin: shoot.position,
                direction: shoot.direction,
            }))
        }
    }
}

fn non_empty_id(id: String) -> Result<ParticipantId, ProtocolError> {
    if id.is_empty() {
        return Err(ProtocolError::EmptyId);
    }
    Ok(ParticipantId::from(id))
}

fn check_finite(id: &str, field: &'static str, vector: &[f32; 3]) -> Result<(), ProtocolError> {
    if vector.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(ProtocolError::NonFinite {
            id: id.to_string(),
            field,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn when_move_is_encoded_then_it_uses_the_tagged_wire_shape() {
        let event = OutboundEvent::Move {
            id: ParticipantId::from("abc"),
            pose: Pose::new([1.0, 2.0, 3.0], [0.0, 0.5, 0.0]),
        };

        let text = encode_client_message(&ClientMessage::from(&event)).expect("encode");
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");

        assert_eq!(
            value,
            json!({
                "type": "move",
                "data": { "id": "abc", "position": [1.0, 2.0, 3.0], "rotation": [0.0, 0.5, 0.0] }
            })
        );
    }

    #[test]
    fn when_shoot_is_encoded_then_direction_is_carried() {
        let event = OutboundEvent::Shoot(FireEvent {
            originator: ParticipantId::from("abc"),
            origin: [0.0, 1.0, -2.0],
            direction: [0.0, 0.0, -1.0],
        });

        let text = encode_client_message(&ClientMessage::from(&event)).expect("encode");
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");

        assert_eq!(
            value,
            json!({
                "type": "shoot",
                "data": { "id": "abc", "position": [0.0, 1.0, -2.0], "direction": [0.0, 0.0, -1.0] }
            })
        );
    }

    #[test]
    fn when_snapshot_is_well_formed_then_every_entry_is_decoded() {
        let text = json!({
            "type": "move",
            "data": {
                "A": { "position": [1.0, 0.0, 0.0], "rotation": [0.0, 0.0, 0.0] },
                "B": { "position": [0.0, 0.0, 1.0], "rotation": [0.0, 0.0, 0.0] }
            }
        })
        .to_string();

        let Ok(InboundEvent::Snapshot(snapshot)) = decode_server_message(&text) else {
            panic!("expected snapshot");
        };

        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.get(&ParticipantId::from("B")),
            Some(&Pose::new([0.0, 0.0, 1.0], [0.0; 3]))
        );
    }

    #[test]
    fn when_identity_arrives_then_it_is_decoded() {
        let text = json!({ "type": "identity", "data": { "id": "xyz" } }).to_string();

        let event = decode_server_message(&text).expect("decode");

        assert_eq!(event, InboundEvent::Identity(ParticipantId::from("xyz")));
    }

    #[test]
    fn when_vector_has_wrong_length_then_snapshot_is_rejected() {
        let text = json!({
            "type": "move",
            "data": { "A": { "position": [1.0, 0.0], "rotation": [0.0, 0.0, 0.0] } }
        })
        .to_string();

        assert!(matches!(
            decode_server_message(&text),
            Err(ProtocolError::Decode(_))
        ));
    }

    #[test]
    fn when_component_is_not_numeric_then_snapshot_is_rejected() {
        let text = r#"{"type":"move","data":{"A":{"position":["x",0,0],"rotation":[0,0,0]}}}"#;

        assert!(matches!(
            decode_server_message(text),
            Err(ProtocolError::Decode(_))
        ));
    }

    #[test]
    fn when_component_overflows_f32_then_snapshot_is_rejected_whole() {
        let text = r#"{"type":"move","data":{
            "A":{"position":[0,0,0],"rotation":[0,0,0]},
            "B":{"position":[1e39,0,0],"rotation":[0,0,0]}}}"#;

        assert!(matches!(
            decode_server_message(text),
            Err(ProtocolError::NonFinite { field: "position", .. })
        ));
    }

    #[test]
    fn when_type_is_unknown_then_decode_fails() {
        let text = json!({ "type": "chat", "data": "hi" }).to_string();

        assert!(decode_server_message(&text).is_err());
    }

    #[test]
    fn when_identity_is_empty_then_decode_fails() {
        let text = json!({ "type": "identity", "data": { "id": "" } }).to_string();

        assert!(matches!(
            decode_server_message(&text),
            Err(ProtocolError::EmptyId)
        ));
    }

    #[test]
    fn when_shoot_is_relayed_then_fire_event_keeps_originator() {
        let text = json!({
            "type": "shoot",
            "data": { "id": "B", "position": [0.0, 1.0, -2.0], "direction": [0.0, 0.0, -1.0] }
        })
        .to_string();

        let Ok(InboundEvent::Fire(event)) = decode_server_message(&text) else {
            panic!("expected fire");
        };

        assert!(event.is_authored_by(&ParticipantId::from("B")));
        assert_eq!(event.origin, [0.0, 1.0, -2.0]);
    }
}
