use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// A business notification pushed by the server.
///
/// Only `id` and `message` are interpreted; every other field of the payload
/// is carried along untouched in `extra` so subscribers can read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Server-side identifier; numeric ids are kept as their decimal string
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display text
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NotificationEvent {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            extra: Map::new(),
        }
    }

    /// Attach an extra field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Decode an event payload received from the wire
    pub fn from_payload(payload: &Value) -> AppResult<Self> {
        Self::deserialize(payload).map_err(|e| {
            AppError::protocol(format!("Malformed notification payload: {}", e))
        })
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extra_fields_pass_through() {
        let payload = json!({
            "id": "n1",
            "message": "Ciclo encerrando",
            "cycleId": 42,
            "link": "/cycles/42"
        });

        let event = NotificationEvent::from_payload(&payload).unwrap();
        assert_eq!(event.id, "n1");
        assert_eq!(event.message, "Ciclo encerrando");
        assert_eq!(event.extra.get("cycleId"), Some(&json!(42)));
        assert_eq!(event.extra.get("link"), Some(&json!("/cycles/42")));

        // Re-serializing yields the original payload
        assert_eq!(serde_json::to_value(&event).unwrap(), payload);
    }

    #[test]
    fn test_numeric_id_is_accepted() {
        let event =
            NotificationEvent::from_payload(&json!({"id": 1234, "message": "Nova avaliação"}))
                .unwrap();
        assert_eq!(event.id, "1234");
        assert!(event.extra.is_empty());
    }

    #[test]
    fn test_missing_message_is_rejected() {
        let err = NotificationEvent::from_payload(&json!({"id": "n2"})).unwrap_err();
        assert!(matches!(err, AppError::Protocol { .. }));
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        assert!(NotificationEvent::from_payload(&json!("just text")).is_err());
        assert!(NotificationEvent::from_payload(&json!({"id": true, "message": "x"})).is_err());
    }

    #[test]
    fn test_builder_helpers() {
        let event = NotificationEvent::new("n3", "Meta atualizada").with_field("goalId", 7);
        assert_eq!(event.extra.get("goalId"), Some(&json!(7)));
    }
}
