//! # Health payload.
//!
//! The supervisor never reads the health channel; collaborators publish and
//! consume [`HealthMessage`] values through it. The serialized shape uses the
//! field names `host`, `port`, `status`, `message`.

use serde::{Deserialize, Serialize};

/// Health report relayed verbatim on the health channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthMessage {
    pub host: String,
    pub port: i32,
    pub status: i32,
    pub message: String,
}

impl HealthMessage {
    pub fn new(host: impl Into<String>, port: i32, status: i32, message: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_lowercase_field_names() {
        let msg = HealthMessage::new("db-1", 5432, 200, "ok");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"host": "db-1", "port": 5432, "status": 200, "message": "ok"})
        );

        let back: HealthMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }
}
