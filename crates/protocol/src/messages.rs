use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message_types::MessageType;

/// The `{type, payload}` wrapper carried by every text frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub name: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// `container_info` payload. Only `name` is interpreted; the rest is kept as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDetail {
    pub name: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: i64,
    pub message: String,
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyPayload {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRef {
    pub container_name: String,
}

// Requests the driver sends. Adjacently tagged so each one encodes as an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Request {
    ContainerList(EmptyPayload),
    ContainerInfo(ContainerRef),
    ContainerSelect(ContainerRef),
}

impl Request {
    pub fn container_list() -> Self {
        Request::ContainerList(EmptyPayload::default())
    }

    pub fn container_info(name: impl Into<String>) -> Self {
        Request::ContainerInfo(ContainerRef { container_name: name.into() })
    }

    pub fn container_select(name: impl Into<String>) -> Self {
        Request::ContainerSelect(ContainerRef { container_name: name.into() })
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Request::ContainerList(_) => MessageType::ContainerList,
            Request::ContainerInfo(_) => MessageType::ContainerInfo,
            Request::ContainerSelect(_) => MessageType::ContainerSelect,
        }
    }

    pub fn container_name(&self) -> Option<&str> {
        match self {
            Request::ContainerList(_) => None,
            Request::ContainerInfo(r) | Request::ContainerSelect(r) => Some(&r.container_name),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A decoded inbound envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Status(StatusPayload),
    ContainerList(Vec<ContainerSummary>),
    ContainerInfo(ContainerDetail),
    Error(ErrorDetail),
    /// Any type the driver does not react to, including `container_select`.
    Unhandled(String),
}

impl Inbound {
    /// Fails only when a recognised type carries a payload of the wrong shape.
    pub fn decode(envelope: &Envelope) -> Result<Self, serde_json::Error> {
        let inbound = match MessageType::from_wire(&envelope.kind) {
            Some(MessageType::Status) => Inbound::Status(envelope.payload_as()?),
            // A server with no containers may encode the list as null
            Some(MessageType::ContainerList) => {
                let list: Option<Vec<ContainerSummary>> = envelope.payload_as()?;
                Inbound::ContainerList(list.unwrap_or_default())
            }
            Some(MessageType::ContainerInfo) => Inbound::ContainerInfo(envelope.payload_as()?),
            Some(MessageType::Error) => Inbound::Error(envelope.payload_as()?),
            Some(MessageType::ContainerSelect) | None => Inbound::Unhandled(envelope.kind.clone()),
        };
        Ok(inbound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn container_list_request_has_empty_object_payload() {
        let encoded: Value = serde_json::from_str(&Request::container_list().to_json().unwrap()).unwrap();
        assert_eq!(encoded, json!({"type": "container_list", "payload": {}}));
    }

    #[test]
    fn named_requests_carry_container_name() {
        let info: Value = serde_json::from_str(&Request::container_info("web").to_json().unwrap()).unwrap();
        assert_eq!(info, json!({"type": "container_info", "payload": {"container_name": "web"}}));

        let select: Value = serde_json::from_str(&Request::container_select("db").to_json().unwrap()).unwrap();
        assert_eq!(select, json!({"type": "container_select", "payload": {"container_name": "db"}}));
        assert_eq!(Request::container_select("db").container_name(), Some("db"));
        assert_eq!(Request::container_list().container_name(), None);
    }

    #[test]
    fn envelope_without_payload_decodes_as_null() {
        let env = Envelope::parse(r#"{"type":"container_select"}"#).unwrap();
        assert_eq!(env.kind, "container_select");
        assert!(env.payload.is_null());
    }

    #[test]
    fn envelope_requires_type() {
        assert!(Envelope::parse(r#"{"payload":{}}"#).is_err());
        assert!(Envelope::parse("not json").is_err());
        assert!(Envelope::parse("[1,2,3]").is_err());
    }

    #[test]
    fn status_message_text_is_optional() {
        let env = Envelope::parse(
            r#"{"type":"status","payload":{"connected":true,"message":"Connected to Dash Terminal"}}"#,
        )
        .unwrap();
        match Inbound::decode(&env).unwrap() {
            Inbound::Status(s) => {
                assert!(s.connected);
                assert_eq!(s.message.as_deref(), Some("Connected to Dash Terminal"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let env = Envelope::parse(r#"{"type":"status","payload":{"connected":false}}"#).unwrap();
        assert_eq!(
            Inbound::decode(&env).unwrap(),
            Inbound::Status(StatusPayload { connected: false, message: None })
        );
    }

    #[test]
    fn container_list_keeps_order() {
        let env = Envelope::parse(
            r#"{"type":"container_list","payload":[
                {"name":"web","status":"running","type":"docker"},
                {"name":"db","status":"stopped","type":"lxc"}
            ]}"#,
        )
        .unwrap();
        match Inbound::decode(&env).unwrap() {
            Inbound::ContainerList(list) => {
                let names: Vec<_> = list.iter().map(|c| c.name.as_str()).collect();
                assert_eq!(names, ["web", "db"]);
                assert_eq!(list[1].kind, "lxc");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn null_container_list_is_empty() {
        let env = Envelope::parse(r#"{"type":"container_list","payload":null}"#).unwrap();
        assert_eq!(Inbound::decode(&env).unwrap(), Inbound::ContainerList(Vec::new()));

        let env = Envelope::parse(r#"{"type":"container_list"}"#).unwrap();
        assert_eq!(Inbound::decode(&env).unwrap(), Inbound::ContainerList(Vec::new()));
    }

    #[test]
    fn container_detail_keeps_extra_fields() {
        let env = Envelope::parse(
            r#"{"type":"container_info","payload":{"name":"web","ipv4":"10.0.3.5","pid":42}}"#,
        )
        .unwrap();
        let Inbound::ContainerInfo(detail) = Inbound::decode(&env).unwrap() else {
            panic!("expected container_info");
        };
        assert_eq!(detail.name, "web");
        assert_eq!(detail.fields.get("ipv4"), Some(&json!("10.0.3.5")));
        assert_eq!(serde_json::to_value(&detail).unwrap(), env.payload);
    }

    #[test]
    fn wrong_payload_shape_is_an_error() {
        let env = Envelope::parse(r#"{"type":"container_list","payload":{"name":"web"}}"#).unwrap();
        assert!(Inbound::decode(&env).is_err());

        let env = Envelope::parse(r#"{"type":"container_info","payload":{}}"#).unwrap();
        assert!(Inbound::decode(&env).is_err());
    }

    #[test]
    fn unknown_types_are_unhandled_regardless_of_payload() {
        let env = Envelope::parse(r#"{"type":"terminal_output","payload":"$ "}"#).unwrap();
        assert_eq!(Inbound::decode(&env).unwrap(), Inbound::Unhandled("terminal_output".into()));
    }

    #[test]
    fn error_detail_decodes() {
        let env = Envelope::parse(
            r#"{"type":"error","payload":{"code":404,"message":"Container not found: web"}}"#,
        )
        .unwrap();
        assert_eq!(
            Inbound::decode(&env).unwrap(),
            Inbound::Error(ErrorDetail { code: 404, message: "Container not found: web".into() })
        );
    }
}
