pub mod message_types;
pub mod messages;

pub use message_types::MessageType;
pub use messages::{
    ContainerDetail, ContainerRef, ContainerSummary, EmptyPayload, Envelope, ErrorDetail, Inbound,
    Request, StatusPayload,
};
