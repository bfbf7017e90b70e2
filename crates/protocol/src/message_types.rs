// Message type names used on the Dash Terminal WebSocket endpoint

pub const STATUS: &str = "status";
pub const CONTAINER_LIST: &str = "container_list";
pub const CONTAINER_INFO: &str = "container_info";
pub const CONTAINER_SELECT: &str = "container_select";
pub const ERROR: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Status,
    ContainerList,
    ContainerInfo,
    ContainerSelect,
    Error,
}

impl MessageType {
    pub fn from_wire(kind: &str) -> Option<Self> {
        match kind {
            STATUS => Some(Self::Status),
            CONTAINER_LIST => Some(Self::ContainerList),
            CONTAINER_INFO => Some(Self::ContainerInfo),
            CONTAINER_SELECT => Some(Self::ContainerSelect),
            ERROR => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status => STATUS,
            Self::ContainerList => CONTAINER_LIST,
            Self::ContainerInfo => CONTAINER_INFO,
            Self::ContainerSelect => CONTAINER_SELECT,
            Self::Error => ERROR,
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
