use std::fmt;

// Reasons an outbound publish was not handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    QueueFull,
    Closed,
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::QueueFull => write!(f, "outbound queue full"),
            PublishError::Closed => write!(f, "session closed"),
        }
    }
}

impl std::error::Error for PublishError {}
