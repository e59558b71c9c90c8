pub use crate::proto::error::AgentStatusCode;

/// Option validation failures, surfaced before any network activity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingPublicKey,
    InvalidUserId,
}

impl std::error::Error for ValidationError {}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Call contexts in which the ceremony is refused outright.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NotAllowedError {
    /// Cross-origin iframe use is unsupported.
    CrossOrigin,
    /// The abort token was already signalled on entry ("AbortError").
    Aborted,
}

impl std::error::Error for NotAllowedError {}

impl std::fmt::Display for NotAllowedError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportError {
    ConnectionFailed,
    ConnectionLost,
    InvalidEndpoint,
}

impl std::error::Error for TransportError {}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Malformed replies: framing, reply type, or payload decoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    NonBinaryMessage,
    InvalidFraming,
    InvalidCbor,
    InvalidAuthenticatorData,
}

impl std::error::Error for ProtocolError {}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Terminal failure of a ceremony call. Every kind ends the call with no
/// partial result and no internal retry.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Error {
    Validation(ValidationError),
    NotAllowed(NotAllowedError),
    Transport(TransportError),
    Protocol(ProtocolError),
    /// Non-zero agent status; `Display` renders the mapped message.
    Agent(AgentStatusCode),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Agent(code) => write!(f, "{}", code),
            other => write!(f, "{:?}", other),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        Error::Validation(error)
    }
}

impl From<NotAllowedError> for Error {
    fn from(error: NotAllowedError) -> Self {
        Error::NotAllowed(error)
    }
}

impl From<TransportError> for Error {
    fn from(error: TransportError) -> Self {
        Error::Transport(error)
    }
}

impl From<ProtocolError> for Error {
    fn from(error: ProtocolError) -> Self {
        Error::Protocol(error)
    }
}

impl From<AgentStatusCode> for Error {
    fn from(code: AgentStatusCode) -> Self {
        Error::Agent(code)
    }
}
