use std::fmt::Display;

use async_trait::async_trait;

use crate::proto::agent::cbor::{AgentRequest, AgentResponse};
use crate::transport::error::Error;

/// A single request/response exchange with the agent.
///
/// Each ceremony performs exactly one `exchange`: implementations own their
/// connection for the duration of the call, send the framed request, await
/// the one correlated reply, and release the connection on every exit path.
/// There is no pooling, no retry, and no mid-flight cancellation; once the
/// frame is sent the call runs to completion or failure on the agent's own
/// timeline.
#[async_trait]
pub trait Channel: Send + Sync + Display {
    async fn exchange(&self, request: &AgentRequest) -> Result<AgentResponse, Error>;
}
