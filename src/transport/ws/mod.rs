use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, instrument, trace, warn};
use url::Url;

use crate::proto::agent::cbor::{AgentRequest, AgentResponse};
use crate::transport::channel::Channel;
use crate::transport::error::{Error, ProtocolError, TransportError};

/// Well-known loop-back endpoint of the PasskeySync agent.
pub const AGENT_ENDPOINT: &str = "ws://127.0.0.1:11107/local";

/// WebSocket channel to the local agent.
///
/// One socket per exchange: `Idle → Connecting → AwaitingResponse →
/// {Completed, Failed}`. The socket is released on every exit path. No
/// local timeout is enforced; the agent runs its own interaction timer.
#[derive(Debug, Clone)]
pub struct WsChannel {
    endpoint: String,
}

impl WsChannel {
    pub fn new() -> Self {
        Self::with_endpoint(AGENT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
        }
    }
}

impl Default for WsChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for WsChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.endpoint)
    }
}

#[async_trait]
impl Channel for WsChannel {
    #[instrument(skip_all, fields(endpoint = %self.endpoint, command = ?request.command))]
    async fn exchange(&self, request: &AgentRequest) -> Result<AgentResponse, Error> {
        Url::parse(&self.endpoint).or(Err(Error::Transport(TransportError::InvalidEndpoint)))?;

        let mut ws_stream = match connect_async(self.endpoint.as_str()).await {
            Ok((ws_stream, _)) => ws_stream,
            Err(err) => {
                warn!(?err, "Failed to connect to agent");
                return Err(Error::Transport(TransportError::ConnectionFailed));
            }
        };
        debug!("Connected to agent");

        let result = Self::transact(&mut ws_stream, request).await;

        // Release the socket on every exit path. The agent drops its end
        // after replying, so a close failure here carries no signal.
        if let Err(err) = ws_stream.close(None).await {
            trace!(?err, "Error while closing agent connection");
        }
        result
    }
}

impl WsChannel {
    async fn transact(
        ws_stream: &mut WebSocketStream<MaybeTlsStream<TcpStream>>,
        request: &AgentRequest,
    ) -> Result<AgentResponse, Error> {
        let frame = request.frame();
        debug!(frame_len = frame.len(), "Sending request frame");
        trace!(?frame);
        if let Err(err) = ws_stream.send(Message::Binary(frame)).await {
            warn!(?err, "Failed to send request frame");
            return Err(Error::Transport(TransportError::ConnectionLost));
        }

        loop {
            match ws_stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    debug!(frame_len = data.len(), "Received response frame");
                    trace!(?data);
                    let response = AgentResponse::try_from(data.as_slice())?;
                    return Ok(response);
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(Message::Close(frame))) => {
                    warn!(?frame, "Agent closed the connection without replying");
                    return Err(Error::Transport(TransportError::ConnectionLost));
                }
                Some(Ok(message)) => {
                    warn!(?message, "Non-binary reply from agent");
                    return Err(Error::Protocol(ProtocolError::NonBinaryMessage));
                }
                Some(Err(err)) => {
                    warn!(?err, "Agent connection error");
                    return Err(Error::Transport(TransportError::ConnectionLost));
                }
                None => {
                    warn!("Agent connection ended without a reply");
                    return Err(Error::Transport(TransportError::ConnectionLost));
                }
            }
        }
    }
}
