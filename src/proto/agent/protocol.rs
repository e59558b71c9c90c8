use async_trait::async_trait;
use serde_cbor::from_slice;
use tracing::{debug, instrument, trace, warn};

use crate::proto::agent::cbor::{AgentRequest, AgentResponse};
use crate::proto::agent::model::{
    AgentGetAssertionRequest, AgentGetAssertionResponse, AgentMakeCredentialRequest,
    AgentMakeCredentialResponse,
};
use crate::proto::error::AgentStatusCode;
use crate::transport::error::{Error, ProtocolError};
use crate::transport::Channel;

/// The agent command set, exposed on any [`Channel`].
#[async_trait]
pub trait AgentCtap {
    async fn agent_make_credential(
        &self,
        request: &AgentMakeCredentialRequest,
    ) -> Result<AgentMakeCredentialResponse, Error>;

    async fn agent_get_assertion(
        &self,
        request: &AgentGetAssertionRequest,
    ) -> Result<AgentGetAssertionResponse, Error>;
}

#[async_trait]
impl<C> AgentCtap for C
where
    C: Channel,
{
    #[instrument(skip_all, fields(channel = %self))]
    async fn agent_make_credential(
        &self,
        request: &AgentMakeCredentialRequest,
    ) -> Result<AgentMakeCredentialResponse, Error> {
        trace!(?request);
        let agent_request: AgentRequest = request.into();
        let agent_response = self.exchange(&agent_request).await?;
        let payload = success_payload(agent_response)?;
        let response: AgentMakeCredentialResponse =
            from_slice(&payload).or(Err(Error::Protocol(ProtocolError::InvalidCbor)))?;
        debug!(format = %response.format, "MakeCredential response decoded");
        Ok(response)
    }

    #[instrument(skip_all, fields(channel = %self))]
    async fn agent_get_assertion(
        &self,
        request: &AgentGetAssertionRequest,
    ) -> Result<AgentGetAssertionResponse, Error> {
        trace!(?request);
        let agent_request: AgentRequest = request.into();
        let agent_response = self.exchange(&agent_request).await?;
        let payload = success_payload(agent_response)?;
        let response: AgentGetAssertionResponse =
            from_slice(&payload).or(Err(Error::Protocol(ProtocolError::InvalidCbor)))?;
        debug!("GetAssertion response decoded");
        Ok(response)
    }
}

fn success_payload(response: AgentResponse) -> Result<Vec<u8>, Error> {
    match response.status {
        AgentStatusCode::Ok => response
            .data
            .ok_or(Error::Protocol(ProtocolError::InvalidFraming)),
        code => {
            warn!(%code, "Agent returned an error status");
            Err(Error::Agent(code))
        }
    }
}
