extern crate serde_cbor;

use serde_cbor::ser::to_vec;

use crate::proto::agent::model::AgentCommandCode;
use crate::proto::agent::model::AgentGetAssertionRequest;
use crate::proto::agent::model::AgentMakeCredentialRequest;

/// A framed agent request: one opcode byte followed by a CBOR map.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub command: AgentCommandCode,
    pub encoded_data: Vec<u8>,
}

impl AgentRequest {
    pub fn new(command: AgentCommandCode) -> Self {
        Self {
            command,
            encoded_data: vec![],
        }
    }

    /// The full wire frame: `opcode || CBOR(map)`.
    pub fn frame(&self) -> Vec<u8> {
        let mut data = vec![self.command as u8];
        data.extend(&self.encoded_data);
        data
    }
}

impl From<&AgentMakeCredentialRequest> for AgentRequest {
    fn from(request: &AgentMakeCredentialRequest) -> AgentRequest {
        AgentRequest {
            command: AgentCommandCode::AuthenticatorMakeCredential,
            encoded_data: to_vec(request).unwrap(),
        }
    }
}

impl From<&AgentGetAssertionRequest> for AgentRequest {
    fn from(request: &AgentGetAssertionRequest) -> AgentRequest {
        AgentRequest {
            command: AgentCommandCode::AuthenticatorGetAssertion,
            encoded_data: to_vec(request).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_starts_with_opcode_byte() {
        let mut request = AgentRequest::new(AgentCommandCode::AuthenticatorGetAssertion);
        request.encoded_data = vec![0xA0];
        assert_eq!(request.frame(), vec![0x02, 0xA0]);
    }
}
