use serde_bytes::ByteBuf;
use serde_indexed::{DeserializeIndexed, SerializeIndexed};

use super::{PublicKeyCredentialDescriptor, PublicKeyCredentialUserEntity};

/// authenticatorGetAssertion request map (opcode 0x02).
#[derive(Debug, Clone, SerializeIndexed)]
#[serde_indexed(offset = 1)]
pub struct AgentGetAssertionRequest {
    /// rpId (0x01)
    pub relying_party_id: String,

    /// clientDataHash (0x02)
    pub client_data_hash: ByteBuf,

    /// allowList (0x03) — omitted from the map entirely when the caller
    /// supplied no credentials, never sent as an empty list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<PublicKeyCredentialDescriptor>>,
}

#[derive(Debug, Clone, DeserializeIndexed)]
#[serde_indexed(offset = 1)]
pub struct AgentGetAssertionResponse {
    /// credential (0x01)
    pub credential: PublicKeyCredentialDescriptor,

    /// authData (0x02)
    pub auth_data: ByteBuf,

    /// signature (0x03)
    pub signature: ByteBuf,

    /// user (0x04)
    pub user: PublicKeyCredentialUserEntity,
}
