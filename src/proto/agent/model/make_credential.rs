use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use serde_indexed::{DeserializeIndexed, SerializeIndexed};

use super::{
    PublicKeyCredentialDescriptor, PublicKeyCredentialParameters, PublicKeyCredentialRpEntity,
    PublicKeyCredentialUserEntity,
};

/// authenticatorMakeCredential request map (opcode 0x01).
#[derive(Debug, Clone, SerializeIndexed)]
#[serde_indexed(offset = 1)]
pub struct AgentMakeCredentialRequest {
    /// clientDataHash (0x01)
    pub client_data_hash: ByteBuf,

    /// rp (0x02)
    pub relying_party: PublicKeyCredentialRpEntity,

    /// user (0x03)
    pub user: PublicKeyCredentialUserEntity,

    /// pubKeyCredParams (0x04)
    pub algorithms: Vec<PublicKeyCredentialParameters>,

    /// excludeList (0x05)
    pub exclude: Vec<PublicKeyCredentialDescriptor>,
}

/// Attestation statement produced by the agent: algorithm and signature
/// only, no certificate chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestationStatement {
    #[serde(rename = "alg")]
    pub algorithm: i64,

    #[serde(rename = "sig")]
    pub signature: ByteBuf,
}

/// Attestation object, integer-keyed as the agent returns it.
#[derive(Debug, Clone, SerializeIndexed, DeserializeIndexed)]
#[serde_indexed(offset = 1)]
pub struct AgentMakeCredentialResponse {
    /// fmt (0x01) — carried through without validation.
    pub format: String,

    /// authData (0x02)
    pub auth_data: ByteBuf,

    /// attStmt (0x03)
    pub att_stmt: AttestationStatement,
}

// The standard attestation-object shape, text-keyed in CTAP2 canonical
// order. Backend finish endpoints expect this form, not the agent's
// integer-keyed map.
#[derive(Serialize)]
struct WebAuthnAttestationObject<'a> {
    fmt: &'a str,

    #[serde(rename = "attStmt")]
    att_stmt: &'a AttestationStatement,

    #[serde(rename = "authData")]
    auth_data: &'a ByteBuf,
}

impl AgentMakeCredentialResponse {
    /// Re-encode as the standard text-keyed attestation object.
    pub fn to_webauthn_bytes(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(&WebAuthnAttestationObject {
            fmt: &self.format,
            att_stmt: &self.att_stmt,
            auth_data: &self.auth_data,
        })
    }
}
