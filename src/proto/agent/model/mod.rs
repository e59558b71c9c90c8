use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use serde_repr::Serialize_repr;

mod get_assertion;
mod make_credential;

pub use get_assertion::{AgentGetAssertionRequest, AgentGetAssertionResponse};
pub use make_credential::{
    AgentMakeCredentialRequest, AgentMakeCredentialResponse, AttestationStatement,
};

/// ES256 (ECDSA w/ SHA-256).
pub const COSE_ALGORITHM_ES256: i64 = -7;
/// RS256 (RSASSA-PKCS1-v1_5 w/ SHA-256).
pub const COSE_ALGORITHM_RS256: i64 = -257;

/// Opcodes understood by the agent; one leading byte per request frame.
#[derive(Debug, IntoPrimitive, TryFromPrimitive, Copy, Clone, PartialEq, Eq, Serialize_repr)]
#[repr(u8)]
pub enum AgentCommandCode {
    AuthenticatorMakeCredential = 0x01,
    AuthenticatorGetAssertion = 0x02,
    AuthenticatorGetInfo = 0x04,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicKeyCredentialRpEntity {
    pub id: String,
    pub name: String,
}

impl PublicKeyCredentialRpEntity {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: String::from(id),
            name: String::from(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicKeyCredentialUserEntity {
    pub id: ByteBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "displayName")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl PublicKeyCredentialUserEntity {
    pub fn new(id: &[u8], name: &str, display_name: &str) -> Self {
        Self {
            id: ByteBuf::from(id),
            name: Some(String::from(name)),
            display_name: Some(String::from(display_name)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PublicKeyCredentialType {
    #[serde(rename = "public-key")]
    PublicKey,
}

/// An entry of `pubKeyCredParams`. The algorithm is carried as a raw COSE
/// identifier; requested algorithms are passed through unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PublicKeyCredentialParameters {
    #[serde(rename = "type")]
    pub public_key_type: PublicKeyCredentialType,

    #[serde(rename = "alg")]
    pub algorithm: i64,
}

impl PublicKeyCredentialParameters {
    pub fn new(algorithm: i64) -> Self {
        Self {
            public_key_type: PublicKeyCredentialType::PublicKey,
            algorithm,
        }
    }
}

impl Default for PublicKeyCredentialParameters {
    fn default() -> Self {
        Self::new(COSE_ALGORITHM_ES256)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicKeyCredentialDescriptor {
    pub r#type: PublicKeyCredentialType,
    pub id: ByteBuf,
}

impl PublicKeyCredentialDescriptor {
    pub fn new(id: &[u8]) -> Self {
        Self {
            r#type: PublicKeyCredentialType::PublicKey,
            id: ByteBuf::from(id),
        }
    }
}
