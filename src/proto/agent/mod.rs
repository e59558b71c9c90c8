pub mod cbor;

mod model;
mod protocol;

pub use model::{
    AgentCommandCode, PublicKeyCredentialDescriptor, PublicKeyCredentialParameters,
    PublicKeyCredentialRpEntity, PublicKeyCredentialType, PublicKeyCredentialUserEntity,
    COSE_ALGORITHM_ES256, COSE_ALGORITHM_RS256,
};
pub use model::{AgentGetAssertionRequest, AgentGetAssertionResponse};
pub use model::{AgentMakeCredentialRequest, AgentMakeCredentialResponse, AttestationStatement};

pub use protocol::AgentCtap;
