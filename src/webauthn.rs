use serde_bytes::ByteBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use crate::client_data::{ClientDataType, CollectedClientData};
use crate::fido::AuthenticatorData;
use crate::ops::webauthn::{
    AuthenticatorAssertionResponse, AuthenticatorAttestationResponse, AuthenticatorResponse,
    ClientExtensionResults, CredentialCreationOptions, CredentialPropertiesOutput,
    CredentialRequestOptions, PublicKeyCredential,
};
use crate::proto::agent::{
    AgentCtap, AgentGetAssertionRequest, AgentMakeCredentialRequest, PublicKeyCredentialType,
};
use crate::transport::ws::WsChannel;
use crate::transport::Channel;

pub use crate::transport::error::{
    Error, NotAllowedError, ProtocolError, TransportError, ValidationError,
};

/// Client half of the two WebAuthn ceremonies, delegating the
/// authenticator role to the PasskeySync agent.
///
/// One value serves any number of ceremonies; each call runs over its own
/// connection and shares no state with concurrent calls.
#[derive(Debug)]
pub struct PasskeySyncClient<C: Channel = WsChannel> {
    origin: String,
    same_origin_with_ancestors: bool,
    channel: C,
}

impl PasskeySyncClient<WsChannel> {
    /// Client for the well-known loop-back agent endpoint.
    pub fn new(origin: &str) -> Self {
        Self::with_channel(origin, WsChannel::new())
    }

    pub fn with_endpoint(origin: &str, endpoint: &str) -> Self {
        Self::with_channel(origin, WsChannel::with_endpoint(endpoint))
    }
}

impl<C: Channel> PasskeySyncClient<C> {
    pub fn with_channel(origin: &str, channel: C) -> Self {
        Self {
            origin: origin.to_owned(),
            same_origin_with_ancestors: true,
            channel,
        }
    }

    /// Mark the calling context as embedded in a cross-origin ancestor
    /// chain. Ceremonies in such a context are refused.
    pub fn same_origin_with_ancestors(mut self, same_origin: bool) -> Self {
        self.same_origin_with_ancestors = same_origin;
        self
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// The credential-creation (registration) ceremony.
    #[instrument(skip_all, fields(origin = %self.origin))]
    pub async fn create(
        &self,
        options: CredentialCreationOptions,
    ) -> Result<PublicKeyCredential, Error> {
        let CredentialCreationOptions { public_key, signal } = options;
        let public_key = public_key.ok_or(Error::Validation(ValidationError::MissingPublicKey))?;
        if !self.same_origin_with_ancestors {
            return Err(Error::NotAllowed(NotAllowedError::CrossOrigin));
        }

        let normalized = public_key.normalize(&self.origin)?;
        trace!(?normalized);

        let client_data = CollectedClientData::new(
            ClientDataType::Create,
            &normalized.challenge,
            &self.origin,
        );
        let client_data_json = client_data.to_json();
        let client_data_hash = client_data.hash();

        check_abort(&signal)?;

        let request = AgentMakeCredentialRequest {
            client_data_hash: ByteBuf::from(client_data_hash.to_vec()),
            relying_party: normalized.relying_party,
            user: normalized.user,
            algorithms: normalized.algorithms,
            exclude: normalized.exclude,
        };
        let response = self.channel.agent_make_credential(&request).await?;

        let authenticator_data = AuthenticatorData::parse(&response.auth_data)?;
        let attested = authenticator_data
            .attested_credential
            .as_ref()
            .ok_or(Error::Protocol(ProtocolError::InvalidAuthenticatorData))?;
        let credential_id = attested.credential_id.clone();
        debug!(credential_id_len = credential_id.len(), "New credential created");

        let attestation_object = response
            .to_webauthn_bytes()
            .or(Err(Error::Protocol(ProtocolError::InvalidCbor)))?;

        Ok(PublicKeyCredential {
            id: base64_url::encode(&credential_id),
            raw_id: credential_id,
            credential_type: PublicKeyCredentialType::PublicKey,
            response: AuthenticatorResponse::Attestation(AuthenticatorAttestationResponse {
                client_data_json,
                attestation_object,
                authenticator_data: response.auth_data.to_vec(),
                public_key: attested.credential_public_key.clone(),
                public_key_algorithm: response.att_stmt.algorithm,
                transports: vec![],
            }),
            authenticator_attachment: None,
            client_extension_results: ClientExtensionResults {
                // The agent always produces discoverable credentials.
                cred_props: normalized
                    .cred_props_requested
                    .then_some(CredentialPropertiesOutput { rk: true }),
            },
        })
    }

    /// The credential-assertion (authentication) ceremony.
    #[instrument(skip_all, fields(origin = %self.origin))]
    pub async fn get(
        &self,
        options: CredentialRequestOptions,
    ) -> Result<PublicKeyCredential, Error> {
        let CredentialRequestOptions { public_key, signal } = options;
        let public_key = public_key.ok_or(Error::Validation(ValidationError::MissingPublicKey))?;
        if !self.same_origin_with_ancestors {
            return Err(Error::NotAllowed(NotAllowedError::CrossOrigin));
        }

        let normalized = public_key.normalize(&self.origin);
        trace!(?normalized);

        let client_data =
            CollectedClientData::new(ClientDataType::Get, &normalized.challenge, &self.origin);
        let client_data_json = client_data.to_json();
        let client_data_hash = client_data.hash();

        check_abort(&signal)?;

        let request = AgentGetAssertionRequest {
            relying_party_id: normalized.relying_party_id,
            client_data_hash: ByteBuf::from(client_data_hash.to_vec()),
            allow: normalized.allow,
        };
        let response = self.channel.agent_get_assertion(&request).await?;

        let credential_id = response.credential.id.to_vec();
        debug!(credential_id_len = credential_id.len(), "Assertion obtained");

        Ok(PublicKeyCredential {
            id: base64_url::encode(&credential_id),
            raw_id: credential_id,
            credential_type: PublicKeyCredentialType::PublicKey,
            response: AuthenticatorResponse::Assertion(AuthenticatorAssertionResponse {
                client_data_json,
                authenticator_data: response.auth_data.to_vec(),
                signature: response.signature.to_vec(),
                user_handle: response.user.id.to_vec(),
            }),
            authenticator_attachment: None,
            client_extension_results: ClientExtensionResults::default(),
        })
    }
}

fn check_abort(signal: &Option<CancellationToken>) -> Result<(), Error> {
    if signal
        .as_ref()
        .map_or(false, |signal| signal.is_cancelled())
    {
        debug!("Ceremony aborted before contacting the agent");
        return Err(Error::NotAllowed(NotAllowedError::Aborted));
    }
    Ok(())
}
