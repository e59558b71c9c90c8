use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::proto::agent::{
    PublicKeyCredentialDescriptor, PublicKeyCredentialParameters, PublicKeyCredentialRpEntity,
    PublicKeyCredentialType, PublicKeyCredentialUserEntity, COSE_ALGORITHM_ES256,
    COSE_ALGORITHM_RS256,
};
use crate::transport::error::{Error, ValidationError};

// Timeout policy, in milliseconds.
const TIMEOUT_DISCOURAGED_MIN: u32 = 30_000;
const TIMEOUT_DISCOURAGED_MAX: u32 = 180_000;
const TIMEOUT_DISCOURAGED_RECOMMENDED: u32 = 120_000;
const TIMEOUT_REQUIRED_MIN: u32 = 30_000;
const TIMEOUT_REQUIRED_MAX: u32 = 600_000;
const TIMEOUT_REQUIRED_RECOMMENDED: u32 = 300_000;

const USER_ID_MIN_LEN: usize = 1;
const USER_ID_MAX_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserVerificationRequirement {
    Discouraged,
    Preferred,
    Required,
}

/// Relying party as supplied by the caller; `id` defaults to the origin's
/// host during normalization.
#[derive(Debug, Clone)]
pub struct RelyingParty {
    pub id: Option<String>,
    pub name: String,
}

/// User account entity. The id must be 1..=64 bytes.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatorSelection {
    pub user_verification: Option<UserVerificationRequirement>,
}

#[derive(Debug, Clone)]
pub struct PublicKeyCredentialCreationOptions {
    pub rp: RelyingParty,
    pub user: User,
    pub challenge: Vec<u8>,
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,
    pub timeout: Option<u32>,
    pub authenticator_selection: Option<AuthenticatorSelection>,
    pub exclude_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,
    pub extensions: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Default)]
pub struct CredentialCreationOptions {
    pub public_key: Option<PublicKeyCredentialCreationOptions>,
    /// Checked once, on entry; an abort signalled after the request frame
    /// is sent has no effect.
    pub signal: Option<CancellationToken>,
}

#[derive(Debug, Clone)]
pub struct PublicKeyCredentialRequestOptions {
    pub rp_id: Option<String>,
    pub challenge: Vec<u8>,
    pub allow_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,
    pub user_verification: Option<UserVerificationRequirement>,
}

#[derive(Debug, Clone, Default)]
pub struct CredentialRequestOptions {
    pub public_key: Option<PublicKeyCredentialRequestOptions>,
    pub signal: Option<CancellationToken>,
}

/// Creation options after validation and defaulting, ready to frame.
#[derive(Debug, Clone)]
pub(crate) struct NormalizedCreationOptions {
    pub relying_party: PublicKeyCredentialRpEntity,
    pub user: PublicKeyCredentialUserEntity,
    pub challenge: Vec<u8>,
    pub algorithms: Vec<PublicKeyCredentialParameters>,
    /// Advisory only; the agent runs its own interaction timer.
    pub timeout: Option<u32>,
    pub exclude: Vec<PublicKeyCredentialDescriptor>,
    pub cred_props_requested: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct NormalizedRequestOptions {
    pub relying_party_id: String,
    pub challenge: Vec<u8>,
    pub allow: Option<Vec<PublicKeyCredentialDescriptor>>,
}

impl PublicKeyCredentialCreationOptions {
    /// Validate and fill defaults per the WebAuthn create algorithm.
    pub(crate) fn normalize(self, origin: &str) -> Result<NormalizedCreationOptions, Error> {
        let user_verification = self
            .authenticator_selection
            .as_ref()
            .and_then(|selection| selection.user_verification);
        let timeout = normalize_timeout(user_verification, self.timeout);

        if self.user.id.len() < USER_ID_MIN_LEN || self.user.id.len() > USER_ID_MAX_LEN {
            warn!(len = self.user.id.len(), "user.id must be between 1 and 64 bytes");
            return Err(Error::Validation(ValidationError::InvalidUserId));
        }

        let rp_id = match self.rp.id {
            Some(id) => id,
            None => origin_host(origin),
        };

        // All requested algorithms are assumed supported; only an empty
        // list gets the default pair.
        let algorithms = if self.pub_key_cred_params.is_empty() {
            vec![
                PublicKeyCredentialParameters::new(COSE_ALGORITHM_ES256),
                PublicKeyCredentialParameters::new(COSE_ALGORITHM_RS256),
            ]
        } else {
            self.pub_key_cred_params
        };

        let cred_props_requested = match &self.extensions {
            Some(extensions) => {
                for name in extensions.keys().filter(|name| *name != "credProps") {
                    debug!(%name, "Dropping unsupported extension");
                }
                matches!(extensions.get("credProps"), Some(Value::Bool(true)))
            }
            None => false,
        };

        Ok(NormalizedCreationOptions {
            relying_party: PublicKeyCredentialRpEntity::new(&rp_id, &self.rp.name),
            user: PublicKeyCredentialUserEntity::new(
                &self.user.id,
                &self.user.name,
                &self.user.display_name,
            ),
            challenge: self.challenge,
            algorithms,
            timeout,
            exclude: self.exclude_credentials.unwrap_or_default(),
            cred_props_requested,
        })
    }
}

impl PublicKeyCredentialRequestOptions {
    /// No timeout clamping is defined for the assertion ceremony.
    pub(crate) fn normalize(self, origin: &str) -> NormalizedRequestOptions {
        let relying_party_id = match self.rp_id {
            Some(id) => id,
            None => origin_host(origin),
        };
        NormalizedRequestOptions {
            relying_party_id,
            challenge: self.challenge,
            allow: self.allow_credentials,
        }
    }
}

fn normalize_timeout(
    user_verification: Option<UserVerificationRequirement>,
    timeout: Option<u32>,
) -> Option<u32> {
    match user_verification {
        Some(UserVerificationRequirement::Discouraged) => Some(
            timeout
                .unwrap_or(TIMEOUT_DISCOURAGED_RECOMMENDED)
                .clamp(TIMEOUT_DISCOURAGED_MIN, TIMEOUT_DISCOURAGED_MAX),
        ),
        Some(UserVerificationRequirement::Required | UserVerificationRequirement::Preferred) => {
            Some(
                timeout
                    .unwrap_or(TIMEOUT_REQUIRED_RECOMMENDED)
                    .clamp(TIMEOUT_REQUIRED_MIN, TIMEOUT_REQUIRED_MAX),
            )
        }
        None => timeout,
    }
}

fn origin_host(origin: &str) -> String {
    Url::parse(origin)
        .ok()
        .and_then(|url| url.host_str().map(str::to_owned))
        .unwrap_or_else(|| origin.to_owned())
}

/// Serializable ceremony result, shaped for direct POSTing by a UI layer.
/// Binary fields render as unpadded base64url text.
#[derive(Debug, Clone, Serialize)]
pub struct PublicKeyCredential {
    pub id: String,

    #[serde(rename = "rawId", serialize_with = "serialize_base64url")]
    pub raw_id: Vec<u8>,

    #[serde(rename = "type")]
    pub credential_type: PublicKeyCredentialType,

    pub response: AuthenticatorResponse,

    /// Always `None`: the agent is remote to the platform, not attached.
    #[serde(rename = "authenticatorAttachment")]
    pub authenticator_attachment: Option<String>,

    #[serde(rename = "clientExtensionResults")]
    pub client_extension_results: ClientExtensionResults,
}

impl PublicKeyCredential {
    pub fn client_extension_results(&self) -> &ClientExtensionResults {
        &self.client_extension_results
    }

    pub fn transports(&self) -> &[String] {
        match &self.response {
            AuthenticatorResponse::Attestation(response) => &response.transports,
            AuthenticatorResponse::Assertion(_) => &[],
        }
    }
}

/// Ceremony-specific response payload.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AuthenticatorResponse {
    Attestation(AuthenticatorAttestationResponse),
    Assertion(AuthenticatorAssertionResponse),
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatorAttestationResponse {
    /// The collected-client-data JSON text; serializes as base64url of its
    /// UTF-8 bytes.
    #[serde(rename = "clientDataJSON", serialize_with = "serialize_base64url_text")]
    pub client_data_json: String,

    /// Re-encoded, text-keyed attestation object.
    #[serde(rename = "attestationObject", serialize_with = "serialize_base64url")]
    pub attestation_object: Vec<u8>,

    #[serde(rename = "authenticatorData", serialize_with = "serialize_base64url")]
    pub authenticator_data: Vec<u8>,

    /// Opaque COSE public key of the new credential.
    #[serde(rename = "publicKey", serialize_with = "serialize_base64url")]
    pub public_key: Vec<u8>,

    #[serde(rename = "publicKeyAlgorithm")]
    pub public_key_algorithm: i64,

    pub transports: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatorAssertionResponse {
    #[serde(rename = "clientDataJSON", serialize_with = "serialize_base64url_text")]
    pub client_data_json: String,

    #[serde(rename = "authenticatorData", serialize_with = "serialize_base64url")]
    pub authenticator_data: Vec<u8>,

    #[serde(serialize_with = "serialize_base64url")]
    pub signature: Vec<u8>,

    #[serde(rename = "userHandle", serialize_with = "serialize_base64url")]
    pub user_handle: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientExtensionResults {
    #[serde(rename = "credProps", skip_serializing_if = "Option::is_none")]
    pub cred_props: Option<CredentialPropertiesOutput>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CredentialPropertiesOutput {
    pub rk: bool,
}

fn serialize_base64url<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&base64_url::encode(bytes))
}

fn serialize_base64url_text<S>(text: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&base64_url::encode(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creation_options() -> PublicKeyCredentialCreationOptions {
        PublicKeyCredentialCreationOptions {
            rp: RelyingParty {
                id: None,
                name: "Example".to_owned(),
            },
            user: User {
                id: vec![7u8; 32],
                name: "mario.rossi".to_owned(),
                display_name: "Mario Rossi".to_owned(),
            },
            challenge: vec![0xAB; 16],
            pub_key_cred_params: vec![],
            timeout: None,
            authenticator_selection: None,
            exclude_credentials: None,
            extensions: None,
        }
    }

    fn with_user_verification(
        user_verification: UserVerificationRequirement,
        timeout: Option<u32>,
    ) -> PublicKeyCredentialCreationOptions {
        let mut options = creation_options();
        options.authenticator_selection = Some(AuthenticatorSelection {
            user_verification: Some(user_verification),
        });
        options.timeout = timeout;
        options
    }

    const ORIGIN: &str = "https://example.org";

    #[test]
    fn timeout_untouched_without_user_verification() {
        let mut options = creation_options();
        options.timeout = Some(10);
        let normalized = options.normalize(ORIGIN).unwrap();
        assert_eq!(normalized.timeout, Some(10));

        let normalized = creation_options().normalize(ORIGIN).unwrap();
        assert_eq!(normalized.timeout, None);
    }

    #[test]
    fn timeout_defaults_and_clamps_for_discouraged() {
        let cases = [
            (None, 120_000),
            (Some(10), 30_000),
            (Some(999_999), 180_000),
            (Some(60_000), 60_000),
        ];
        for (timeout, expected) in cases {
            let options =
                with_user_verification(UserVerificationRequirement::Discouraged, timeout);
            let normalized = options.normalize(ORIGIN).unwrap();
            assert_eq!(normalized.timeout, Some(expected));
        }
    }

    #[test]
    fn timeout_defaults_and_clamps_for_required_and_preferred() {
        for user_verification in [
            UserVerificationRequirement::Required,
            UserVerificationRequirement::Preferred,
        ] {
            let normalized = with_user_verification(user_verification, None)
                .normalize(ORIGIN)
                .unwrap();
            assert_eq!(normalized.timeout, Some(300_000));

            let normalized = with_user_verification(user_verification, Some(1_000_000))
                .normalize(ORIGIN)
                .unwrap();
            assert_eq!(normalized.timeout, Some(600_000));

            let normalized = with_user_verification(user_verification, Some(5))
                .normalize(ORIGIN)
                .unwrap();
            assert_eq!(normalized.timeout, Some(30_000));
        }
    }

    #[test]
    fn user_id_length_is_bounded() {
        for len in [0usize, 65] {
            let mut options = creation_options();
            options.user.id = vec![1u8; len];
            assert_eq!(
                options.normalize(ORIGIN).unwrap_err(),
                Error::Validation(ValidationError::InvalidUserId)
            );
        }
        for len in [1usize, 64] {
            let mut options = creation_options();
            options.user.id = vec![1u8; len];
            assert!(options.normalize(ORIGIN).is_ok());
        }
    }

    #[test]
    fn empty_algorithm_list_gets_the_default_pair() {
        let normalized = creation_options().normalize(ORIGIN).unwrap();
        assert_eq!(
            normalized.algorithms,
            vec![
                PublicKeyCredentialParameters::new(-7),
                PublicKeyCredentialParameters::new(-257),
            ]
        );
    }

    #[test]
    fn non_empty_algorithm_list_passes_through() {
        let mut options = creation_options();
        options.pub_key_cred_params = vec![PublicKeyCredentialParameters::new(-8)];
        let normalized = options.normalize(ORIGIN).unwrap();
        assert_eq!(
            normalized.algorithms,
            vec![PublicKeyCredentialParameters::new(-8)]
        );
    }

    #[test]
    fn rp_id_defaults_to_origin_host() {
        let normalized = creation_options().normalize("https://accounts.example.org").unwrap();
        assert_eq!(normalized.relying_party.id, "accounts.example.org");

        let mut options = creation_options();
        options.rp.id = Some("example.org".to_owned());
        let normalized = options.normalize("https://accounts.example.org").unwrap();
        assert_eq!(normalized.relying_party.id, "example.org");
    }

    #[test]
    fn unsupported_extensions_are_dropped_and_cred_props_recorded() {
        let mut options = creation_options();
        let mut extensions = BTreeMap::new();
        extensions.insert("credProps".to_owned(), Value::Bool(true));
        extensions.insert("largeBlob".to_owned(), Value::Bool(true));
        options.extensions = Some(extensions);
        let normalized = options.normalize(ORIGIN).unwrap();
        assert!(normalized.cred_props_requested);

        let normalized = creation_options().normalize(ORIGIN).unwrap();
        assert!(!normalized.cred_props_requested);
    }

    #[test]
    fn request_options_default_rp_id_and_keep_allow_list_absent() {
        let options = PublicKeyCredentialRequestOptions {
            rp_id: None,
            challenge: vec![1, 2, 3],
            allow_credentials: None,
            user_verification: None,
        };
        let normalized = options.normalize(ORIGIN);
        assert_eq!(normalized.relying_party_id, "example.org");
        assert!(normalized.allow.is_none());
    }

    #[test]
    fn credential_result_serializes_for_posting() {
        let credential = PublicKeyCredential {
            id: base64_url::encode(b"credential-id-01"),
            raw_id: b"credential-id-01".to_vec(),
            credential_type: PublicKeyCredentialType::PublicKey,
            response: AuthenticatorResponse::Assertion(AuthenticatorAssertionResponse {
                client_data_json: r#"{"type":"webauthn.get"}"#.to_owned(),
                authenticator_data: vec![0x11; 37],
                signature: vec![0x22; 4],
                user_handle: vec![0x33; 4],
            }),
            authenticator_attachment: None,
            client_extension_results: ClientExtensionResults::default(),
        };
        let json: Value = serde_json::to_value(&credential).unwrap();
        assert_eq!(json["rawId"], base64_url::encode(b"credential-id-01"));
        assert_eq!(json["type"], "public-key");
        assert_eq!(json["authenticatorAttachment"], Value::Null);
        assert_eq!(
            json["response"]["clientDataJSON"],
            base64_url::encode(br#"{"type":"webauthn.get"}"#)
        );
        assert_eq!(json["response"]["signature"], base64_url::encode(&[0x22; 4]));
        assert!(json["clientExtensionResults"]
            .as_object()
            .unwrap()
            .is_empty());
    }
}
