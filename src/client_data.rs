use serde::Serialize;
use sha2::{Digest, Sha256};

/// Ceremony discriminator carried in collected client data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ClientDataType {
    #[serde(rename = "webauthn.create")]
    Create,
    #[serde(rename = "webauthn.get")]
    Get,
}

/// The collected client data both ceremonies hash and hand to the agent.
///
/// Serialized key order is fixed: `type`, `challenge`, `origin`,
/// `crossOrigin`. The challenge is rendered as unpadded base64url text,
/// the same encoding used for credential ids, never as a raw byte array.
#[derive(Debug, Clone, Serialize)]
pub struct CollectedClientData {
    #[serde(rename = "type")]
    pub client_data_type: ClientDataType,
    pub challenge: String,
    pub origin: String,
    #[serde(rename = "crossOrigin")]
    pub cross_origin: bool,
}

impl CollectedClientData {
    pub fn new(client_data_type: ClientDataType, challenge: &[u8], origin: &str) -> Self {
        Self {
            client_data_type,
            challenge: base64_url::encode(challenge),
            origin: String::from(origin),
            cross_origin: false,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }

    /// SHA-256 over the UTF-8 bytes of the JSON text.
    pub fn hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::default();
        hasher.update(self.to_json().as_bytes());
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_has_fixed_key_order_and_base64url_challenge() {
        let client_data = CollectedClientData::new(
            ClientDataType::Create,
            &[0xd6, 0xf4, 0x3d, 0x9b],
            "https://example.org",
        );
        assert_eq!(
            client_data.to_json(),
            r#"{"type":"webauthn.create","challenge":"1vQ9mw","origin":"https://example.org","crossOrigin":false}"#
        );
    }

    #[test]
    fn get_ceremony_uses_its_own_type_tag() {
        let client_data = CollectedClientData::new(ClientDataType::Get, b"x", "https://example.org");
        assert!(client_data.to_json().starts_with(r#"{"type":"webauthn.get""#));
    }

    #[test]
    fn hash_is_sha256_of_the_json_text() {
        let client_data =
            CollectedClientData::new(ClientDataType::Get, &[1, 2, 3], "https://example.org");
        let mut hasher = Sha256::default();
        hasher.update(client_data.to_json().as_bytes());
        let expected: [u8; 32] = hasher.finalize().into();
        assert_eq!(client_data.hash(), expected);
    }
}
