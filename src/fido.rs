use std::io::Cursor as IOCursor;

use bitflags::bitflags;
use byteorder::{BigEndian, ReadBytesExt};

use crate::transport::error::ProtocolError;

// 32 (rpIdHash) + 1 (flags) + 4 (signCount)
const ATTESTED_CREDENTIAL_DATA_OFFSET: usize = 37;
// + 16 (aaguid)
const CREDENTIAL_ID_LENGTH_OFFSET: usize = 53;

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct AuthenticatorDataFlags: u8 {
        const USER_PRESENT = 0x01;
        const USER_VERIFIED = 0x04;
        const BACKUP_ELIGIBLE = 0x08;
        const BACKED_UP = 0x10;
        const ATTESTED_CREDENTIALS = 0x40;
        const EXTENSION_DATA = 0x80;
    }
}

/// Attested credential data: aaguid, length-prefixed credential id, and the
/// remainder as an opaque COSE public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredentialData {
    pub aaguid: [u8; 16],
    pub credential_id: Vec<u8>,
    pub credential_public_key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorData {
    pub rp_id_hash: [u8; 32],
    pub flags: AuthenticatorDataFlags,
    pub sign_count: u32,
    pub attested_credential: Option<AttestedCredentialData>,
}

impl AuthenticatorData {
    /// Parse the fixed authenticator-data layout.
    ///
    /// Attested credential data is parsed whenever bytes remain past the
    /// sign counter; presence is implied by the layout, the 0x40 flag is
    /// not consulted. Trailing extension CBOR is not parsed and ends up
    /// inside the opaque public-key remainder.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < ATTESTED_CREDENTIAL_DATA_OFFSET {
            return Err(ProtocolError::InvalidAuthenticatorData);
        }

        let mut rp_id_hash = [0u8; 32];
        rp_id_hash.copy_from_slice(&data[..32]);
        let flags = AuthenticatorDataFlags::from_bits_retain(data[32]);

        let mut cursor = IOCursor::new(data);
        cursor.set_position(33);
        let sign_count = cursor.read_u32::<BigEndian>().unwrap();

        let attested_credential = if data.len() > ATTESTED_CREDENTIAL_DATA_OFFSET {
            if data.len() < CREDENTIAL_ID_LENGTH_OFFSET + 2 {
                return Err(ProtocolError::InvalidAuthenticatorData);
            }
            let mut aaguid = [0u8; 16];
            aaguid.copy_from_slice(&data[ATTESTED_CREDENTIAL_DATA_OFFSET..CREDENTIAL_ID_LENGTH_OFFSET]);

            cursor.set_position(CREDENTIAL_ID_LENGTH_OFFSET as u64);
            let credential_id_len = cursor.read_u16::<BigEndian>().unwrap() as usize;
            let credential_id_offset = CREDENTIAL_ID_LENGTH_OFFSET + 2;
            if data.len() < credential_id_offset + credential_id_len {
                return Err(ProtocolError::InvalidAuthenticatorData);
            }

            let credential_id = data[credential_id_offset..credential_id_offset + credential_id_len].to_vec();
            let credential_public_key = data[credential_id_offset + credential_id_len..].to_vec();
            Some(AttestedCredentialData {
                aaguid,
                credential_id,
                credential_public_key,
            })
        } else {
            None
        };

        Ok(Self {
            rp_id_hash,
            flags,
            sign_count,
            attested_credential,
        })
    }

    pub fn credential_id(&self) -> Option<&[u8]> {
        self.attested_credential
            .as_ref()
            .map(|attested| attested.credential_id.as_slice())
    }
}
