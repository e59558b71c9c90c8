use std::convert::TryFrom;

use crate::proto::error::AgentStatusCode;
use crate::transport::error::ProtocolError;

/// A framed agent response: one status byte followed by the
/// ceremony-specific CBOR payload.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    pub status: AgentStatusCode,
    pub data: Option<Vec<u8>>,
}

impl TryFrom<&[u8]> for AgentResponse {
    type Error = ProtocolError;

    fn try_from(frame: &[u8]) -> Result<Self, Self::Error> {
        if frame.is_empty() {
            return Err(ProtocolError::InvalidFraming);
        }

        let status = AgentStatusCode::from(frame[0]);
        let data = if frame.len() > 1 {
            Some(Vec::from(&frame[1..]))
        } else {
            None
        };
        Ok(AgentResponse { status, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frames_are_rejected() {
        assert_eq!(
            AgentResponse::try_from(&[][..]).unwrap_err(),
            ProtocolError::InvalidFraming
        );
    }

    #[test]
    fn status_only_frames_have_no_payload() {
        let response = AgentResponse::try_from(&[0x23u8][..]).unwrap();
        assert_eq!(response.status, AgentStatusCode::AgentBusy);
        assert!(response.data.is_none());
    }

    #[test]
    fn success_frames_carry_their_payload() {
        let response = AgentResponse::try_from(&[0x00u8, 0xA1, 0x01, 0x02][..]).unwrap();
        assert_eq!(response.status, AgentStatusCode::Ok);
        assert_eq!(response.data, Some(vec![0xA1, 0x01, 0x02]));
    }
}
