//! A substitute WebAuthn client.
//!
//! Performs the two standard WebAuthn ceremonies — credential creation and
//! credential assertion — without a platform authenticator, by delegating
//! the authenticator role to the local PasskeySync signing agent over a
//! loop-back WebSocket, speaking a CTAP2-like binary protocol carried in
//! CBOR.

pub mod client_data;
pub mod fido;
pub mod ops;
pub mod proto;
pub mod transport;
pub mod webauthn;
