use rand::{thread_rng, Rng};
use tracing_subscriber::{self, EnvFilter};

use libpasskeysync::ops::webauthn::{
    CredentialCreationOptions, CredentialRequestOptions, PublicKeyCredentialCreationOptions,
    PublicKeyCredentialRequestOptions, RelyingParty, User,
};
use libpasskeysync::proto::agent::PublicKeyCredentialDescriptor;
use libpasskeysync::webauthn::PasskeySyncClient;

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    let challenge: [u8; 16] = thread_rng().gen();
    let client = PasskeySyncClient::new("https://example.org");

    // Make Credential ceremony
    let credential = client
        .create(CredentialCreationOptions {
            public_key: Some(PublicKeyCredentialCreationOptions {
                rp: RelyingParty {
                    id: None,
                    name: "Example".to_owned(),
                },
                user: User {
                    id: vec![0x42; 32],
                    name: "mario.rossi".to_owned(),
                    display_name: "Mario Rossi".to_owned(),
                },
                challenge: challenge.to_vec(),
                pub_key_cred_params: vec![],
                timeout: None,
                authenticator_selection: None,
                exclude_credentials: None,
                extensions: None,
            }),
            signal: None,
        })
        .await?;
    println!("Created credential: {}", credential.id);
    println!("{}", serde_json::to_string_pretty(&credential)?);

    // Get Assertion ceremony, allow-listing the credential we just made.
    let assertion = client
        .get(CredentialRequestOptions {
            public_key: Some(PublicKeyCredentialRequestOptions {
                rp_id: None,
                challenge: challenge.to_vec(),
                allow_credentials: Some(vec![PublicKeyCredentialDescriptor::new(
                    &credential.raw_id,
                )]),
                user_verification: None,
            }),
            signal: None,
        })
        .await?;
    println!("Assertion: {}", serde_json::to_string_pretty(&assertion)?);

    Ok(())
}
