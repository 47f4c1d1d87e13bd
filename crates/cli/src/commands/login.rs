//! Sign in with a one-time email code.
//!
//! Flow:
//! 1. Request a login code (sent to the user's email)
//! 2. User enters the code, CLI verifies and receives a session token
//! 3. Store the token in the system keyring (file fallback)

use anyhow::Result;
use shared::api::{RequestCodePayload, VerifyCodePayload};

use crate::{api::Api, config::Config, credentials, ui};

pub async fn run(config: &Config, email: &str) -> Result<()> {
    let api = Api::new(config.api_url.to_string());

    ui::spin(
        "Sending login code...",
        api.request_code(RequestCodePayload {
            email: email.into(),
        }),
    )
    .await?;

    let code = ui::prompt_code()?;

    let response = ui::spin(
        "Verifying...",
        api.verify_code(VerifyCodePayload {
            email: email.into(),
            code,
        }),
    )
    .await?;

    credentials::set_token(response.token)?;

    ui::success(&format!("Signed in as {}", ui::bold(&response.email)));

    Ok(())
}
