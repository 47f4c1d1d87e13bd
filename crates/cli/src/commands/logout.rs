//! Sign out: end the server session and drop local credentials.

use anyhow::Result;

use crate::{api::Api, config::Config, credentials, ui};

pub async fn run(config: &Config) -> Result<()> {
    // Best effort: local credentials go away even if the server is down
    if let Ok(token) = credentials::get_token() {
        let api = Api::new(config.api_url.to_string());
        if let Err(err) = api.logout(token).await {
            ui::info(&format!("Could not end the server session: {}", err));
        }
    }

    credentials::delete_all()?;

    ui::success("Signed out");

    Ok(())
}
