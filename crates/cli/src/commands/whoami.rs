//! Show the signed-in email address.

use anyhow::Result;

use crate::{api::Api, config::Config, credentials};

pub async fn run(config: &Config) -> Result<()> {
    let token = credentials::get_token()?;
    let api = Api::new(config.api_url.to_string());

    let me = api.get_me(token).await?;

    println!("{}", me.email);

    Ok(())
}
