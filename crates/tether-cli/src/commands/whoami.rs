//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub fn run(session: &CliSession, _args: WhoamiArgs) -> Result<()> {
    let stored = session
        .store()
        .load()
        .context("Failed to read credentials")?
        .context("Not logged in. Run 'tether login' first.")?;

    let yes_no = |present: bool| if present { "yes" } else { "no" };

    output::field("API", session.api_url().as_str());
    output::field("Credentials", &session.credentials_path().display().to_string());
    output::field("Access token", yes_no(!stored.access_token.is_empty()));
    output::field("Refresh token", yes_no(stored.refresh_token.is_some()));
    output::field("Updated", &stored.updated_at.to_rfc3339());

    Ok(())
}
