//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(session: &CliSession, _args: RefreshTokenArgs) -> Result<()> {
    session
        .client()
        .credentials()
        .context("Failed to read credentials")?
        .context("Not logged in. Run 'tether login' first.")?;

    eprintln!("{}", "Renewing access token...".dimmed());

    session
        .client()
        .refresh()
        .await
        .context("Failed to renew access token")?;

    output::success("Access token renewed");

    Ok(())
}
