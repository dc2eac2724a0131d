//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub fn run(session: &CliSession, _args: LogoutArgs) -> Result<()> {
    session
        .client()
        .logout()
        .context("Failed to remove credentials")?;

    output::success("Logged out");

    Ok(())
}
