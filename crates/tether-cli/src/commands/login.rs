//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tether_core::Credentials;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "TETHER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(session: &CliSession, args: LoginArgs) -> Result<()> {
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    login(session, &credentials).await?;

    output::success("Logged in successfully");
    println!();
    output::field("Email", credentials.email());
    output::field("API", session.api_url().as_str());

    Ok(())
}

/// Log in and persist the credential pair.
pub(crate) async fn login(session: &CliSession, credentials: &Credentials) -> Result<()> {
    let pair = session
        .api()
        .login(credentials)
        .await
        .context("Failed to login")?;

    session
        .client()
        .set_credentials(&pair)
        .context("Failed to save credentials")?;

    Ok(())
}
