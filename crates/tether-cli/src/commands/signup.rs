//! Signup command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tether_core::Credentials;

use super::login::login;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct SignupArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "TETHER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(session: &CliSession, args: SignupArgs) -> Result<()> {
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Creating account...".dimmed());

    session
        .api()
        .signup(&credentials)
        .await
        .context("Failed to create account")?;

    login(session, &credentials).await?;

    output::success("Account created");
    println!();
    output::field("Email", credentials.email());
    output::field("API", session.api_url().as_str());

    Ok(())
}
