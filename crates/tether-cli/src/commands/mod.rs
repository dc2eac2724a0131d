//! Subcommand implementations.

pub mod login;
pub mod logout;
pub mod refresh_token;
pub mod request;
pub mod signup;
pub mod whoami;

use anyhow::Result;

use crate::cli::{Cli, Commands};
use crate::session::CliSession;

pub async fn handle(cli: Cli) -> Result<()> {
    let session = CliSession::from_cli(&cli)?;

    match cli.command {
        Commands::Login(args) => login::run(&session, args).await,
        Commands::Signup(args) => signup::run(&session, args).await,
        Commands::Logout(args) => logout::run(&session, args),
        Commands::Whoami(args) => whoami::run(&session, args),
        Commands::RefreshToken(args) => refresh_token::run(&session, args).await,
        Commands::Request(args) => request::run(&session, args).await,
    }
}
