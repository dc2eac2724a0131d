//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{login, logout, refresh_token, request, signup, whoami};

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Call a bearer-token API with transparent token renewal.
#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(author, version = env!("TETHER_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL
    #[arg(long, env = "TETHER_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Credentials file (defaults to the user data directory)
    #[arg(long, env = "TETHER_CREDENTIALS_FILE", global = true)]
    pub credentials_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the credentials
    Login(login::LoginArgs),

    /// Create an account, then log in
    Signup(signup::SignupArgs),

    /// Remove the stored credentials
    Logout(logout::LogoutArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Renew the access token now
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Send an authenticated request
    Request(request::RequestArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_request_arguments() {
        let cli = Cli::try_parse_from([
            "tether",
            "--api-url",
            "https://example.com/api",
            "request",
            "post",
            "/children/",
            "--data",
            r#"{"name":"Ada"}"#,
            "--query",
            "page=2",
            "--compact",
        ])
        .unwrap();

        assert_eq!(cli.api_url, "https://example.com/api");
        let Commands::Request(args) = cli.command else {
            panic!("expected request command");
        };
        assert_eq!(args.path, "/children/");
        assert_eq!(args.query, vec![("page".to_string(), "2".to_string())]);
        assert!(args.compact);
    }

    #[test]
    fn rejects_malformed_query() {
        let result = Cli::try_parse_from(["tether", "request", "get", "/", "--query", "page"]);
        assert!(result.is_err());
    }
}
