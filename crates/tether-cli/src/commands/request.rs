//! Request command implementation.

use anyhow::{Context, Result};
use clap::Args;

use tether_core::{Method, Request};

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: Method,

    /// Path relative to the API URL (e.g., /children/)
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long, value_parser = parse_query)]
    pub query: Vec<(String, String)>,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,
}

fn parse_query(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

pub async fn run(session: &CliSession, args: RequestArgs) -> Result<()> {
    let mut request = Request::new(args.method, args.path);

    if let Some(data) = &args.data {
        let body: serde_json::Value = serde_json::from_str(data).context("Invalid JSON body")?;
        request = request.with_json(body);
    }
    for (key, value) in args.query {
        request = request.with_query(key, value);
    }

    let response = session
        .client()
        .request(request)
        .await
        .context("Request failed")?;

    if response.body.is_empty() {
        return Ok(());
    }

    match serde_json::from_slice::<serde_json::Value>(&response.body) {
        Ok(value) => output::json(&value, args.compact),
        Err(_) => {
            println!("{}", response.text());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_splits_on_first_equals() {
        assert_eq!(
            parse_query("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert!(parse_query("page").is_err());
    }
}
