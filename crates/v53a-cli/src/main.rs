//! v53a - command line client for the V53a records API.
//!
//! Authenticates with token auth, then lists records, fetches record
//! details or last elements, or dumps a record's fields for debugging.

mod cli;
mod fields;
mod logging;
mod output;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use v53a_core::auth::CredentialStore;
use v53a_core::config::{Config, DEFAULT_AUTH_ENDPOINT, DEFAULT_BASE_URL};
use v53a_core::{ApiClient, ClientConfig, Credentials, ListQuery};

use cli::{Cli, Command};

const ENV_URL: &str = "V53A_URL";
const ENV_USERNAME: &str = "V53A_USERNAME";
const ENV_PASSWORD: &str = "V53A_PASSWORD";

/// First non-empty value among flag, environment and config file
fn first_set(candidates: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

fn client_config(cli: &Cli, config: &Config) -> ClientConfig {
    let base_url = first_set([
        cli.url.clone(),
        std::env::var(ENV_URL).ok(),
        config.base_url.clone(),
    ])
    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let auth_endpoint = first_set([cli.auth_endpoint.clone(), config.auth_endpoint.clone()])
        .unwrap_or_else(|| DEFAULT_AUTH_ENDPOINT.to_string());

    let mut client_config = ClientConfig::new(&base_url).with_auth_endpoint(&auth_endpoint);
    if let Some(secs) = cli.timeout.or(config.timeout_secs).filter(|s| *s > 0) {
        client_config = client_config.with_timeout(Duration::from_secs(secs));
    }
    client_config
}

/// Resolve the credential pair: flags, environment, keychain, then prompt
fn resolve_credentials(cli: &Cli, config: &Config) -> Result<Credentials> {
    let username = first_set([
        cli.username.clone(),
        std::env::var(ENV_USERNAME).ok(),
        config.last_username.clone(),
    ])
    .context("No username given. Pass --username or set V53A_USERNAME")?;

    if let Some(password) = first_set([cli.password.clone(), std::env::var(ENV_PASSWORD).ok()]) {
        return Ok(Credentials::new(username, password));
    }
    if let Some(stored) = CredentialStore::load(&username) {
        debug!(username = %username, "Using password from keychain");
        return Ok(stored);
    }

    let password = rpassword::prompt_password(format!("Password for {}: ", username))
        .context("Failed to read password")?;
    Ok(Credentials::new(username, password))
}

fn print_auth_help(debug_enabled: bool) {
    eprintln!("\nAuthentication failed. Please check your credentials, API URL, and auth endpoint.");
    eprintln!("\nPossible solutions:");
    eprintln!("1. Check if the API server is running and accessible");
    eprintln!("2. Verify your username and password are correct");
    eprintln!("3. Try a different authentication endpoint with --auth-endpoint");
    eprintln!("4. Check API logs for more details on the server side");
    eprintln!("5. Ensure you have network connectivity to the API server");
    if !debug_enabled {
        eprintln!("\nTry running with --debug or --http-debug to see more information.");
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });

    let client_config = client_config(&cli, &config);
    let credentials = resolve_credentials(&cli, &config)?;

    if cli.debug {
        eprintln!("API URL: {}", client_config.base_url());
        eprintln!("Auth endpoint: {}", client_config.auth_endpoint());
        eprintln!("Username: {}", credentials.username());
        eprintln!("Password: {}", "*".repeat(credentials.password().chars().count()));
    }

    let client = ApiClient::new(client_config.clone())?.with_credentials(credentials.clone());

    match client.authenticate(None, None).await {
        Ok(session) => info!(
            expires_at = %session.expires_at,
            minutes_left = session.minutes_until_expiry(),
            "Logged in"
        ),
        Err(err) => {
            if err.is_auth_failure() {
                print_auth_help(cli.debug || cli.http_debug);
            }
            return Err(err.into());
        }
    }

    if cli.remember {
        if let Err(e) = CredentialStore::store(&credentials) {
            warn!(error = %e, "Failed to store credentials in keychain");
        }
    }

    config.base_url = Some(client_config.base_url().to_string());
    config.auth_endpoint = Some(client_config.auth_endpoint().to_string());
    config.last_username = Some(credentials.username().to_string());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    let result = match cli.command.unwrap_or(Command::List {
        page: 1,
        page_size: 10,
        id: None,
        did: None,
        filters: Vec::new(),
    }) {
        Command::List {
            page,
            page_size,
            id,
            did,
            filters,
        } => {
            let mut query = ListQuery::page(page, page_size);
            if let Some(id) = id {
                query = query.filter("id", id);
            }
            if let Some(did) = did {
                query = query.filter("did", did);
            }
            query.filters.extend(filters);
            client.list(query).await?
        }
        Command::Detail { record_id } => client.detail(record_id).await?,
        Command::Last { did } => client.last_elements(did).await?,
        Command::Fields {
            did,
            output,
            page_size,
        } => return fields::run(&client, did, output.as_deref(), page_size).await,
    };

    println!("{}", output::render(&result, cli.format)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _log_guard = match logging::init(cli.debug, cli.http_debug, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("v53a starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_set_skips_blank() {
        assert_eq!(
            first_set([None, Some("  ".to_string()), Some("b".to_string())]),
            Some("b".to_string())
        );
        assert_eq!(first_set([None, None]), None);
    }

    #[test]
    fn test_client_config_prefers_flags() {
        let cli = Cli::parse_from([
            "v53a",
            "--url",
            "http://flag.test/",
            "--auth-endpoint",
            "/auth/token/",
            "--timeout",
            "7",
        ]);
        let config = Config {
            base_url: Some("http://config.test".into()),
            auth_endpoint: Some("other/".into()),
            last_username: None,
            timeout_secs: Some(99),
        };

        let client_config = client_config(&cli, &config);
        assert_eq!(client_config.auth_url(), "http://flag.test/auth/token/");
        assert_eq!(client_config.timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_client_config_falls_back_to_file() {
        let cli = Cli::parse_from(["v53a", "--url", "http://flag.test"]);
        let config = Config {
            auth_endpoint: Some("file-auth/".into()),
            timeout_secs: Some(12),
            ..Config::default()
        };

        let client_config = client_config(&cli, &config);
        assert_eq!(client_config.auth_url(), "http://flag.test/file-auth/");
        assert_eq!(client_config.timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_zero_timeout_in_file_is_ignored() {
        let cli = Cli::parse_from(["v53a"]);
        let config = Config {
            timeout_secs: Some(0),
            ..Config::default()
        };

        let client_config = client_config(&cli, &config);
        assert_eq!(client_config.timeout, ClientConfig::new("http://x.test").timeout);
    }

    #[test]
    fn test_credentials_from_flags() {
        let cli = Cli::parse_from(["v53a", "-U", "alice", "-P", "secret"]);
        let creds = resolve_credentials(&cli, &Config::default()).unwrap();
        assert_eq!(creds, Credentials::new("alice", "secret"));
    }
}
