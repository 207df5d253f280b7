//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// DID the field dump looks for when none is given
pub const DEFAULT_FIELDS_DID: i64 = 250520;

#[derive(Parser, Debug)]
#[command(name = "v53a", version, about = "V53a API client")]
pub struct Cli {
    /// Username for API authentication (or V53A_USERNAME)
    #[arg(short = 'U', long)]
    pub username: Option<String>,

    /// Password for API authentication (or V53A_PASSWORD, keychain, prompt)
    #[arg(short = 'P', long)]
    pub password: Option<String>,

    /// Base URL of the API (default: http://aiprediction.us)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Authentication endpoint (default: api-token-auth/)
    #[arg(long)]
    pub auth_endpoint: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Enable detailed HTTP debugging
    #[arg(long)]
    pub http_debug: bool,

    /// Request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Save the password in the OS keychain after a successful login
    #[arg(long)]
    pub remember: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Get paginated list of V53a records
    List {
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Page size
        #[arg(short = 's', long, default_value_t = 10)]
        page_size: u32,

        /// Filter by ID
        #[arg(long)]
        id: Option<i64>,

        /// Filter by DID
        #[arg(long)]
        did: Option<i64>,

        /// Extra equality filter, repeatable
        #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },

    /// Get details for a specific V53a record
    Detail {
        /// Record ID
        record_id: i64,
    },

    /// Get last elements for a specific record
    Last {
        /// Record DID
        did: i64,
    },

    /// Dump the fields of the record with a DID and save it as JSON
    Fields {
        /// Record DID
        #[arg(default_value_t = DEFAULT_FIELDS_DID)]
        did: i64,

        /// Output file for the record (the full list goes to all_<file>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// How many records to fetch while searching
        #[arg(short = 's', long, default_value_t = 100)]
        page_size: u32,
    },
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}
