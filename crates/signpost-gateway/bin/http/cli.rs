use clap::{ArgAction, Parser, ValueEnum};
use signpost_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

pub const LISTEN_ADDR_ENV: &str = "SIGNPOST_LISTEN_ADDR";
pub const RULE_SOURCE_ENV: &str = "SIGNPOST_RULE_SOURCE";
pub const RULES_FILE_ENV: &str = "SIGNPOST_RULES_FILE";
pub const UPSTREAM_URL_ENV: &str = "SIGNPOST_UPSTREAM_URL";
pub const UPSTREAM_TIMEOUT_MS_ENV: &str = "SIGNPOST_UPSTREAM_TIMEOUT_MS";
pub const PUBLIC_ORIGIN_ENV: &str = "SIGNPOST_PUBLIC_ORIGIN";
pub const SANITY_PROJECT_ID_ENV: &str = "SIGNPOST_SANITY_PROJECT_ID";
pub const SANITY_DATASET_ENV: &str = "SIGNPOST_SANITY_DATASET";
pub const SANITY_API_VERSION_ENV: &str = "SIGNPOST_SANITY_API_VERSION";
pub const SANITY_TOKEN_ENV: &str = "SIGNPOST_SANITY_TOKEN";
pub const SANITY_USE_CDN_ENV: &str = "SIGNPOST_SANITY_USE_CDN";
pub const LOOKUP_TIMEOUT_MS_ENV: &str = "SIGNPOST_LOOKUP_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "SIGNPOST_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "SIGNPOST_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SANITY_API_VERSION: &str = signpost_storage::sanity::DEFAULT_API_VERSION;
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuleSourceArg {
    #[value(name = "sanity")]
    Sanity,
    #[value(name = "file")]
    File,
}

impl Display for RuleSourceArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleSourceArg::Sanity => write!(f, "sanity"),
            RuleSourceArg::File => write!(f, "file"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "pretty")]
    Pretty,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Pretty => write!(f, "pretty"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "signpost-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = RULE_SOURCE_ENV,
        value_enum,
        default_value_t = RuleSourceArg::Sanity
    )]
    pub rule_source: RuleSourceArg,

    /// JSON array of redirect rules, used with `--rule-source file`.
    #[arg(long, env = RULES_FILE_ENV, required_if_eq("rule_source", "file"))]
    pub rules_file: Option<PathBuf>,

    /// Page renderer that receives pass-through requests.
    #[arg(long, env = UPSTREAM_URL_ENV, default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: Url,

    #[arg(long, env = UPSTREAM_TIMEOUT_MS_ENV, default_value_t = DEFAULT_UPSTREAM_TIMEOUT_MS)]
    pub upstream_timeout_ms: u64,

    /// Origin used in redirect locations. Derived from the request when unset.
    #[arg(long, env = PUBLIC_ORIGIN_ENV)]
    pub public_origin: Option<String>,

    #[arg(long, env = SANITY_PROJECT_ID_ENV)]
    pub sanity_project_id: Option<String>,

    #[arg(long, env = SANITY_DATASET_ENV)]
    pub sanity_dataset: Option<String>,

    #[arg(long, env = SANITY_API_VERSION_ENV, default_value = DEFAULT_SANITY_API_VERSION)]
    pub sanity_api_version: String,

    #[arg(long, env = SANITY_TOKEN_ENV, hide_env_values = true)]
    pub sanity_token: Option<String>,

    #[arg(
        long,
        env = SANITY_USE_CDN_ENV,
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub sanity_use_cdn: bool,

    #[arg(long, env = LOOKUP_TIMEOUT_MS_ENV, default_value_t = DEFAULT_LOOKUP_TIMEOUT_MS)]
    pub lookup_timeout_ms: u64,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Pretty
    )]
    pub log_format: LogFormatArg,

    /// OTLP/gRPC collector for span export.
    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}
