use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Url;
use std::path::PathBuf;

use crate::navigation::LOGIN_ROUTE;
use crate::transport::DEFAULT_BASE_URL;

/// webook command-line client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// API origin
    #[arg(short = 'u', long, env = "WEBOOK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Credential storage file (defaults to the platform data directory)
    #[arg(short = 's', long, env = "WEBOOK_STORAGE_FILE")]
    pub storage_file: Option<String>,

    /// Route to navigate to when the session is rejected
    #[arg(long, env = "WEBOOK_LOGIN_ROUTE", default_value = LOGIN_ROUTE)]
    pub login_route: String,

    /// Drop stored credentials when the server answers 401
    #[arg(long, env = "WEBOOK_CLEAR_ON_UNAUTHORIZED", default_value = "false")]
    pub clear_on_unauthorized: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "60")]
    pub http_timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        /// Prompted for when omitted
        #[arg(short, long, env = "WEBOOK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Log out and forget the stored session
    Logout,
    /// Show the current user's profile
    Profile,
    /// List articles, or act on one of yours
    Articles {
        #[command(subcommand)]
        action: Option<ArticlesAction>,
        /// Published articles from every author instead of your own
        #[arg(long)]
        public: bool,
        #[arg(long, default_value = "0")]
        offset: i64,
        #[arg(long, default_value = "100")]
        limit: i64,
    },
    /// Exchange the refresh token for a new access token
    Refresh,
    /// Show which credentials are stored
    Status,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ArticlesAction {
    /// Withdraw one of your published articles
    Withdraw {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,

    // Credential storage
    pub storage_file: Option<PathBuf>,

    // Session handling
    pub login_route: String,
    pub clear_on_unauthorized: bool,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    pub log_level: String,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            storage_file: None,
            login_route: LOGIN_ROUTE.to_string(),
            clear_on_unauthorized: false,
            http_connect_timeout: 30,
            http_request_timeout: 60,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<(Self, Command)> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        Ok(Self::from_args(args))
    }

    pub fn from_args(args: CliArgs) -> (Self, Command) {
        let config = Config {
            base_url: args.base_url,

            storage_file: args.storage_file.map(|s| expand_tilde(&s)),

            login_route: args.login_route,
            clear_on_unauthorized: args.clear_on_unauthorized,

            http_connect_timeout: std::env::var("HTTP_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),

            http_request_timeout: args.http_timeout,

            log_level: args.log_level,
            log_json: args.log_json,
        };

        (config, args.command)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("WEBOOK_BASE_URL is not a valid URL: {}", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "WEBOOK_BASE_URL must use http or https, got {}",
                url.scheme()
            );
        }

        if !self.login_route.starts_with('/') {
            anyhow::bail!(
                "WEBOOK_LOGIN_ROUTE must be an absolute path, got {}",
                self.login_route
            );
        }

        if self.http_request_timeout == 0 {
            anyhow::bail!("HTTP_REQUEST_TIMEOUT must be greater than zero");
        }

        Ok(())
    }
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
