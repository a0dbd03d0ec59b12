use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use webook_client::api::WebookApi;
use webook_client::config::{ArticlesAction, Command, Config};
use webook_client::interceptor::AuthInterceptors;
use webook_client::navigation::LogNavigator;
use webook_client::storage::{CredentialStorage, Credentials, FileStorage};
use webook_client::transport::Transport;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let (config, command) = Config::load()?;
    config.validate()?;

    init_logging(&config);

    tracing::debug!(
        base_url = %config.base_url,
        login_route = %config.login_route,
        clear_on_unauthorized = config.clear_on_unauthorized,
        "Configuration loaded"
    );

    // Credential storage
    let storage: Arc<dyn CredentialStorage> = match &config.storage_file {
        Some(path) => Arc::new(FileStorage::open(path.clone())?),
        None => Arc::new(FileStorage::open_default()?),
    };
    if !storage.is_available() {
        tracing::warn!("No persistent storage available, session will not be kept");
    }

    let navigator = Arc::new(LogNavigator::new());

    let auth = AuthInterceptors::new(storage, navigator.clone())
        .login_route(config.login_route.clone())
        .clear_on_unauthorized(config.clear_on_unauthorized);
    let credentials = auth.credentials().clone();

    let transport = Transport::builder()
        .base_url(config.base_url.clone())
        .connect_timeout(config.http_connect_timeout)
        .request_timeout(config.http_request_timeout)
        .with_auth(auth)
        .build()
        .context("Failed to initialize transport")?;

    let api = WebookApi::new(Arc::new(transport), credentials);

    match run(&api, command).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Some(route) = navigator.take_pending() {
                eprintln!("Session expired or missing, login required ({})", route);
                eprintln!("Run: webook login --email <email>");
            }
            Err(e)
        }
    }
}

fn init_logging(config: &Config) {
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    // Logs go to stderr so stdout stays parseable
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .init();
    }
}

async fn run(api: &WebookApi, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .interact()
                    .context("Failed to read password")?,
            };
            let message = api.login(&email, &password).await?;
            println!("{}", message);
        }
        Command::Logout => {
            let message = api.logout().await?;
            println!("{}", message);
        }
        Command::Profile => {
            print_json(&api.profile().await?)?;
        }
        Command::Articles {
            action: Some(ArticlesAction::Withdraw { id }),
            ..
        } => {
            let id = api.withdraw_article(id).await?;
            println!("Withdrew article {}", id);
        }
        Command::Articles {
            action: None,
            public,
            offset,
            limit,
        } => {
            let items = if public {
                api.published_articles(offset, limit).await?
            } else {
                api.my_articles(offset, limit).await?
            };
            print_json(&items)?;
        }
        Command::Refresh => {
            api.refresh_session().await?;
            println!("Session refreshed");
        }
        Command::Status => {
            print_status(api.credentials())?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_status(credentials: &Credentials) -> Result<()> {
    if !credentials.is_available() {
        println!("Storage: unavailable");
        return Ok(());
    }

    let pair = credentials.pair()?;
    println!(
        "Access token:  {}",
        if pair.access_token.is_some() { "stored" } else { "none" }
    );
    println!(
        "Refresh token: {}",
        if pair.refresh_token.is_some() { "stored" } else { "none" }
    );
    Ok(())
}
