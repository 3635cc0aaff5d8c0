use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use auth_fetch::client::{AuthEvents, AuthenticatedRequestClient, RequestOptions};
use auth_fetch::config::oauth::ServiceConfig;
use auth_fetch::server;
use auth_fetch::sources::{OAuth2Refresher, TokenProvider};
use auth_fetch::utils::config_loader;
use auth_fetch::utils::logging::{self, LogLevel};
use clap::{Parser, Subcommand};
use http::{HeaderName, HeaderValue, Method};
use reqwest::cookie::Jar;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "auth-fetch.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the refresh endpoint
    Serve,
    /// Obtain an access token through the cached provider
    Token {
        #[arg(long)]
        print_token: bool,
    },
    /// Send one request, refreshing the session once on 401
    Fetch {
        target: String,
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// `Name: value`, repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        #[arg(short, long)]
        body: Option<String>,
        /// `name=value`, repeatable
        #[arg(long = "cookie")]
        cookies: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level).await?;

    // -------------------------------
    // 2. Run command
    // -------------------------------

    match args.command {
        Command::Serve => {
            info!("Service starting...");
            server::server::start(&service_config, AuthEvents::new()).await
        }
        Command::Token { print_token } => token(&service_config, print_token).await,
        Command::Fetch { target, method, headers, body, cookies } => {
            fetch(&service_config, &target, &method, &headers, body, &cookies).await
        }
    }
}

async fn token(service_config: &ServiceConfig, print_token: bool) -> Result<()> {
    let oauth_config = Arc::new(service_config.oauth.clone());
    let refresher = OAuth2Refresher::new(oauth_config.clone(), service_config.settings.http.timeout_ms)?;
    let provider = TokenProvider::new(refresher, oauth_config.refresh_token.clone());

    let credential = provider.get_access_credential().await?;
    if print_token {
        println!("{}", credential.token);
    } else {
        println!("access token valid until {}", credential.expires_at.to_rfc3339());
    }
    Ok(())
}

async fn fetch(
    service_config: &ServiceConfig,
    target: &str,
    method: &str,
    headers: &[String],
    body: Option<String>,
    cookies: &[String],
) -> Result<()> {
    let jar = Arc::new(Jar::default());
    let base_url = service_config
        .client
        .base_url
        .parse::<reqwest::Url>()
        .context("invalid client.base_url")?;
    for cookie in cookies {
        jar.add_cookie_str(&format!("{}; Path=/", cookie), &base_url);
    }
    let client = AuthenticatedRequestClient::new(
        &service_config.client,
        jar,
        service_config.settings.http.timeout_ms,
    )?;

    let mut options = RequestOptions::new(Method::from_bytes(method.to_uppercase().as_bytes())?);
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| anyhow!("header '{}' must look like 'Name: value'", header))?;
        options = options.header(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }
    if let Some(body) = body {
        options = options.body(body);
    }

    let response = client.request(target, options).await?;
    println!("{}", response.status());
    println!("{}", response.text().await?);
    Ok(())
}
