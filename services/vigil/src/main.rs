//! Vigil CLI
//!
//! Command-line interface for the endpoint health monitoring service.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::Level;

use vigil::checker::HealthChecker;
use vigil::io::ReqwestHttpClient;
use vigil::session::PollSession;
use vigil::status::EndpointStatus;
use vigil::store::EndpointStore;
use vigil::{load_config, Config, Endpoint, VigilError};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "HTTP endpoint health monitoring service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll all endpoints continuously and serve the dashboard
    Watch {
        /// Dashboard port (overrides config file)
        #[arg(long)]
        dashboard_port: Option<u16>,
    },
    /// Run one check pass and print the results
    Check {
        /// Check a single stored endpoint by URL instead of the whole list
        url: Option<String>,
    },
    /// Add an endpoint to the store
    Add {
        /// Display name for the endpoint
        name: String,
        /// Absolute http(s) URL to check
        url: String,
    },
    /// List stored endpoints
    List,
    /// Remove an endpoint from the store by URL
    Remove { url: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    match args.command {
        Command::Watch { dashboard_port } => {
            if let Some(port) = dashboard_port {
                config.dashboard.port = port;
            }
            vigil::run(config).await?;
        }
        Command::Check { url } => check(&config, url.as_deref()).await?,
        Command::Add { name, url } => {
            let store = EndpointStore::new(&config.endpoints_file);
            store.add(Endpoint::new(name, &url))?;
            println!("Added {}", url);
        }
        Command::List => {
            let store = EndpointStore::new(&config.endpoints_file);
            let endpoints = store.load()?;
            if endpoints.is_empty() {
                println!("No endpoints configured");
            }
            for endpoint in endpoints {
                println!("{}\t{}", endpoint.name, endpoint.url);
            }
        }
        Command::Remove { url } => {
            let store = EndpointStore::new(&config.endpoints_file);
            if store.remove(&url)? {
                println!("Removed {}", url);
            } else {
                println!("No endpoint with URL {}", url);
            }
        }
    }

    Ok(())
}

async fn check(config: &Config, url: Option<&str>) -> vigil::Result<()> {
    let store = EndpointStore::new(&config.endpoints_file);
    let checker = HealthChecker::new(Arc::new(ReqwestHttpClient::default()), config.timeout());

    match url {
        Some(url) => {
            let endpoint = store
                .load()?
                .into_iter()
                .find(|e| e.url == url)
                .ok_or_else(|| {
                    VigilError::Validation(format!("no stored endpoint with URL '{}'", url))
                })?;
            let status = checker.check(&endpoint).await;
            print_status(&status);
        }
        None => {
            let session = PollSession::new(store, checker);
            session.run_full_cycle().await?;
            for status in session.snapshot().await {
                print_status(&status);
            }
        }
    }

    Ok(())
}

fn print_status(status: &EndpointStatus) {
    let response_time = status
        .response_time_ms
        .map(|ms| format!(" ({} ms)", ms))
        .unwrap_or_default();
    let detail = status
        .error
        .as_deref()
        .map(|e| format!(" - {}", e))
        .or_else(|| {
            status
                .response
                .as_ref()
                .map(|r| format!(" - HTTP {}", r.status_code))
        })
        .unwrap_or_default();

    println!(
        "{:<8} {} [{}]{}{}",
        status.state.to_string().to_uppercase(),
        status.endpoint.name,
        status.endpoint.url,
        response_time,
        detail
    );
}
