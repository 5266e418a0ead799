// # ddns6d - IPv6 dynamic-DNS daemon
//
// This daemon is a THIN integration layer. It is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing the tracing subscriber
// 3. Wiring the address source and update publisher
// 4. Running the update loop
//
// All update logic lives in ddns6-core; no business logic belongs here.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `DDNS6_INTERFACE`: network interface carrying the global IPv6
//   address (required)
// - `DDNS6_DOMAIN`: host record to update (required)
// - `DDNS6_PASSWORD`: provider password or token (required)
// - `DDNS6_USERNAME`: basic-auth user; defaults to the domain
// - `DDNS6_UPDATE_TEMPLATE`: URL template with `{domain}`,
//   `{current_ip}` and optionally `{password}` placeholders
// - `DDNS6_UPDATE_URL`: fixed URL, `hostname`/`myip` sent as query
//   parameters (mutually exclusive with DDNS6_UPDATE_TEMPLATE)
// - `DDNS6_LOG_LEVEL`: trace, debug, info, warn or error (default info)
//
// Without a template or URL the provider defaults to Strato's dyndns2
// endpoint.
//
// ## Example
//
// ```bash
// export DDNS6_INTERFACE=eth0
// export DDNS6_DOMAIN=home.example.org
// export DDNS6_PASSWORD=secret
//
// ddns6d
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use ddns6_addr_iproute::IprouteAddressSource;
use ddns6_core::UpdateLoop;
use ddns6_core::config::{Credentials, DdnsConfig, EngineConfig, UpdateEndpoint};
use ddns6_provider_dyndns2::Dyndns2Publisher;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    interface: String,
    domain: String,
    username: Option<String>,
    password: String,
    update_template: Option<String>,
    update_url: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            interface: require("DDNS6_INTERFACE")?,
            domain: require("DDNS6_DOMAIN")?,
            password: require("DDNS6_PASSWORD")?,
            username: env::var("DDNS6_USERNAME").ok().filter(|v| !v.is_empty()),
            update_template: env::var("DDNS6_UPDATE_TEMPLATE")
                .ok()
                .filter(|v| !v.is_empty()),
            update_url: env::var("DDNS6_UPDATE_URL").ok().filter(|v| !v.is_empty()),
            log_level: env::var("DDNS6_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.update_template.is_some() && self.update_url.is_some() {
            anyhow::bail!(
                "DDNS6_UPDATE_TEMPLATE and DDNS6_UPDATE_URL are mutually exclusive. \
                Set exactly one (or neither, for the default endpoint)."
            );
        }

        self.validate_domain_name(&self.domain)?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DDNS6_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Validate that a string is a valid domain name
    ///
    /// Basic DNS domain name validation per RFC 1035. Not comprehensive,
    /// but catches common mistakes before the first provider call.
    fn validate_domain_name(&self, domain: &str) -> Result<()> {
        if domain.len() > 253 {
            anyhow::bail!(
                "Domain name too long: {} chars (max 253). Got: {}",
                domain.len(),
                domain
            );
        }

        for label in domain.split('.') {
            if label.is_empty() {
                anyhow::bail!("Domain name has empty label: '{}'", domain);
            }

            if label.len() > 63 {
                anyhow::bail!(
                    "Domain label too long: {} chars (max 63). Label: '{}'",
                    label.len(),
                    label
                );
            }

            if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
                anyhow::bail!(
                    "Domain label contains invalid characters. Label: '{}'. \
                    Valid: alphanumeric and hyphen only.",
                    label
                );
            }

            if label.starts_with('-') || label.ends_with('-') {
                anyhow::bail!(
                    "Domain label cannot start or end with hyphen. Label: '{}'",
                    label
                );
            }
        }

        Ok(())
    }

    /// The configured endpoint shape (exactly one is active)
    fn endpoint(&self) -> UpdateEndpoint {
        if let Some(url) = &self.update_url {
            UpdateEndpoint::QueryParams { url: url.clone() }
        } else if let Some(template) = &self.update_template {
            UpdateEndpoint::Template {
                template: template.clone(),
            }
        } else {
            UpdateEndpoint::default()
        }
    }
}

/// Read a required environment variable
fn require(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => anyhow::bail!("{} is required. Set it via: export {}=...", key, key),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting ddns6d daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let credentials = Credentials {
        domain: config.domain.clone(),
        username: config.username.clone(),
        password: config.password.clone(),
    };
    let endpoint = config.endpoint();

    let source = IprouteAddressSource::new(config.interface.as_str());
    let publisher = Dyndns2Publisher::new(credentials.clone(), endpoint.clone())?;

    let ddns_config = DdnsConfig {
        interface: config.interface.clone(),
        credentials,
        endpoint,
        engine: EngineConfig::default(),
    };

    let (engine, mut events) =
        UpdateLoop::new(Box::new(source), Box::new(publisher), ddns_config)?;

    // Surface engine events in the log; the loop itself already logs the
    // interesting transitions at info/warn.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            tracing::debug!(?event, "engine event");
        }
    });

    info!("Managing record: {}", config.domain);
    engine.run().await?;

    info!("Shutting down daemon");
    Ok(())
}
