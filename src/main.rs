//! godaddy-ddns - DDNS-like update service for GoDaddy.

use clap::{Parser, Subcommand};
use godaddy_ddns::cache::CacheRecord;
use godaddy_ddns::config::Config;
use godaddy_ddns::detector::{IpDetector, IpResolver};
use godaddy_ddns::error::DdnsError;
use godaddy_ddns::journal::{Level, LogSink};
use godaddy_ddns::providers::{GoDaddyConnector, ProviderConnector};
use godaddy_ddns::updater::{Outcome, Updater};
use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "godaddy-ddns")]
#[command(about = "DDNS-like update service for GoDaddy")]
#[command(version)]
struct Cli {
    /// Path to configuration file (.yaml, or .toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Update the IP regardless of the cached IP
    #[arg(short, long, global = true)]
    force: bool,

    /// Don't print to stdout
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Update DNS records if the public IP changed (default)
    Update,

    /// Show the detected public IP and the cached record
    Status,

    /// Check credentials and which target domains the account holds
    Validate,

    /// Print an example configuration
    Example {
        /// Emit TOML instead of YAML
        #[arg(long)]
        toml: bool,
    },
}

/// Prints run log entries, styled by level.
struct Console {
    styled: bool,
}

impl Console {
    fn new() -> Self {
        Self {
            styled: std::io::stdout().is_terminal(),
        }
    }

    fn style(level: Level) -> &'static str {
        match level {
            Level::Success => "\x1b[1;32m",
            Level::Info => "\x1b[34m",
            Level::Warning => "\x1b[33m",
            Level::Error => "\x1b[1;31m",
        }
    }
}

impl LogSink for Console {
    fn record(&self, level: Level, message: &str) -> godaddy_ddns::Result<()> {
        if self.styled {
            println!("{}{}: {}\x1b[0m", Self::style(level), level, message);
        } else {
            println!("{}: {}", level, message);
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e
                .downcast_ref::<DdnsError>()
                .map(DdnsError::exit_code)
                .unwrap_or(1);
            tracing::debug!("Exiting with code {}: {:#}", code, e);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let console: Option<Arc<dyn LogSink>> = if cli.quiet {
        None
    } else {
        Some(Arc::new(Console::new()))
    };

    match cli.command.unwrap_or(Commands::Update) {
        Commands::Update => {
            let config = load_config(&config_path, console.as_deref())?;
            cmd_update(config, cli.force, console).await?;
        }
        Commands::Status => {
            let config = load_config(&config_path, console.as_deref())?;
            cmd_status(config).await?;
        }
        Commands::Validate => {
            let config = load_config(&config_path, console.as_deref())?;
            cmd_validate(config).await?;
        }
        Commands::Example { toml } => cmd_example(toml)?,
    }

    Ok(())
}

fn load_config(path: &PathBuf, console: Option<&dyn LogSink>) -> godaddy_ddns::Result<Config> {
    Config::load_from(path).map_err(|e| {
        if let Some(console) = console {
            let _ = console.record(Level::Error, &e.detail());
        }
        e
    })
}

async fn cmd_update(
    config: Config,
    force: bool,
    console: Option<Arc<dyn LogSink>>,
) -> anyhow::Result<()> {
    let detector = Arc::new(IpDetector::with_services(config.ip_services.clone()));
    let mut updater = Updater::new(detector, Arc::new(GoDaddyConnector));
    if let Some(console) = console {
        updater = updater.with_echo(console);
    }

    match updater.reconcile(&config, force).await? {
        Outcome::UpToDate { .. } => {}
        Outcome::Updated { targets, .. } => {
            tracing::info!("Updated targets: {:?}", targets);
        }
    }

    Ok(())
}

async fn cmd_status(config: Config) -> anyhow::Result<()> {
    let detector = IpDetector::with_services(config.ip_services.clone());

    println!("godaddy-ddns Status");
    println!("===================\n");

    match detector.resolve_ipv4().await {
        Ok(Some(ip)) => println!("Current Public IP: {}", ip),
        Ok(None) => println!("Current Public IP: (not detected)"),
        Err(e) => println!("Failed to detect IP: {}", e),
    }

    match &config.cache_path {
        Some(path) => {
            let record = std::fs::read(path)
                .ok()
                .and_then(|bytes| CacheRecord::parse(&String::from_utf8_lossy(&bytes)));
            match record {
                Some(record) => println!("Cached IP:         {} (at {})", record.ip, record.timestamp),
                None => println!("Cached IP:         (empty)"),
            }
        }
        None => println!("Cached IP:         (caching disabled)"),
    }

    println!("\nTargets:");
    println!("--------");
    for target in &config.targets {
        match &target.domain {
            Some(domain) => {
                let domains: Vec<String> = domain.to_set().into_iter().collect();
                println!("  {}", godaddy_ddns::updater::describe(target.alias(), &domains));
            }
            None => println!("  {}.(missing domain)", target.alias()),
        }
    }

    Ok(())
}

async fn cmd_validate(config: Config) -> anyhow::Result<()> {
    println!("Validating configuration...\n");

    let credentials = config.credentials()?;
    let provider = GoDaddyConnector.connect(credentials, &config);

    print!("  {} ({}): ", provider.name(), config.api_base_url());
    let available = match provider.list_domains().await {
        Ok(domains) => {
            println!("OK, {} domain(s)", domains.len());
            domains
        }
        Err(e) => {
            println!("FAILED - {}", e);
            return Err(e.into());
        }
    };

    let mut unknown = BTreeSet::new();
    for (index, target) in config.targets.iter().enumerate() {
        let Some(domain) = &target.domain else {
            println!("  target {}: FAILED - missing 'domain'", index + 1);
            return Err(DdnsError::Config(format!("Target {} has no 'domain'", index + 1)).into());
        };
        let wanted = domain.to_set();
        let known: Vec<String> = wanted.intersection(&available).cloned().collect();
        unknown.extend(wanted.difference(&available).cloned());
        println!(
            "  target {}: {}",
            index + 1,
            godaddy_ddns::updater::describe(target.alias(), &known)
        );
    }

    println!();
    if unknown.is_empty() {
        println!("All target domains found.");
    } else {
        println!("Domains not on the account: {:?}", unknown);
    }

    Ok(())
}

fn cmd_example(toml: bool) -> anyhow::Result<()> {
    let example = Config::example();
    let rendered = if toml {
        example.to_toml()?
    } else {
        example.to_yaml()?
    };
    print!("{}", rendered);
    Ok(())
}
