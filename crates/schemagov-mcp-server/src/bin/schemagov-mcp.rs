use anyhow::{Context, Result};
use atty::Stream;
use clap::{Parser, Subcommand};
use colored::Colorize;
use rmcp::ServiceExt;
use schemagov_mcp_core::{ConfigManager, SchemaGovConfig};
use schemagov_mcp_server::SchemaGovMcpServer;
use schemagov_mcp_tools::{SchemaGovToolExecutor, ToolOutcome};
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::EnvFilter;

const LOCAL_CONFIG_FILE: &str = "schemagov.toml";

#[derive(Parser)]
#[command(
    name = "schemagov-mcp",
    version,
    author,
    about = "schema.gov.it MCP server - explore Italian public-administration ontologies over SPARQL",
    long_about = "Exposes the schema.gov.it SPARQL endpoint as a catalogue of MCP tools (ontologies, controlled vocabularies, DCAT-AP_IT datasets, quality checks) for AI agents."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(long, global = true, help = "Configuration file path")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Start MCP server with specified transport")]
    Start {
        #[command(subcommand)]
        transport: TransportType,
    },

    #[command(about = "Invoke a single tool and print its text result")]
    Call {
        #[arg(help = "Tool name, e.g. search_concepts")]
        tool: String,

        #[arg(long, help = "Tool arguments as a JSON object", default_value = "{}")]
        args: String,
    },

    #[command(about = "List the available tools")]
    Tools {
        #[arg(long, help = "Print full tool schemas as JSON")]
        json: bool,
    },

    #[command(about = "Inspect the usage log")]
    Usage {
        #[command(subcommand)]
        action: UsageAction,
    },

    #[command(about = "Manage configuration")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum TransportType {
    #[command(about = "Serve MCP over stdin/stdout")]
    Stdio,

    #[cfg(feature = "server-http")]
    #[command(about = "Serve MCP over streamable HTTP")]
    Http {
        #[arg(long, help = "Host to bind (overrides SCHEMAGOV_HTTP_HOST)")]
        host: Option<String>,

        #[arg(short, long, help = "Port to bind (overrides SCHEMAGOV_HTTP_PORT)")]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum UsageAction {
    #[command(about = "Summarize tool calls, errors and last activity")]
    Analyze,
    #[command(about = "Suggest new tools from recurring raw queries")]
    Suggest,
}

#[derive(Subcommand)]
enum ConfigAction {
    #[command(about = "Show the effective configuration")]
    Show {
        #[arg(long, help = "Print as JSON")]
        json: bool,
    },
    #[command(about = "Write an example configuration file")]
    Init {
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
        #[arg(long, help = "Write to ~/.schemagov/config.toml instead of ./schemagov.toml")]
        global: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.clone());
    let config = ConfigManager::load_config(config_path.clone())
        .context("Failed to load configuration")?;

    let stdio = matches!(
        cli.command,
        Commands::Start {
            transport: TransportType::Stdio
        }
    );
    if stdio {
        init_file_logging(&config, cli.verbose)?;
    } else {
        init_stderr_logging(&config, cli.verbose);
    }

    if let Some(path) = &config_path {
        info!("Using configuration file {}", path.display());
    }

    match cli.command {
        Commands::Start { transport } => handle_start(transport, &config).await?,
        Commands::Call { tool, args } => handle_call(&config, &tool, &args).await?,
        Commands::Tools { json } => handle_tools(json)?,
        Commands::Usage { action } => handle_usage(&config, action).await?,
        Commands::Config { action } => handle_config(&config, action)?,
    }

    Ok(())
}

/// `--config`, then ./schemagov.toml, then ~/.schemagov/config.toml
fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    global_config_path().filter(|p| p.exists())
}

fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".schemagov").join("config.toml"))
}

fn env_filter(config: &SchemaGovConfig, verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.server.log_level))
}

fn init_stderr_logging(config: &SchemaGovConfig, verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config, verbose))
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(Stream::Stderr))
        .try_init()
        .ok();
}

/// stdout carries the MCP protocol, so diagnostics go to .schemagov/logs/mcp-server.log
fn init_file_logging(config: &SchemaGovConfig, verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".schemagov")
        .join("logs");
    std::fs::create_dir_all(&log_dir).context("Failed to create .schemagov/logs")?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "mcp-server.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config, verbose))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .with_line_number(true)
        .try_init()
        .ok();

    // Flushes for the whole process lifetime
    std::mem::forget(guard);
    Ok(())
}

async fn handle_start(transport: TransportType, config: &SchemaGovConfig) -> Result<()> {
    let server =
        SchemaGovMcpServer::from_config(config).context("Failed to initialize MCP server")?;
    info!("{}", ConfigManager::get_config_summary(config));

    match transport {
        TransportType::Stdio => {
            if atty::is(Stream::Stderr) {
                eprintln!(
                    "{}",
                    "Starting schema.gov.it MCP server (stdio)...".green().bold()
                );
            }

            let service = server
                .serve(rmcp::transport::stdio())
                .await
                .map_err(|e| anyhow::anyhow!("MCP server startup failed: {}", e))?;

            info!("MCP server running on stdio");

            service
                .waiting()
                .await
                .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
        }
        #[cfg(feature = "server-http")]
        TransportType::Http { host, port } => {
            use schemagov_mcp_server::{start_http_server, HttpServerConfig};

            let http_config = HttpServerConfig::from_env().with_overrides(host, port);

            if atty::is(Stream::Stderr) {
                eprintln!(
                    "{}",
                    format!(
                        "Starting schema.gov.it MCP server on http://{}/mcp",
                        http_config.bind_address()
                    )
                    .green()
                    .bold()
                );
            }

            start_http_server(server, http_config)
                .await
                .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;
        }
    }

    Ok(())
}

fn executor(config: &SchemaGovConfig) -> Result<SchemaGovToolExecutor> {
    SchemaGovToolExecutor::from_config(config).context("Failed to initialize tool executor")
}

fn print_outcome(outcome: &ToolOutcome) {
    if outcome.is_error {
        eprintln!("{}", outcome.text.red());
    } else {
        println!("{}", outcome.text);
    }
}

async fn handle_call(config: &SchemaGovConfig, tool: &str, args: &str) -> Result<()> {
    let arguments: JsonValue =
        serde_json::from_str(args).context("--args must be a JSON object")?;

    let outcome = executor(config)?.execute_by_name(tool, arguments).await;
    print_outcome(&outcome);

    if outcome.is_error {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_tools(json: bool) -> Result<()> {
    let schemas = SchemaGovToolExecutor::get_tool_schemas();

    if json {
        println!("{}", serde_json::to_string_pretty(&schemas)?);
        return Ok(());
    }

    println!("{}", "Available tools:".green().bold());
    for schema in schemas {
        println!("  {}  {}", schema.name.cyan(), schema.description);
    }
    Ok(())
}

async fn handle_usage(config: &SchemaGovConfig, action: UsageAction) -> Result<()> {
    let executor = executor(config)?;
    let outcome = match action {
        UsageAction::Analyze => executor.analyze_usage().await,
        UsageAction::Suggest => executor.suggest_new_tools().await,
    };
    print_outcome(&outcome);
    Ok(())
}

fn handle_config(config: &SchemaGovConfig, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("{}", ConfigManager::get_config_summary(config));
            }
        }
        ConfigAction::Init { force, global } => {
            let path = if global {
                global_config_path()
                    .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
            } else {
                PathBuf::from(LOCAL_CONFIG_FILE)
            };

            if path.exists() && !force {
                println!(
                    "⚠️  Configuration file already exists: {}",
                    path.display()
                );
                println!("   Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, ConfigManager::generate_example_config())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Created config file: {}", path.display());
        }
    }
    Ok(())
}
