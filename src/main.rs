//! gemini-bridge: Gemini completions with textual tool calling.
//!
//! Usage:
//!   gemini-bridge complete "<prompt>"   Run one completion with builtin tools
//!   gemini-bridge tools                 List builtin tools
//!   gemini-bridge init                  Write a default config file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use gemini_bridge::config::{self, BridgeConfig};
use gemini_bridge::tools;
use gemini_bridge::{Completion, CompletionAdapter, GenerationOptions, ToolRegistry};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "gemini-bridge")]
#[command(version = "0.1.0")]
#[command(about = "Gemini completions with textual tool calling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (default: ~/.gemini-bridge/config.toml).
    #[arg(long)]
    config: Option<String>,

    /// Log level (debug, info, warn, error). Overrides the config file.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single completion.
    Complete {
        /// Prompt text.
        prompt: String,

        /// Do not offer any tools to the model.
        #[arg(long)]
        no_tools: bool,

        /// Working directory for the python tool and relative file reads.
        #[arg(long)]
        project_root: Option<String>,

        /// Log tool and provider failures.
        #[arg(long)]
        verbose: bool,

        /// Sampling temperature.
        #[arg(long)]
        temperature: Option<f64>,

        /// Maximum output tokens.
        #[arg(long)]
        max_tokens: Option<u32>,
    },

    /// List builtin tools.
    Tools,

    /// Write a default config file.
    Init,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()))
        .unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?
        .with_env_overrides();

    // Initialize logging
    let level = cli.log_level.clone().unwrap_or_else(|| cfg.log_level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Complete {
            prompt,
            no_tools,
            project_root,
            verbose,
            temperature,
            max_tokens,
        } => {
            let mut cfg = cfg;
            if let Some(root) = project_root {
                cfg.project_root = root;
            }
            cfg.verbose |= verbose;
            let options = GenerationOptions {
                temperature,
                max_output_tokens: max_tokens,
                ..Default::default()
            };
            cmd_complete(&cfg, &prompt, no_tools, &options).await
        }
        Commands::Tools => cmd_tools(&cfg),
        Commands::Init => cmd_init(&cfg, &config_path),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_complete(
    cfg: &BridgeConfig,
    prompt: &str,
    no_tools: bool,
    options: &GenerationOptions,
) -> Result<()> {
    let tool_list = if no_tools {
        Vec::new()
    } else {
        tools::builtin_tools(cfg)
    };

    let adapter = match CompletionAdapter::from_config(cfg, tool_list) {
        Ok(adapter) => adapter,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("    {}", hint);
            }
            std::process::exit(1);
        }
    };

    match adapter.complete(prompt, options).await? {
        Completion::Text(result) => {
            println!("{}", result.text);
            if result.tool_calls + result.tool_failures > 0 {
                eprintln!(
                    "{} {} tool call(s), {} failed",
                    ">>>".green().bold(),
                    result.tool_calls,
                    result.tool_failures,
                );
            }
        }
        Completion::Raw(response) => {
            eprintln!("{} Model returned no text.", "<<<".yellow().bold());
            if let Some(reason) = response.block_reason() {
                eprintln!("    Blocked: {}", reason.red());
            }
            if let Some(finish) = response.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
                eprintln!("    Finish reason: {}", finish);
            }
        }
    }

    Ok(())
}

fn cmd_tools(cfg: &BridgeConfig) -> Result<()> {
    let registry = ToolRegistry::new(tools::builtin_tools(cfg))?;

    println!();
    println!("{}", "=== Builtin Tools ===".bold());
    println!();
    for tool in registry.iter() {
        println!(
            "  {} ({})",
            tool.name().bold(),
            tool.handler().kind().dimmed()
        );
        println!("    {}", tool.description());
    }
    println!();

    Ok(())
}

fn cmd_init(cfg: &BridgeConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    // Never persist a key that only came from the environment.
    let defaults = BridgeConfig {
        api_key: String::new(),
        ..cfg.clone()
    };
    config::save_config(&defaults, config_path)?;
    println!("{} Wrote {}", ">>>".green().bold(), config_path.display());
    Ok(())
}
