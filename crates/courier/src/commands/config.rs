//! Config command - configuration inspection.

use anyhow::Result;
use clap::{Args, Subcommand};
use courier_config::BridgeConfig;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration and where it came from
    Show,

    /// Show the default configuration file path
    Path,

    /// Print a config file with every default filled in
    Init,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(),
        ConfigCommand::Init => cmd_init(),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let config = redacted(&loaded.config);

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("# Courier Configuration\n");

    match loaded.source {
        Some(ref path) => println!("Config file: {}", path.display()),
        None => println!("No config file loaded (using defaults)"),
    }
    if let Some(ref path) = loaded.dotenv {
        println!(".env file:   {}", path.display());
    }
    if !loaded.env_overrides.is_empty() {
        println!("Environment: {}", loaded.env_overrides.join(", "));
    }
    println!();

    print!("{}", config.to_toml()?);
    Ok(())
}

fn cmd_path() -> Result<()> {
    match courier_config::xdg_config_path() {
        Some(path) => {
            let status = if path.is_file() { "exists" } else { "not found" };
            println!("{} ({})", path.display(), status);
        }
        None => println!("No config directory available on this platform"),
    }
    Ok(())
}

fn cmd_init() -> Result<()> {
    print!("{}", BridgeConfig::default().to_toml()?);
    Ok(())
}

/// Copy of `config` safe to print.
fn redacted(config: &BridgeConfig) -> BridgeConfig {
    let mut config = config.clone();
    if config.dapr_api_token.is_some() {
        config.dapr_api_token = Some("********".to_string());
    }
    config
}
