use std::io::{self, BufRead, Write};

use clap::{Args, Subcommand};

use crate::config::{AppConfig, DEFAULT_API_BASE_URL, StoredConfig, config_file_path};
use crate::error::{AppError, AppResult};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration and the values in effect.
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    println!("Configuring nestqueue.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!();

    apply_prompt(
        &mut input,
        &mut output,
        &format!("Ticket API base URL (e.g., {DEFAULT_API_BASE_URL})"),
        &mut cfg.api_base_url,
    )?;
    apply_prompt(
        &mut input,
        &mut output,
        "Your email (used as the ticket creator)",
        &mut cfg.default_creator,
    )?;

    let mut timeout = cfg.request_timeout_secs.map(|secs| secs.to_string());
    apply_prompt(
        &mut input,
        &mut output,
        "Request timeout in seconds",
        &mut timeout,
    )?;
    cfg.request_timeout_secs = timeout
        .map(|raw| {
            raw.parse::<u64>().map_err(|_| {
                AppError::Configuration(format!("'{raw}' is not a whole number of seconds"))
            })
        })
        .transpose()?;

    AppConfig::resolve(cfg.clone(), |_| None)?;
    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let effective = AppConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("API base URL: {}", display_value(&cfg.api_base_url));
    println!("Default creator: {}", display_value(&cfg.default_creator));
    println!(
        "Request timeout: {}",
        display_value(&cfg.request_timeout_secs.map(|secs| format!("{secs}s")))
    );
    println!();
    println!("In effect (after environment overrides):");
    println!("API base URL: {}", effective.api_base_url);
    println!("Default creator: {}", effective.default_creator);
    println!(
        "Request timeout: {}",
        effective
            .request_timeout
            .map(|timeout| format!("{}s", timeout.as_secs()))
            .unwrap_or_else(|| "none".to_string())
    );

    Ok(())
}

fn apply_prompt(
    input: &mut impl BufRead,
    output: &mut impl Write,
    field: &str,
    target: &mut Option<String>,
) -> AppResult<()> {
    match prompt(input, output, field, target.as_deref())? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn prompt(
    input: &mut impl BufRead,
    output: &mut impl Write,
    field: &str,
    current: Option<&str>,
) -> AppResult<PromptAction> {
    match current {
        Some(value) => write!(output, "{field} [{value}] (Enter to keep, '-' to clear): ")?,
        None => write!(output, "{field} (Enter to skip): ")?,
    }
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let trimmed = line.trim();

    if trimmed.is_empty() {
        Ok(PromptAction::Keep)
    } else if trimmed == "-" {
        Ok(PromptAction::Clear)
    } else {
        Ok(PromptAction::Set(trimmed.to_string()))
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

enum PromptAction {
    Keep,
    Clear,
    Set(String),
}
