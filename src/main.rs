use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use scale_ui_state::core::{Clock, FixedClock, JobsParams, SystemClock};
use scale_ui_state::{UiContext, UrlLocation, config, logging};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "scale-ui-state")]
#[command(about = "Inspect jobs list state carried in a URL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./scale-ui.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed state from a URL, apply overrides and print the synced URL
    Inspect(InspectArgs),
    /// Print the jobs parameters for a URL without a query string
    Defaults(OutputArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
struct InspectArgs {
    url: String,

    /// Parameter override as key=value (repeatable; order takes a comma list)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct OutputArgs {
    /// Evaluate date defaults at this RFC 3339 instant instead of now
    #[arg(long)]
    now: Option<String>,

    #[arg(long)]
    json: bool,
}

#[derive(Args, Serialize)]
struct ConfigArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    verbose: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    log_json: Option<bool>,

    #[serde(skip_serializing_if = "DefaultsArgs::is_empty")]
    #[command(flatten)]
    defaults: DefaultsArgs,
}

#[derive(Args, Serialize)]
struct DefaultsArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    page_size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    lookback_days: Option<u32>,
}

impl DefaultsArgs {
    fn is_empty(&self) -> bool {
        self.page_size.is_none() && self.lookback_days.is_none()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::AppConfig::new(cli.config.as_deref(), Some(&cli.overrides))
        .context("Failed to load configuration")?;
    logging::init(logging::LogConfig::from(&config));

    match &cli.command {
        Commands::Inspect(args) => run_inspect(config, args).context("Failed to inspect URL")?,
        Commands::Defaults(args) => run_defaults(config, args)?,
        Commands::Config => print!("{}", config.to_toml()?),
    }

    Ok(())
}

fn run_inspect(config: config::AppConfig, args: &InspectArgs) -> Result<()> {
    let location = UrlLocation::parse(&args.url)?;
    let clock = clock_for(args.output.now.as_deref())?;
    let ctx = UiContext::with_clock(config, location, clock.as_ref());

    let mut params = ctx.state.borrow().jobs_params().clone();
    for entry in &args.set {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", entry))?;
        params
            .apply(key.trim(), value)
            .with_context(|| format!("Invalid override '{}'", entry))?;
    }

    tracing::info!(overrides = args.set.len(), "Syncing jobs parameters to URL");
    ctx.state.borrow_mut().set_jobs_params(params);

    let state = ctx.state.borrow();
    print_report(
        Some(state.location().as_str()),
        state.jobs_params(),
        args.output.json,
    )
}

fn run_defaults(config: config::AppConfig, args: &OutputArgs) -> Result<()> {
    let clock = clock_for(args.now.as_deref())?;
    let params = JobsParams::defaults(clock.as_ref(), &config.defaults);
    print_report(None, &params, args.json)
}

fn clock_for(now: Option<&str>) -> Result<Box<dyn Clock>> {
    match now {
        Some(raw) => {
            let ts = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("Invalid --now timestamp '{}'", raw))?;
            Ok(Box::new(FixedClock(ts.with_timezone(&Utc))))
        }
        None => Ok(Box::new(SystemClock)),
    }
}

fn print_report(url: Option<&str>, params: &JobsParams, json: bool) -> Result<()> {
    if json {
        #[derive(Serialize)]
        struct Report<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            url: Option<&'a str>,
            jobs_params: &'a JobsParams,
        }

        let report = Report {
            url,
            jobs_params: params,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(url) = url {
        println!("URL: {}", url);
        println!();
    }
    for (key, value) in params.to_query() {
        println!("  {:<18} {}", key, value);
    }
    Ok(())
}
