use clap::{Parser, Subcommand};
use std::io::{self, BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;

use cuotas::config::{
    config_dir, connection_sources, load_config, load_config_or_default, mask_token,
    resolve_connection, Config, Source, CONFIG_TEMPLATE,
};
use cuotas::error::{AppError, Result};
use cuotas::live::{self, WatchOptions};
use cuotas::presenter::present;
use cuotas::render::to_text;
use cuotas::report::{report_url, ReportClient, ReportSource};
use cuotas::{Locale, LocaleFormatter, ReportScreen, Tab, ViewState};

#[derive(Parser)]
#[command(name = "cuotas")]
#[command(version, about = "CLI viewer for monthly maintenance payment reports", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.cuotas)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Base URL of the report service
    #[arg(long, env = "CUOTAS_API_URL", global = true)]
    api_url: Option<String>,

    /// Bearer token sent with the report request
    #[arg(long, env = "CUOTAS_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Display locale (es-MX or en-US)
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Show the resolved configuration
    Status,

    /// Fetch the report once and print it
    Show {
        /// Which list to print
        #[arg(short, long, value_enum, default_value_t = Tab::Unpaid)]
        tab: Tab,

        /// Print the decoded report as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Live report screen, re-fetched periodically (keys: p, u, r, q)
    Watch {
        /// List shown first
        #[arg(short, long, value_enum, default_value_t = Tab::Unpaid)]
        tab: Tab,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir, cli.api_url, cli.token, cli.locale),
        Commands::Show { tab, json } => {
            cmd_show(&cfg_dir, cli.api_url, cli.token, cli.locale, tab, json)
        }
        Commands::Watch { tab } => cmd_watch(&cfg_dir, cli.api_url, cli.token, cli.locale, tab),
    }
}

fn formatter(config: &Config, locale: Option<&str>) -> Result<LocaleFormatter> {
    let locale: Locale = locale.unwrap_or(&config.display.locale).parse()?;
    Ok(LocaleFormatter::new(
        locale,
        config.display.currency_symbol.clone(),
    ))
}

/// Initialize config directory with the template file
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(AppError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized cuotas config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Set the report service URL:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Provide the admin token:     export CUOTAS_TOKEN=<token>");
    println!();
    println!("Then open the report:");
    println!("  cuotas watch");

    Ok(())
}

/// Show the resolved configuration
fn cmd_status(
    cfg_dir: &Path,
    api_url: Option<String>,
    token: Option<String>,
    locale: Option<String>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(AppError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let config = load_config(cfg_dir)?;
    let fmt = formatter(&config, locale.as_deref())?;
    let ((url, url_source), (token, token_source)) =
        connection_sources(api_url, token, &config.api);

    println!("Report Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    match url {
        Some(url) => println!("Endpoint:         {} ({})", report_url(&url), url_source),
        None => println!("Endpoint:         {}", Source::Missing),
    }
    match token {
        Some(token) => println!("Token:            {} ({})", mask_token(&token), token_source),
        None => println!("Token:            {}", Source::Missing),
    }
    println!("Locale:           {}", fmt.locale());
    println!("Currency symbol:  {}", config.display.currency_symbol);
    println!("Refresh interval: {}s", config.refresh.interval_secs);
    if let Some(timeout) = config.api.timeout_secs {
        println!("Request timeout:  {}s", timeout);
    }

    Ok(())
}

/// Fetch the report once and print the selected list
fn cmd_show(
    cfg_dir: &Path,
    api_url: Option<String>,
    token: Option<String>,
    locale: Option<String>,
    tab: Tab,
    json: bool,
) -> Result<()> {
    let config = load_config_or_default(cfg_dir)?;
    let fmt = formatter(&config, locale.as_deref())?;
    let connection = resolve_connection(api_url, token, &config.api)?;
    let mut client = ReportClient::new(&connection);
    let view = ViewState::with_tab(tab);

    match client.fetch() {
        Ok(report) if json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Ok(report) => {
            print!("{}", to_text(&present(Some(&report), false, None, &view, &fmt), &fmt));
            Ok(())
        }
        Err(e) => {
            if !json {
                print!("{}", to_text(&present(None, false, Some(&e), &view, &fmt), &fmt));
            }
            Err(e.into())
        }
    }
}

/// Run the live report screen on stdin/stdout
fn cmd_watch(
    cfg_dir: &Path,
    api_url: Option<String>,
    token: Option<String>,
    locale: Option<String>,
    tab: Tab,
) -> Result<()> {
    let config = load_config_or_default(cfg_dir)?;
    let fmt = formatter(&config, locale.as_deref())?;
    let connection = resolve_connection(api_url, token, &config.api)?;
    let client = ReportClient::new(&connection);
    log::info!("watching {}", client.url());

    let mut screen =
        ReportScreen::new(client, tab).with_on_back(|| log::info!("leaving report screen"));
    let mut stdout = io::stdout();
    let options = WatchOptions {
        interval: Duration::from_secs(config.refresh.interval_secs.max(1)),
        clear: stdout.is_terminal(),
    };

    live::run(
        &mut screen,
        BufReader::new(io::stdin()),
        &mut stdout,
        &fmt,
        &options,
    )
}
