use anyhow::Result;
use clap::Parser;
use hey_cli::{
    app::{self, OutputOptions},
    commands::{exit, parse_command, Command},
    config_editor,
    overrides::{Applied, Overrides},
    Theme,
};
use hey_core::{constants::endpoints, AppPaths, ConversationStore, Settings};
use std::process::ExitCode;

const DEBUG_ENV: &str = "HEY_DEBUG";

const AFTER_HELP: &str = "\
Examples:
  hey what is the capital of France
  hey and of Germany?
  hey clear
  hey config";

#[derive(Parser)]
#[command(name = "hey")]
#[command(about = "hey - DuckDuckGo AI Chat from the terminal")]
#[command(version, after_help = AFTER_HELP)]
struct Cli {
    /// Accept the DuckDuckGo AI Chat terms of use
    #[arg(long)]
    agree_tos: bool,

    /// Print debug logs
    #[arg(short, long)]
    verbose: bool,

    /// Don't show the progress line
    #[arg(short, long)]
    quiet: bool,

    /// System prompt for this question
    #[arg(short, long)]
    prompt: Option<String>,

    /// HTTP/HTTPS proxy URL
    #[arg(long, value_name = "URL")]
    proxy: Option<String>,

    /// SOCKS proxy URL (socks4, socks5, http or https)
    #[arg(long, value_name = "URL")]
    socks_proxy: Option<String>,

    /// Save --prompt and proxy settings to the config file
    #[arg(long)]
    save: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// The question, or `config` / `clear`
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,
}

fn init_logging(verbose: bool) {
    let debug = verbose || std::env::var_os(DEBUG_ENV).is_some();
    let filter = if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let theme = Theme::detect();
    let paths = AppPaths::from_env();
    let overrides = Overrides {
        prompt: cli.prompt,
        proxy: cli.proxy,
        socks_proxy: cli.socks_proxy,
        timeout_secs: cli.timeout,
        agree_tos: cli.agree_tos,
        save: cli.save,
    };
    if let Err(e) = overrides.validate() {
        eprintln!("{}", theme.error(&e.to_string()));
        return Ok(ExitCode::from(exit::REQUEST_FAILED));
    }

    let Applied {
        settings,
        tos_accepted,
    } = overrides.apply(&paths, Settings::load(&paths))?;
    if tos_accepted {
        println!("{}", theme.success("Terms of use accepted."));
    }

    let store = ConversationStore::from_paths(&paths);

    let code = match parse_command(&cli.query) {
        Command::Config => config_editor::run_config(&paths)?,
        Command::Clear => app::run_clear(&store)?,
        _ if !settings.tos => {
            eprintln!(
                "{}",
                theme.error("you must accept the DuckDuckGo AI Chat terms of use first.")
            );
            eprintln!("Read them at {} and run `hey --agree-tos`.", endpoints::TERMS_URL);
            exit::TOS_REQUIRED
        }
        Command::Empty if cli.agree_tos => exit::OK,
        Command::Empty => {
            eprintln!("{}", theme.error("no question given. Try `hey --help`."));
            exit::NO_QUERY
        }
        Command::Query(query) => {
            let options = OutputOptions { quiet: cli.quiet };
            app::run_query(&settings, &store, &query, options).await?
        }
    };

    Ok(ExitCode::from(code))
}
