use card_statement::args::{Args, Command};
use card_statement::{commands, Config, Mode, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().statement_home().path();

    // This allows for running the program without an HTML to PDF converter installed. When
    // STATEMENT_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::Live.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.sample_data())
            .await?
            .print(),

        Command::Generate(generate_args) => {
            let config = Config::load(home).await?;
            commands::generate(
                config,
                mode,
                generate_args.customer_id(),
                generate_args.language(),
                generate_args.limit(),
            )
            .await?
            .print()
        }

        Command::Serve(serve_args) => {
            let config = Config::load(home).await?;
            commands::serve(config, mode, serve_args.listen())
                .await?
                .print()
        }

        Command::Import(import_args) => {
            let config = Config::load(home).await?;
            commands::import(config, import_args.account_id(), import_args.file())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate and its library only.
            EnvFilter::new(format!(
                "card_statement={level},{}={level}",
                env!("CARGO_BIN_NAME")
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
