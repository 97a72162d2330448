use clap::{Parser, Subcommand};
use pomodoro_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod desktop;

#[derive(Parser)]
#[command(name = "pomodoro", version, about = "Pomodoro timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer in the foreground
    Run(commands::run::RunArgs),
    /// Print the current timer state as JSON
    Status,
    /// Timer durations and auto-start behaviour
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Task group management
    Group {
        #[command(subcommand)]
        action: commands::group::GroupAction,
    },
    /// Focus statistics
    Stats(commands::stats::StatsArgs),
    /// Completed sessions, most recent last
    History(commands::history::HistoryArgs),
    /// Background preference
    Background {
        #[command(subcommand)]
        action: commands::background::BackgroundAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("POMODORO_LOG")
        .unwrap_or_else(|_| EnvFilter::new(Config::load().logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Status => commands::run::status(),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Group { action } => commands::group::run(action),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::History(args) => commands::history::run(args),
        Commands::Background { action } => commands::background::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
