use clap::{CommandFactory, Parser, Subcommand};
use questmaster_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "questmaster-cli", version, about = "Questmaster CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quest management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Take a timed quiz
    Quiz,
    /// Player profile
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Dashboard statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Achievement catalog and progress
    Achievements {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export, import or clear saved data
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Notification and display preferences
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Local accounts
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Email reminders for urgent quests
    Remind,
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_logging(&config);

    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action, &config).await,
        Commands::Quiz => commands::quiz::run(&config).await,
        Commands::Profile { action } => commands::profile::run(action, &config),
        Commands::Stats { json } => commands::stats::run(json, &config),
        Commands::Achievements { json } => commands::stats::achievements(json, &config),
        Commands::Data { action } => commands::data::run(action, &config),
        Commands::Settings { action } => commands::settings::run(action, &config),
        Commands::Config { action } => commands::config::run(action),
        Commands::Account { action } => commands::account::run(action, &config).await,
        Commands::Remind => commands::remind::run(&config).await,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "questmaster-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
