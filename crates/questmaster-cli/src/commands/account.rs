use clap::Subcommand;
use questmaster_core::backend::{AccountRegistry, BackendClient};
use questmaster_core::{Config, SqliteStore};

use super::open_session;

#[derive(Subcommand)]
pub enum AccountAction {
    /// Create a local account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Repeat the password
        #[arg(long)]
        confirm: String,
    },
    /// Sign in and make the account's name and email the profile's
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List registered accounts
    List,
}

pub async fn run(action: AccountAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    let registry = AccountRegistry::new(&store);

    match action {
        AccountAction::Register {
            name,
            email,
            password,
            confirm,
        } => {
            let account = registry.register(&name, &email, &password, &confirm)?;
            println!("registered: {}", account.email);
            if config.backend.enabled {
                let client = BackendClient::from_config(&config.backend)?;
                match client.register(&name, &email, &password).await {
                    Ok(message) => println!("backend: {message}"),
                    Err(e) => tracing::warn!(error = %e, "backend registration failed"),
                }
            }
        }
        AccountAction::Login { email, password } => {
            let account = registry.login(&email, &password)?;
            if config.backend.enabled {
                let client = BackendClient::from_config(&config.backend)?;
                if let Err(e) = client.login(&email, &password).await {
                    tracing::warn!(error = %e, "backend login failed");
                }
            }
            let mut app = open_session(config)?;
            app.update_profile(&account.name, &account.email)?;
            println!("Welcome back, {}!", account.name);
        }
        AccountAction::List => {
            for account in registry.accounts()? {
                println!("{}  <{}>", account.name, account.email);
            }
        }
    }
    Ok(())
}
