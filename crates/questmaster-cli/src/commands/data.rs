use std::path::PathBuf;

use clap::Subcommand;
use questmaster_core::Config;

use super::open_session;

#[derive(Subcommand)]
pub enum DataAction {
    /// Write a JSON backup of all player data
    Export {
        /// Destination file ("-" for stdout). Defaults to
        /// questmaster-backup-<date>.json in the current directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace player data from a JSON backup
    Import {
        /// Backup file
        file: PathBuf,
        /// Confirm overwriting the current data
        #[arg(long)]
        yes: bool,
    },
    /// Delete all player data
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_session(config)?;

    match action {
        DataAction::Export { output } => {
            let bundle = app.export();
            let json = bundle.to_json_pretty()?;
            let path = output.unwrap_or_else(|| PathBuf::from(bundle.suggested_file_name()));
            if path.as_os_str() == "-" {
                println!("{json}");
            } else {
                std::fs::write(&path, json)?;
                println!("exported to {}", path.display());
            }
        }
        DataAction::Import { file, yes } => {
            if !yes {
                return Err("import overwrites current data; pass --yes to confirm".into());
            }
            let raw = std::fs::read_to_string(&file)?;
            let plan = app.import(&raw)?;
            if plan.is_empty() {
                println!("backup contained no player records");
            }
        }
        DataAction::Clear { yes } => {
            if !yes {
                return Err("clear deletes all data; pass --yes to confirm".into());
            }
            app.clear_all_data()?;
        }
    }
    Ok(())
}
