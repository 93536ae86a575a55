use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem-backed [`Storage`] rooted at `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // 先寫暫存檔再改名，避免中斷時留下半個檔案
        let tmp_path = full_path.with_extension("tmp");
        fs::write(&tmp_path, data)?;
        fs::rename(tmp_path, full_path)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
pub use args::{CliConfig, Command, LogFormat};

#[cfg(feature = "cli")]
mod args {
    use clap::{Parser, Subcommand, ValueEnum};
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "parcel-track")]
    #[command(about = "Track parcels across Greek courier networks")]
    pub struct CliConfig {
        #[command(subcommand)]
        pub command: Command,

        #[arg(long, global = true, help = "Path to a TOML configuration file")]
        pub config: Option<PathBuf>,

        #[arg(long, global = true, help = "Override the history file location")]
        pub history_file: Option<PathBuf>,

        #[arg(long, global = true, value_enum, default_value = "compact")]
        pub log_format: LogFormat,

        #[arg(short, long, global = true, help = "Enable verbose output")]
        pub verbose: bool,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    pub enum LogFormat {
        Compact,
        Json,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// List all supported couriers
        List,
        /// Show which couriers a tracking number looks like
        Identify { tracking_number: String },
        /// Track a parcel; searches every plausible courier unless one is given
        Track {
            tracking_number: String,

            #[arg(short, long, help = "Courier name. If omitted, searches all.")]
            courier: Option<String>,

            #[arg(short, long = "json", help = "Output results as JSON instead of a table")]
            json: bool,

            #[arg(short, long, conflicts_with = "no_save", help = "Save to history without prompting")]
            save: bool,

            #[arg(long, help = "Do not save to history and do not prompt")]
            no_save: bool,
        },
        /// Show tracking history
        History,
        /// Remove a tracking number from history
        Forget { tracking_number: String },
        /// Assign an alias to a tracking number
        Rename {
            tracking_number: String,
            alias: String,
        },
        /// Track every saved parcel again and show its current status
        Refresh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_storage_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage.write_file("nested/history.json", b"[]").await.unwrap();
        let data = storage.read_file("nested/history.json").await.unwrap();

        assert_eq!(data, b"[]");
        assert!(!temp_dir.path().join("nested/history.tmp").exists());
    }

    #[tokio::test]
    async fn test_local_storage_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let err = storage.read_file("missing.json").await.unwrap_err();
        assert!(matches!(err, crate::utils::error::TrackError::IoError(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_parse_track_command() {
        use clap::Parser;

        let cli = CliConfig::parse_from(["parcel-track", "track", "RE123456789GR", "-c", "elta", "--json"]);
        match cli.command {
            Command::Track {
                tracking_number,
                courier,
                json,
                save,
                no_save,
            } => {
                assert_eq!(tracking_number, "RE123456789GR");
                assert_eq!(courier.as_deref(), Some("elta"));
                assert!(json);
                assert!(!save && !no_save);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_save_conflicts_with_no_save() {
        use clap::Parser;

        let result = CliConfig::try_parse_from(["parcel-track", "track", "123", "--save", "--no-save"]);
        assert!(result.is_err());
    }
}
