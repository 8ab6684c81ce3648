// snowai/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snowai")]
#[command(about = "Resolves and inspects snowflake-ai application configuration", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub source: ConfigSource,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where configuration is read from. Without either flag the usual
/// locations are probed, ending with the bundled default.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSource {
    /// Directory whose *.toml files are merged
    #[arg(long, global = true, env = "SNOWAI_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Single configuration file (relative to --config-dir when given)
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ✅ Loads and resolves the configuration, reporting the first error
    Validate,

    /// 📋 Lists apps, connects and pipeline flows
    List,

    /// 🔎 Shows one fully resolved app (ex: "group0.app1" or "app1")
    Show {
        app: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// 🔑 Reports which environment variables an app needs and whether they are set
    CheckEnv {
        app: String,

        /// Exit with error if any variable is missing
        #[arg(long)]
        strict: bool,
    },

    /// 🧱 Writes the bundled default app_config.toml
    Init {
        /// Target directory
        #[arg(long, default_value = "snowflake_ai/conf")]
        dir: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
