use crate::config::AppConfig;
use crate::core::Translator;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ayat-bot")]
#[command(about = "Verse lookup and daily verse broadcast service")]
pub struct CliArgs {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override source.base_url
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override broadcast.period_secs
    #[arg(long)]
    pub period_secs: Option<u64>,

    /// Disable the periodic broadcast
    #[arg(long)]
    pub no_broadcast: bool,

    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Mode {
    /// Run the console transport and the broadcast scheduler (default)
    Serve,
    /// Look up a single verse and exit
    Lookup {
        /// Reference in surah:ayah form, e.g. 2:67
        reference: String,

        /// Translator slug (kuliev, osmanov, porohova)
        #[arg(short, long)]
        translator: Option<Translator>,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
}

impl CliArgs {
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(base_url) = &self.base_url {
            tracing::info!("🔧 source.base_url overridden to: {}", base_url);
            config.source.base_url = base_url.clone();
        }
        if let Some(period) = self.period_secs {
            tracing::info!("🔧 broadcast.period_secs overridden to: {}", period);
            config.broadcast.period_secs = period;
        }
        if self.no_broadcast {
            config.broadcast.enabled = false;
        }
    }
}
