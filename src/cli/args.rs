//! CLI argument definitions using clap
//!
//! Commands:
//! - postboard serve [--backend supabase|memory]
//!
//! Every `serve` option can also come from the environment (or a `.env`
//! file loaded before parsing).

use clap::{Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

/// postboard - content backend for media posts and app settings
#[derive(Parser, Debug)]
#[command(name = "postboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP and WebSocket server
    Serve(ServeArgs),
}

/// Where rows and media objects live
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Supabase PostgREST tables and Storage bucket
    Supabase,
    /// Process-local maps, lost on exit
    Memory,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Storage backend
    #[arg(long, value_enum, env = "POSTBOARD_BACKEND", default_value = "supabase")]
    pub backend: Backend,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase service-role key
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub service_key: Option<String>,

    /// Storage bucket for uploaded media
    #[arg(long, env = "SUPABASE_BUCKET", default_value = "cms-files")]
    pub bucket: String,

    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Comma-separated allowed browser origins; unset allows all
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Host suffix of preview deployments that are always allowed; empty disables
    #[arg(long, env = "CORS_PREVIEW_SUFFIX", default_value = ".vercel.app")]
    pub cors_preview_suffix: String,

    /// Largest accepted upload body in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 100 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Seconds between WebSocket pings
    #[arg(long, env = "WS_HEARTBEAT_SECS", default_value_t = 30)]
    pub ws_heartbeat_secs: u64,

    /// Log output format (json or pretty)
    #[arg(long, env = "LOG_FORMAT", default_value = "json")]
    pub log_format: LogFormat,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
