//! CLI command implementations

use std::sync::Arc;

use tracing::info;

use crate::http_server::config::parse_origin_list;
use crate::http_server::{Backends, HttpServer, HttpServerConfig};
use crate::observability;
use crate::store::{MemoryBlobStore, MemoryRecordStore, SupabaseClient, SupabaseConfig};

use super::args::{Backend, Command, ServeArgs};
use super::errors::{CliError, CliResult};

/// Dispatch a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Serve(args) => serve(args),
    }
}

/// Resolve server settings from the parsed arguments
pub fn server_config(args: &ServeArgs) -> HttpServerConfig {
    let suffix = args.cors_preview_suffix.trim();
    HttpServerConfig {
        host: args.host.clone(),
        port: args.port,
        cors_origins: args
            .cors_origin
            .as_deref()
            .map(parse_origin_list)
            .unwrap_or_default(),
        cors_preview_suffix: (!suffix.is_empty()).then(|| suffix.to_string()),
        max_upload_bytes: args.max_upload_bytes,
        ws_heartbeat_secs: args.ws_heartbeat_secs,
        ..HttpServerConfig::default()
    }
}

/// Build the store collaborators for the selected backend
pub fn build_backends(args: &ServeArgs) -> CliResult<Backends> {
    match args.backend {
        Backend::Memory => {
            let records = Arc::new(MemoryRecordStore::new());
            let base = format!(
                "http://{}:{}/storage/v1/object/public/{}",
                args.host, args.port, args.bucket
            );
            Ok(Backends {
                posts: records.clone(),
                settings: records,
                blobs: Arc::new(MemoryBlobStore::new(base)),
            })
        }
        Backend::Supabase => {
            let url = required(&args.supabase_url, "SUPABASE_URL")?;
            let key = required(&args.service_key, "SUPABASE_SERVICE_ROLE_KEY")?;
            let client = SupabaseClient::new(SupabaseConfig::new(url, key, args.bucket.clone()))?;
            Ok(Backends::shared(Arc::new(client)))
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> CliResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CliError::config_error(format!("{} is required for the supabase backend", name)))
}

/// Start the HTTP server and block until shutdown
pub fn serve(args: ServeArgs) -> CliResult<()> {
    observability::init(args.log_format);

    let config = server_config(&args);
    let backends = build_backends(&args)?;
    info!(
        backend = ?args.backend,
        bucket = %args.bucket,
        origins = config.cors_origins.len(),
        "starting postboard"
    );

    let server = HttpServer::new(config, backends);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}
