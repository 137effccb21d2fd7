use std::sync::Arc;

use crate::adapters::key_stores::directory_key_store::DirectoryKeyStore;
use crate::adapters::server::{self, AppState, ServerSettings};
use crate::cli::context::RunContext;
use crate::cli::output;
use crate::core::errors::{DirectoryError, Result};

/// Execute the `webkey serve` command.
///
/// Runs the WKD/VKS/HKP lookup server over the key store until Ctrl-C.
pub fn execute(bind: Option<&str>, ctx: &RunContext) -> Result<()> {
    let bind = bind.unwrap_or(&ctx.config.server.bind).to_string();
    let root = ctx.storage_root().to_path_buf();

    if !ctx.quiet {
        output::header(&format!("{}: serving keys", ctx.config.app.name));
        if !root.is_dir() {
            output::warning(&format!(
                "Storage {} does not exist yet, run 'webkey sync' first",
                root.display()
            ));
        }
        output::detail("storage", &root.display().to_string());
        output::detail("address", &format!("http://{bind}"));
    }

    let state = Arc::new(AppState {
        store: Arc::new(DirectoryKeyStore::new(root)),
        settings: ServerSettings {
            app_name: ctx.config.app.name.clone(),
            key_extension: ctx.config.app.key_extension.clone(),
        },
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| DirectoryError::ServerError {
            detail: format!("failed to start async runtime: {e}"),
        })?;

    runtime.block_on(server::serve(&bind, state))
}
