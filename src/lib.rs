// Passkeep - local encrypted password keeper
// Core library

pub mod commands;
pub mod config;
pub mod observability;
pub mod vault;

use std::sync::Arc;
use tokio::sync::Mutex;

use config::VaultConfig;
use vault::{PasswordVault, VaultResult};

pub type SharedState = Arc<Mutex<AppState>>;
pub struct AppState {
    pub vault: PasswordVault,
    pub config: VaultConfig,
}

impl AppState {
    pub async fn open(config: VaultConfig) -> VaultResult<Self> {
        let vault = PasswordVault::open(&config).await?;
        Ok(Self { vault, config })
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }
}

/// Resolves the config, starts logging and opens the vault
#[cfg(feature = "desktop")]
fn open_shared_state() -> VaultResult<SharedState> {
    let config = VaultConfig::load()?;
    observability::init_tracing(&config.log_dir());
    tauri::async_runtime::block_on(AppState::open(config)).map(AppState::into_shared)
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri::Manager;
    use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            match open_shared_state() {
                Ok(state) => {
                    app.manage(state);
                }
                Err(e) => {
                    // No console in release builds; the dialog is the only report.
                    tracing::error!(error = %e, "failed to open vault");
                    let handle = app.handle().clone();
                    app.dialog()
                        .message(e.to_string())
                        .title("Error")
                        .kind(MessageDialogKind::Error)
                        .show(move |_| handle.exit(1));
                }
            }
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::vault::save_credential,
            commands::vault::retrieve_credential,
            commands::vault::get_vault_info,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
