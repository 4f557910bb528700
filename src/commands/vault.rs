//! Vault Tauri Commands
//!
//! Commands behind the Save and Retrieve buttons. Each command forwards to a
//! plain async handler so the request/response contract works without a
//! webview.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
#[cfg(feature = "desktop")]
use tauri::State;
use tracing::instrument;

use crate::vault::{NewCredential, RetrieveQuery, Retrieval, SaveOutcome};
use crate::SharedState;

/// Response for the Save button
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub outcome: Option<SaveOutcome>,
    pub error: Option<String>,
}

/// Response for the Retrieve button and its follow-up prompts
#[derive(Debug, Serialize)]
pub struct RetrieveResponse {
    pub success: bool,
    pub result: Option<Retrieval>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VaultInfoResponse {
    pub data_dir: PathBuf,
    pub entries: i64,
}

/// Input for saving a credential
#[derive(Debug, Deserialize)]
pub struct SaveCredentialInput {
    pub service: String,
    pub username: String,
    pub password: String,
    /// Set once the user confirmed replacing an existing password
    #[serde(default)]
    pub overwrite: bool,
}

#[instrument(skip_all, fields(overwrite = input.overwrite))]
pub async fn handle_save(state: &SharedState, input: SaveCredentialInput) -> SaveResponse {
    let state = state.lock().await;
    let credential = NewCredential::new(input.service, input.username, input.password);

    match state.vault.save(&credential, input.overwrite).await {
        Ok(outcome) => SaveResponse {
            success: true,
            outcome: Some(outcome),
            error: None,
        },
        Err(e) => SaveResponse {
            success: false,
            outcome: None,
            error: Some(e.to_string()),
        },
    }
}

#[instrument(skip_all)]
pub async fn handle_retrieve(state: &SharedState, query: RetrieveQuery) -> RetrieveResponse {
    // Only the first step of a lookup waits; prompt answers reuse the same search.
    if query.service.is_none() && query.username.is_none() {
        let delay = state.lock().await.config.search_delay();
        tokio::time::sleep(delay).await;
    }

    let state = state.lock().await;
    match state.vault.retrieve(&query).await {
        Ok(result) => RetrieveResponse {
            success: true,
            result: Some(result),
            error: None,
        },
        Err(e) => RetrieveResponse {
            success: false,
            result: None,
            error: Some(e.to_string()),
        },
    }
}

pub async fn handle_vault_info(state: &SharedState) -> Result<VaultInfoResponse, String> {
    let state = state.lock().await;
    let entries = state
        .vault
        .storage()
        .count()
        .await
        .map_err(|e| e.to_string())?;

    Ok(VaultInfoResponse {
        data_dir: state.config.data_dir.clone(),
        entries,
    })
}

/// Saves a credential, or asks to overwrite an existing one
#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn save_credential(
    state: State<'_, SharedState>,
    input: SaveCredentialInput,
) -> Result<SaveResponse, String> {
    Ok(handle_save(state.inner(), input).await)
}

/// Looks up a credential by service or username
#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn retrieve_credential(
    state: State<'_, SharedState>,
    query: RetrieveQuery,
) -> Result<RetrieveResponse, String> {
    Ok(handle_retrieve(state.inner(), query).await)
}

/// Reports where the vault lives and how many entries it holds
#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn get_vault_info(state: State<'_, SharedState>) -> Result<VaultInfoResponse, String> {
    handle_vault_info(state.inner()).await
}
