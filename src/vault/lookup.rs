//! Lookup resolution
//!
//! Narrows the rows matched by a retrieve text down to one. When more than one
//! row matches, the user is asked for a service first (only if the matches span
//! several services) and then for a username. Each call gets the answers
//! collected so far and says what is still missing.

use crate::vault::credentials::StoredCredential;
use crate::vault::error::{VaultError, VaultResult};

pub const USERNAME_REQUIRED: &str = "Username field is required.";

/// Outcome of one resolution step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one row remains
    Found(StoredCredential),
    /// Nothing matches the text, or the answers ruled every match out
    NotFound,
    /// Matches span several services; ask which one
    NeedService { services: Vec<String> },
    /// Several usernames remain under one service; ask which one
    NeedUsername {
        service: String,
        usernames: Vec<String>,
    },
    /// The service prompt was answered with nothing
    Cancelled,
}

/// Resolves `rows` using the prompt answers given so far.
///
/// A blank service answer cancels quietly. A blank username answer is an
/// input error.
pub fn resolve(
    rows: Vec<StoredCredential>,
    service: Option<&str>,
    username: Option<&str>,
) -> VaultResult<Resolution> {
    if rows.len() <= 1 {
        return Ok(rows
            .into_iter()
            .next()
            .map(Resolution::Found)
            .unwrap_or(Resolution::NotFound));
    }

    let services = distinct(rows.iter().map(|r| r.service.as_str()));
    let (rows, chosen_service) = if services.len() > 1 {
        let Some(service) = service else {
            return Ok(Resolution::NeedService { services });
        };
        if service.is_empty() {
            return Ok(Resolution::Cancelled);
        }

        let mut filtered: Vec<_> = rows.into_iter().filter(|r| r.service == service).collect();
        match filtered.len() {
            0 => return Ok(Resolution::NotFound),
            1 => return Ok(Resolution::Found(filtered.remove(0))),
            _ => (filtered, service.to_string()),
        }
    } else {
        let only = services.into_iter().next().unwrap_or_default();
        (rows, only)
    };

    let Some(username) = username else {
        return Ok(Resolution::NeedUsername {
            service: chosen_service,
            usernames: distinct(rows.iter().map(|r| r.username.as_str())),
        });
    };
    if username.is_empty() {
        return Err(VaultError::missing_input(USERNAME_REQUIRED));
    }

    Ok(rows
        .into_iter()
        .find(|r| r.username == username)
        .map(Resolution::Found)
        .unwrap_or(Resolution::NotFound))
}

/// Distinct values in first-seen order
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.iter().any(|seen| seen == value) {
            out.push(value.to_string());
        }
    }
    out
}
