//! Parsing of comma separated identifier lists from query strings.

use crate::domain::entities::AppId;
use crate::domain::error::DomainError;
use crate::domain::roster::Roster;

/// Split `raw` on commas, trim each entry and drop blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a non-empty list of identities, resolving roster names.
pub fn parse_identities(raw: Option<&str>, roster: &Roster) -> Result<Vec<String>, DomainError> {
    let entries = split_list(raw.unwrap_or_default());
    if entries.is_empty() {
        return Err(DomainError::validation("at least one user id is required"));
    }
    Ok(roster.resolve_all(entries.iter().map(String::as_str)))
}

/// Parse a non-empty list of numeric app ids.
pub fn parse_appids(raw: Option<&str>) -> Result<Vec<AppId>, DomainError> {
    let entries = split_list(raw.unwrap_or_default());
    if entries.is_empty() {
        return Err(DomainError::validation("at least one app id is required"));
    }
    entries
        .iter()
        .map(|entry| {
            entry
                .parse::<AppId>()
                .map_err(|_| DomainError::validation(format!("`{entry}` is not a valid app id")))
        })
        .collect()
}
