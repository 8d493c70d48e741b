//! Named group members and identity resolution.
//!
//! A roster maps friendly names to catalog identities so callers can ask for
//! `brandon,rudy` instead of raw account numbers. Anything that is not a known
//! name passes through untouched.

use std::collections::BTreeMap;

use super::error::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: BTreeMap<String, String>,
}

impl Roster {
    /// Build a roster from `(name, identity)` pairs.
    ///
    /// Names are trimmed and lowercased. Blank names, blank identities and
    /// names that collide after normalization are rejected.
    pub fn from_entries<I, N, V>(entries: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let mut members = BTreeMap::new();
        for (name, identity) in entries {
            let key = normalize_name(name.as_ref());
            if key.is_empty() {
                return Err(DomainError::validation("roster name must not be blank"));
            }
            let identity = identity.as_ref().trim();
            if identity.is_empty() {
                return Err(DomainError::validation(format!(
                    "roster entry `{key}` has no identity"
                )));
            }
            if members.insert(key.clone(), identity.to_string()).is_some() {
                return Err(DomainError::validation(format!(
                    "roster name `{key}` is listed more than once"
                )));
            }
        }
        Ok(Self { members })
    }

    /// Map a roster name to its identity, or return the token unchanged.
    pub fn resolve(&self, token: &str) -> String {
        let token = token.trim();
        self.members
            .get(&normalize_name(token))
            .cloned()
            .unwrap_or_else(|| token.to_string())
    }

    pub fn resolve_all<'a>(&self, tokens: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        tokens.into_iter().map(|token| self.resolve(token)).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
