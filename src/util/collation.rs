//! Locale-aware string ordering for display names.
//!
//! Names are compared with the Unicode root collation at tertiary strength.
//! Punctuation and symbols sort ahead of digits and digits ahead of letters.
//! Accents break ties between equal base letters and lowercase precedes
//! uppercase. The raw strings break any remaining tie so the ordering is
//! total.

use std::cmp::Ordering;

use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::{Collator, CollatorBorrowed, CollatorPreferences};
use tracing::warn;

/// Root-locale collator, built once per sort.
pub struct NameCollator {
    collator: Option<CollatorBorrowed<'static>>,
}

impl NameCollator {
    pub fn new() -> Self {
        let mut options = CollatorOptions::default();
        options.strength = Some(Strength::Tertiary);

        let collator = match Collator::try_new(CollatorPreferences::default(), options) {
            Ok(collator) => Some(collator),
            Err(err) => {
                warn!(
                    target: "gknight::collation",
                    error = %err,
                    "root collation unavailable, ordering by code point"
                );
                None
            }
        };
        Self { collator }
    }

    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        self.collator
            .as_ref()
            .map_or(Ordering::Equal, |collator| collator.compare(left, right))
            .then_with(|| left.cmp(right))
    }
}

impl Default for NameCollator {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare two strings the way a default-locale collator would for
/// user-facing lists.
pub fn compare(left: &str, right: &str) -> Ordering {
    NameCollator::new().compare(left, right)
}
