//! Locale-keyed display text held on catalog definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Locale used when the requested one has no translation.
pub const PRIMARY_LOCALE: &str = "de";
const SECONDARY_LOCALE: &str = "en";

/// Immutable mapping from locale code to text.
///
/// Lookup falls back from `de-AT` to `de`, then to the primary and secondary
/// locales, then to any available translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new<I, L, T>(translations: I) -> Self
    where
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
        T: Into<String>,
    {
        Self(
            translations
                .into_iter()
                .map(|(locale, text)| (locale.into(), text.into()))
                .collect(),
        )
    }

    /// Text for `locale`, or an empty string when there are no translations.
    pub fn get(&self, locale: &str) -> &str {
        let language = locale.split(['-', '_']).next().unwrap_or(locale);
        [locale, language, PRIMARY_LOCALE, SECONDARY_LOCALE]
            .iter()
            .find_map(|candidate| self.0.get(*candidate))
            .or_else(|| self.0.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|text| text.trim().is_empty())
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
