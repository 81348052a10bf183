//! ISO 639 language resolution.
//!
//! # Design
//! The catalog is an embedded JSON dataset keyed by ISO 639-2 code, parsed
//! once into `LanguageCatalog` and held in a `OnceLock`. At load time three
//! indexes are built so every lookup is a single map access:
//!
//! - ISO 639-2 code (terminological, plus the bibliographic alias) → record
//! - ISO 639-1 code → ISO 639-2 code
//! - lowercased English name → ISO 639-2 code
//!
//! A query resolves by trying those indexes in that order. There is no fuzzy
//! matching and no normalization other than lowercasing for names.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::types::BlobMetadata;

const ISO_639_CATALOG: &str = include_str!("../data/iso639.json");

static CATALOG: OnceLock<Arc<LanguageCatalog>> = OnceLock::new();

/// One language of the ISO 639 catalog.
///
/// `names` maps a language tag (`"en"`, `"de"`, `"fr"`, ...) to the names
/// of this language written in that language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRecord {
    #[serde(rename = "639-1", default, skip_serializing_if = "Option::is_none")]
    pub code2: Option<String>,
    #[serde(rename = "639-2")]
    pub code3: String,
    #[serde(rename = "639-2/B", default, skip_serializing_if = "Option::is_none")]
    pub code3_bibliographic: Option<String>,
    #[serde(rename = "wikiUrl", default, skip_serializing_if = "Option::is_none")]
    pub wiki_url: Option<String>,
    #[serde(flatten)]
    pub names: BTreeMap<String, Vec<String>>,
}

impl LanguageRecord {
    /// First English name, used as the display name.
    pub fn english_name(&self) -> Option<&str> {
        first_name(&self.names, "en")
    }

    /// Name of the language in itself, falling back to the English name when
    /// the catalog has no list under the record's own ISO 639-1 tag.
    pub fn native_name(&self) -> Option<&str> {
        self.code2
            .as_deref()
            .and_then(|tag| first_name(&self.names, tag))
            .or_else(|| self.english_name())
    }

    /// Upload metadata for this language, or `None` when the record lacks a
    /// 3-letter code or an English name.
    pub fn metadata(&self) -> Option<BlobMetadata> {
        if self.code3.is_empty() {
            return None;
        }
        let name = self.english_name()?;
        let native_name = self.native_name().unwrap_or(name);
        Some(BlobMetadata {
            name: name.to_string(),
            short_name: self.code3.clone(),
            native_name: native_name.to_string(),
        })
    }
}

fn first_name<'a>(names: &'a BTreeMap<String, Vec<String>>, tag: &str) -> Option<&'a str> {
    names
        .get(tag)
        .and_then(|list| list.first())
        .map(String::as_str)
        .filter(|name| !name.is_empty())
}

/// Immutable, indexed ISO 639 catalog.
#[derive(Debug, Clone, Default)]
pub struct LanguageCatalog {
    records: BTreeMap<String, LanguageRecord>,
    by_bibliographic: HashMap<String, String>,
    by_code2: HashMap<String, String>,
    by_english_name: HashMap<String, String>,
}

impl LanguageCatalog {
    /// The embedded ISO 639 catalog, parsed on first use.
    pub fn iso639() -> &'static LanguageCatalog {
        Self::embedded()
    }

    /// Shared handle to the embedded catalog.
    pub fn iso639_shared() -> Arc<LanguageCatalog> {
        Arc::clone(Self::embedded())
    }

    fn embedded() -> &'static Arc<LanguageCatalog> {
        CATALOG.get_or_init(|| {
            Arc::new(
                LanguageCatalog::from_json(ISO_639_CATALOG)
                    .expect("embedded ISO 639 catalog must be valid"),
            )
        })
    }

    /// Parse a catalog from a JSON object of records keyed by ISO 639-2 code.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let records: BTreeMap<String, LanguageRecord> = serde_json::from_str(raw)?;
        Ok(Self::from_records(records.into_values()))
    }

    /// Build the indexes. Records are keyed by their own `code3`; when two
    /// records share an English name the one with the smaller code wins.
    pub fn from_records(records: impl IntoIterator<Item = LanguageRecord>) -> Self {
        let records: BTreeMap<String, LanguageRecord> = records
            .into_iter()
            .map(|record| (record.code3.clone(), record))
            .collect();

        let mut by_bibliographic = HashMap::new();
        let mut by_code2 = HashMap::new();
        let mut by_english_name = HashMap::new();
        for (code3, record) in &records {
            if let Some(code) = &record.code3_bibliographic {
                by_bibliographic.entry(code.clone()).or_insert_with(|| code3.clone());
            }
            if let Some(code) = &record.code2 {
                by_code2.entry(code.clone()).or_insert_with(|| code3.clone());
            }
            for name in record.names.get("en").into_iter().flatten() {
                by_english_name
                    .entry(name.to_lowercase())
                    .or_insert_with(|| code3.clone());
            }
        }

        Self {
            records,
            by_bibliographic,
            by_code2,
            by_english_name,
        }
    }

    /// Resolve a 2-letter code, 3-letter code or English name to the
    /// canonical ISO 639-2 code.
    pub fn resolve_code(&self, query: &str) -> Option<&str> {
        if let Some((code3, _)) = self.records.get_key_value(query) {
            return Some(code3.as_str());
        }
        self.by_bibliographic
            .get(query)
            .or_else(|| self.by_code2.get(query))
            .or_else(|| self.by_english_name.get(&query.to_lowercase()))
            .map(String::as_str)
    }

    /// Resolve a query to its full catalog record.
    pub fn resolve_record(&self, query: &str) -> Option<&LanguageRecord> {
        self.resolve_code(query).and_then(|code3| self.records.get(code3))
    }

    /// Exact lookup by ISO 639-2 code.
    pub fn get(&self, code3: &str) -> Option<&LanguageRecord> {
        self.records.get(code3)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Resolve `query` against the embedded catalog. See
/// [`LanguageCatalog::resolve_code`].
pub fn resolve_code(query: &str) -> Option<&'static str> {
    LanguageCatalog::iso639().resolve_code(query)
}

/// Resolve `query` to a record of the embedded catalog.
pub fn resolve_record(query: &str) -> Option<&'static LanguageRecord> {
    LanguageCatalog::iso639().resolve_record(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_catalog_loads() {
        let catalog = LanguageCatalog::iso639();
        assert!(catalog.len() >= 480);
        assert!(catalog.iter().all(|record| record.english_name().is_some()));
    }

    #[test]
    fn languages_without_two_letter_code_resolve() {
        for (query, code) in [
            ("akk", "akk"),
            ("ang", "ang"),
            ("grc", "grc"),
            ("tlh", "tlh"),
            ("mul", "mul"),
            ("und", "und"),
            ("Akkadian", "akk"),
            ("Gothic", "got"),
            ("Klingon", "tlh"),
            ("sumerian", "sux"),
            ("Greek, Ancient (to 1453)", "grc"),
        ] {
            assert_eq!(resolve_code(query), Some(code), "{query}");
        }
        let gothic = resolve_record("got").unwrap();
        assert_eq!(gothic.code2, None);
        assert_eq!(gothic.native_name(), Some("Gothic"));
    }

    #[test]
    fn three_letter_codes_resolve_to_themselves() {
        for code in ["eng", "fra", "deu", "nld", "slk", "tur"] {
            assert_eq!(resolve_code(code), Some(code));
        }
    }

    #[test]
    fn two_letter_codes_translate() {
        assert_eq!(resolve_code("en"), Some("eng"));
        assert_eq!(resolve_code("de"), Some("deu"));
        assert_eq!(resolve_code("zh"), Some("zho"));
    }

    #[test]
    fn bibliographic_codes_map_to_terminological() {
        assert_eq!(resolve_code("ger"), Some("deu"));
        assert_eq!(resolve_code("fre"), Some("fra"));
    }

    #[test]
    fn english_names_match_case_insensitively() {
        assert_eq!(resolve_code("English"), Some("eng"));
        assert_eq!(resolve_code("german"), Some("deu"));
        assert_eq!(resolve_code("FLEMISH"), Some("nld"));
    }

    #[test]
    fn unknown_queries_do_not_resolve() {
        for query in ["Englisch", "Cimpress", "", "Engl", "ENG"] {
            assert_eq!(resolve_code(query), None, "{query}");
        }
    }

    #[test]
    fn resolve_record_returns_full_entry() {
        let german = resolve_record("German").unwrap();
        assert_eq!(german.code2.as_deref(), Some("de"));
        assert_eq!(german.code3, "deu");
        assert_eq!(german.code3_bibliographic.as_deref(), Some("ger"));
        assert_eq!(german.names["de"], ["Deutsch"]);
        assert_eq!(german.names["fr"], ["allemand"]);
        assert_eq!(
            german.wiki_url.as_deref(),
            Some("https://en.wikipedia.org/wiki/German_language")
        );
    }

    #[test]
    fn native_name_falls_back_to_english() {
        assert_eq!(resolve_record("deu").unwrap().native_name(), Some("Deutsch"));
        assert_eq!(resolve_record("fra").unwrap().native_name(), Some("français"));
        // the catalog carries no Spanish-language names
        assert_eq!(resolve_record("spa").unwrap().native_name(), Some("Spanish"));
    }

    #[test]
    fn metadata_requires_english_name() {
        let catalog = LanguageCatalog::from_json(
            &json!({
                "xxa": {"639-2": "xxa", "en": ["Example"], "xa": ["Ignored"]},
                "xxb": {"639-2": "xxb", "de": ["Nur Deutsch"]}
            })
            .to_string(),
        )
        .unwrap();

        let meta = catalog.resolve_record("xxa").unwrap().metadata().unwrap();
        assert_eq!(meta.name, "Example");
        assert_eq!(meta.short_name, "xxa");
        assert_eq!(meta.native_name, "Example");

        assert!(catalog.resolve_record("xxb").unwrap().metadata().is_none());
    }

    #[test]
    fn first_record_wins_on_name_collision() {
        let catalog = LanguageCatalog::from_json(
            &json!({
                "bbb": {"639-2": "bbb", "en": ["Shared"]},
                "aaa": {"639-2": "aaa", "en": ["Shared"]}
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(catalog.resolve_code("shared"), Some("aaa"));
    }

    #[test]
    fn record_round_trips_dataset_keys() {
        let english = resolve_record("eng").unwrap();
        let json = serde_json::to_value(english).unwrap();
        assert_eq!(
            json,
            json!({
                "639-1": "en",
                "639-2": "eng",
                "de": ["Englisch"],
                "en": ["English"],
                "fr": ["anglais"],
                "wikiUrl": "https://en.wikipedia.org/wiki/English_language"
            })
        );
    }
}
