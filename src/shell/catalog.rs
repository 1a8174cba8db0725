use std::collections::BTreeMap;

/// Where a country's region document and imagery live.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CountryEntry {
    /// SVG (or GeoJSON) location.
    pub document_url: String,
    /// Prefix used for region element ids and generated artifact ids.
    pub prefix: String,
    /// Directory or URL prefix of per-region images.
    #[serde(default)]
    pub image_base: Option<String>,
    /// Name shown to users.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl CountryEntry {
    /// Conventional entry for an uncatalogued code: `/regions/<code>.svg`, no imagery.
    pub fn fallback(code: &str) -> Self {
        Self {
            document_url: format!("/regions/{code}.svg"),
            prefix: code.to_string(),
            image_base: None,
            display_name: None,
        }
    }

    fn builtin(code: &str, name: &str) -> Self {
        Self {
            document_url: format!("/regions/{code}_regions.svg"),
            prefix: code.to_string(),
            image_base: Some("/images/pref".to_string()),
            display_name: Some(name.to_string()),
        }
    }
}

/// Country code lookup: lowercase alpha-3 keys, with ISO numeric aliases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountryCatalog {
    entries: BTreeMap<String, CountryEntry>,
    numeric: BTreeMap<String, String>,
}

impl Default for CountryCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        catalog.insert("jpn", CountryEntry::builtin("jpn", "Japan"));
        catalog.insert("kor", CountryEntry::builtin("kor", "South Korea"));
        catalog.insert_numeric("392", "jpn");
        catalog.insert_numeric("410", "kor");
        catalog
    }
}

impl CountryCatalog {
    /// Catalog without any entries or aliases.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
            numeric: BTreeMap::new(),
        }
    }

    /// Add or replace the entry for `code`.
    pub fn insert(&mut self, code: &str, entry: CountryEntry) {
        self.entries.insert(code.trim().to_ascii_lowercase(), entry);
    }

    /// Alias ISO numeric `numeric` (e.g. `"392"`) to alpha-3 `alpha3`.
    pub fn insert_numeric(&mut self, numeric: &str, alpha3: &str) {
        self.numeric
            .insert(pad_numeric(numeric), alpha3.trim().to_ascii_lowercase());
    }

    /// Canonical key for a user-supplied code: lowercase alpha-3, numeric codes mapped through
    /// the alias table. Unknown numeric codes stay numeric.
    pub fn normalize(&self, code: &str) -> String {
        let code = code.trim();
        if !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()) {
            let padded = pad_numeric(code);
            return self.numeric.get(&padded).cloned().unwrap_or(padded);
        }
        code.to_ascii_lowercase()
    }

    /// Entry for `code` (any accepted spelling), or the conventional fallback.
    pub fn lookup(&self, code: &str) -> CountryEntry {
        let key = self.normalize(code);
        self.entries
            .get(&key)
            .cloned()
            .unwrap_or_else(|| CountryEntry::fallback(&key))
    }

    /// `true` when `code` has an explicit entry.
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(&self.normalize(code))
    }

    /// Catalogued codes, sorted.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn pad_numeric(code: &str) -> String {
    let trimmed = code.trim().trim_start_matches('0');
    format!("{trimmed:0>3}")
}

#[cfg(test)]
#[path = "../../tests/unit/shell/catalog.rs"]
mod tests;
