use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::{
    foundation::error::{RegionFillError, RegionFillResult},
    inject::options::FillOptions,
    shell::catalog::{CountryCatalog, CountryEntry},
};

/// Viewer configuration, usually read from a JSON file.
///
/// Every field is optional; missing fields take the defaults below. Country entries are merged
/// over the built-in catalog.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Extra or overriding catalog entries keyed by alpha-3 code.
    pub countries: BTreeMap<String, CountryEntry>,
    /// Extra ISO numeric aliases (`"250": "fra"`).
    pub numeric_codes: BTreeMap<String, String>,
    /// Fill settings (strategy, fallback color, ...).
    pub fill: FillOptions,
    /// Consult `<image_base>/index.json` before probing.
    pub use_index: bool,
    /// Image file extension used for `<image_base>/<id>.<ext>`.
    pub image_ext: String,
    /// Directory that site paths (`/regions/...`) resolve against.
    pub static_root: PathBuf,
    /// JSON file persisting user uploads; in-memory when unset.
    pub store_path: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            countries: BTreeMap::new(),
            numeric_codes: BTreeMap::new(),
            fill: FillOptions::default(),
            use_index: true,
            image_ext: "jpg".to_string(),
            static_root: PathBuf::from("public"),
            store_path: None,
        }
    }
}

impl ViewerConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RegionFillResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| RegionFillError::validation(format!("parse viewer config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RegionFillResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RegionFillError::validation(format!("open viewer config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject values no viewer can work with.
    pub fn validate(&self) -> RegionFillResult<()> {
        if self.image_ext.trim_start_matches('.').trim().is_empty() {
            return Err(RegionFillError::validation("image_ext must not be empty"));
        }
        if self.fill.fallback_fill.trim().is_empty() {
            return Err(RegionFillError::validation("fill.fallback_fill must not be empty"));
        }
        if let Some(stroke) = &self.fill.image_stroke
            && !(stroke.width.is_finite() && stroke.width >= 0.0)
        {
            return Err(RegionFillError::validation(
                "fill.image_stroke.width must be finite and >= 0",
            ));
        }
        for (code, entry) in &self.countries {
            if entry.document_url.trim().is_empty() {
                return Err(RegionFillError::validation(format!(
                    "countries.{code}.document_url must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Built-in catalog with this config's entries and aliases layered on top.
    pub fn catalog(&self) -> CountryCatalog {
        let mut catalog = CountryCatalog::default();
        for (code, entry) in &self.countries {
            catalog.insert(code, entry.clone());
        }
        for (numeric, alpha3) in &self.numeric_codes {
            catalog.insert_numeric(numeric, alpha3);
        }
        catalog
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shell/config.rs"]
mod tests;
