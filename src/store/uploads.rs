use std::collections::BTreeMap;

use crate::{
    foundation::error::{RegionFillError, RegionFillResult},
    identity::slug::CanonicalRegionId,
    inject::bindings::{ImageBindings, ImageRef},
    store::storage::KeyValueStorage,
};

/// Storage key of the uploads blob.
pub const UPLOADS_KEY: &str = "uploads_by_country";

/// One user-provided region image.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionUpload {
    /// Image href or inline payload.
    pub image_ref: ImageRef,
    /// Region label at upload time.
    #[serde(default)]
    pub label: String,
}

/// `country -> region -> upload`.
pub type UploadMap = BTreeMap<String, BTreeMap<CanonicalRegionId, RegionUpload>>;

/// User uploads persisted as a single JSON blob under [`UPLOADS_KEY`].
///
/// Every mutation rewrites the whole blob. Country codes are stored lowercase.
#[derive(Debug)]
pub struct UploadStore<S> {
    storage: S,
    uploads: UploadMap,
}

impl<S: KeyValueStorage> UploadStore<S> {
    /// Load the blob from `storage`. A missing, unreadable or unparsable blob reads as empty.
    pub fn open(storage: S) -> Self {
        let uploads = match storage.get(UPLOADS_KEY) {
            Ok(Some(blob)) => serde_json::from_str::<UploadMap>(&blob).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unparsable uploads blob");
                UploadMap::new()
            }),
            Ok(None) => UploadMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "uploads storage unreadable; starting empty");
                UploadMap::new()
            }
        };
        Self { storage, uploads }
    }

    /// Add or replace the upload for `region`.
    pub fn upsert(
        &mut self,
        country: &str,
        region: &CanonicalRegionId,
        label: &str,
        image_ref: ImageRef,
    ) -> RegionFillResult<()> {
        let country = country_key(country)?;
        if region.is_empty() {
            return Err(RegionFillError::validation("cannot store an upload for an empty region id"));
        }
        let mut next = self.uploads.clone();
        next.entry(country).or_default().insert(
            region.clone(),
            RegionUpload {
                image_ref,
                label: label.to_string(),
            },
        );
        self.commit(next)
    }

    /// Drop the upload for `region`. Returns whether one existed.
    pub fn remove(&mut self, country: &str, region: &CanonicalRegionId) -> RegionFillResult<bool> {
        let country = country_key(country)?;
        if !self
            .uploads
            .get(&country)
            .is_some_and(|regions| regions.contains_key(region))
        {
            return Ok(false);
        }
        let mut next = self.uploads.clone();
        if let Some(regions) = next.get_mut(&country) {
            regions.remove(region);
            if regions.is_empty() {
                next.remove(&country);
            }
        }
        self.commit(next)?;
        Ok(true)
    }

    /// Forget every upload of every country.
    pub fn clear_all(&mut self) -> RegionFillResult<()> {
        self.storage.remove(UPLOADS_KEY)?;
        self.uploads.clear();
        Ok(())
    }

    /// Uploads of `country` as injector bindings.
    pub fn bindings_for(&self, country: &str) -> ImageBindings {
        self.uploads_for(country)
            .map(|regions| {
                regions
                    .iter()
                    .map(|(id, up)| (id.clone(), up.image_ref.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Uploads of `country`, if any.
    pub fn uploads_for(&self, country: &str) -> Option<&BTreeMap<CanonicalRegionId, RegionUpload>> {
        self.uploads.get(&country.trim().to_ascii_lowercase())
    }

    /// Countries holding at least one upload, sorted.
    pub fn countries_with_uploads(&self) -> Vec<&str> {
        self.uploads
            .iter()
            .filter(|(_, regions)| !regions.is_empty())
            .map(|(c, _)| c.as_str())
            .collect()
    }

    /// Backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Write `next` to storage, then make it current. A failed write leaves memory unchanged.
    fn commit(&mut self, next: UploadMap) -> RegionFillResult<()> {
        let blob = serde_json::to_string(&next)
            .map_err(|e| RegionFillError::storage(format!("serialize uploads: {e}")))?;
        self.storage.set(UPLOADS_KEY, &blob)?;
        tracing::debug!(countries = next.len(), bytes = blob.len(), "uploads persisted");
        self.uploads = next;
        Ok(())
    }
}

fn country_key(country: &str) -> RegionFillResult<String> {
    let key = country.trim().to_ascii_lowercase();
    if key.is_empty() {
        return Err(RegionFillError::validation("country code must not be empty"));
    }
    Ok(key)
}

#[cfg(test)]
#[path = "../../tests/unit/store/uploads.rs"]
mod tests;
