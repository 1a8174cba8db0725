use std::collections::BTreeSet;

use crate::{
    identity::slug::{CanonicalRegionId, resolve},
    source::{
        join_url,
        transport::{Method, Transport},
    },
};

/// Manifest of region ids known to have imagery under an image base.
///
/// Loading is all-or-nothing: a failed fetch or a malformed payload yields no index at all, so
/// callers fall back to per-region probing instead of trusting a partial set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AvailabilityIndex {
    ids: BTreeSet<CanonicalRegionId>,
}

impl AvailabilityIndex {
    /// Manifest file name under the image base.
    pub const FILE_NAME: &'static str = "index.json";

    /// Build from already-known ids (normalized through [`resolve`]).
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ids: ids
                .into_iter()
                .map(|s| resolve(s.as_ref()))
                .filter(|id| !id.is_empty())
                .collect(),
        }
    }

    /// Parse a manifest payload: a JSON array of strings. Anything else yields `None`.
    pub fn from_json(bytes: &[u8]) -> Option<Self> {
        let raw: Vec<String> = serde_json::from_slice(bytes).ok()?;
        Some(Self::from_ids(raw))
    }

    /// Fetch `<image_base>/index.json`.
    #[tracing::instrument(skip(transport))]
    pub async fn load<T: Transport + ?Sized>(transport: &T, image_base: &str) -> Option<Self> {
        let url = join_url(image_base, Self::FILE_NAME);
        let resp = match transport.request(Method::Get, &url).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(%url, error = %e, "availability index fetch failed; probing instead");
                return None;
            }
        };
        if !resp.is_success() {
            tracing::warn!(%url, status = resp.status, "availability index missing; probing instead");
            return None;
        }
        let index = Self::from_json(&resp.body);
        if index.is_none() {
            tracing::warn!(%url, "availability index malformed; probing instead");
        }
        index
    }

    /// `true` when `id` is listed.
    pub fn contains(&self, id: &CanonicalRegionId) -> bool {
        self.ids.contains(id)
    }

    /// Number of listed ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// `true` for an empty (but present) manifest.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Listed ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalRegionId> {
        self.ids.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/availability.rs"]
mod tests;
