use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures::future::join_all;

use crate::{
    identity::slug::CanonicalRegionId,
    source::{availability::AvailabilityIndex, join_url, loader::probe_exists, transport::Transport},
};

/// Where a region's image lives.
///
/// Serialized as a single string; inline images become `data:<mime>;base64,...` URIs.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Any href the renderer can resolve (absolute URL, site path, non-base64 data URI).
    Url(String),
    /// Embedded payload.
    Inline {
        /// Media type, e.g. `image/png`.
        mime: String,
        /// Raw image bytes.
        bytes: Vec<u8>,
    },
}

impl ImageRef {
    /// Parse an href. Base64 `data:` URIs become [`ImageRef::Inline`].
    pub fn parse(href: &str) -> Self {
        parse_data_uri(href)
            .map(|(mime, bytes)| Self::Inline { mime, bytes })
            .unwrap_or_else(|| Self::Url(href.to_string()))
    }

    /// Inline reference from raw bytes.
    pub fn inline(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::Inline {
            mime: mime.into(),
            bytes,
        }
    }

    /// Value for an `href` attribute.
    pub fn to_href(&self) -> String {
        match self {
            Self::Url(u) => u.clone(),
            Self::Inline { mime, bytes } => data_uri(mime, bytes),
        }
    }

    /// `true` for embedded payloads.
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(u) => f.debug_tuple("Url").field(u).finish(),
            Self::Inline { mime, bytes } => f
                .debug_struct("Inline")
                .field("mime", mime)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_href())
    }
}

impl serde::Serialize for ImageRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_href())
    }
}

impl<'de> serde::Deserialize<'de> for ImageRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Encode bytes as a base64 `data:` URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Split a base64 `data:` URI into media type and bytes.
pub fn parse_data_uri(href: &str) -> Option<(String, Vec<u8>)> {
    let rest = href.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let mime = if mime.is_empty() { "application/octet-stream" } else { mime };
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(cleaned).ok()?;
    Some((mime.to_string(), bytes))
}

/// Region id to image, as read by the injector.
pub type ImageBindings = BTreeMap<CanonicalRegionId, ImageRef>;

/// Conventional per-region image location: `<base>/<id>.<ext>`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageSource {
    /// Directory or URL prefix holding the images (and `index.json`).
    pub base: String,
    /// File extension without the dot.
    #[serde(default = "ImageSource::default_ext")]
    pub ext: String,
}

impl ImageSource {
    /// Source with the default `jpg` extension.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            ext: Self::default_ext(),
        }
    }

    /// Override the file extension.
    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into().trim_start_matches('.').to_string();
        self
    }

    fn default_ext() -> String {
        "jpg".to_string()
    }

    /// Location of the image for `id`.
    pub fn href_for(&self, id: &CanonicalRegionId) -> String {
        join_url(&self.base, &format!("{id}.{}", self.ext))
    }
}

/// Decides which regions get which image.
///
/// Per region: explicit binding, then availability index membership, then a live probe when no
/// index is available. Without an [`ImageSource`] only explicit bindings apply.
pub struct BindingResolver<'a, T: ?Sized> {
    transport: &'a T,
    source: Option<ImageSource>,
}

impl<'a, T: Transport + ?Sized> BindingResolver<'a, T> {
    /// Resolver probing through `transport`.
    pub fn new(transport: &'a T, source: Option<ImageSource>) -> Self {
        Self { transport, source }
    }

    /// Configured image source.
    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    /// Load `index.json` next to the images; `None` without a source or when the manifest is
    /// unusable.
    pub async fn load_index(&self) -> Option<AvailabilityIndex> {
        let source = self.source.as_ref()?;
        AvailabilityIndex::load(self.transport, &source.base).await
    }

    /// Bindings for `regions`.
    ///
    /// Probes run concurrently and each only affects its own region. Empty ids are skipped.
    #[tracing::instrument(skip_all, fields(explicit = explicit.len(), indexed = index.is_some()))]
    pub async fn resolve<'r>(
        &self,
        regions: impl IntoIterator<Item = &'r CanonicalRegionId>,
        explicit: &ImageBindings,
        index: Option<&AvailabilityIndex>,
    ) -> ImageBindings {
        let wanted: BTreeSet<&CanonicalRegionId> =
            regions.into_iter().filter(|id| !id.is_empty()).collect();

        let mut out = ImageBindings::new();
        let mut to_probe = Vec::new();
        for id in wanted {
            if let Some(img) = explicit.get(id) {
                out.insert(id.clone(), img.clone());
                continue;
            }
            let Some(source) = &self.source else {
                continue;
            };
            let href = source.href_for(id);
            match index {
                Some(index) if index.contains(id) => {
                    out.insert(id.clone(), ImageRef::Url(href));
                }
                Some(_) => {}
                None => to_probe.push((id, href)),
            }
        }

        let probes = to_probe.iter().map(|(id, href)| async move {
            let found = probe_exists(self.transport, href).await;
            tracing::debug!(region = %id, %href, found, "probed region image");
            found
        });
        let results = join_all(probes).await;
        for ((id, href), found) in to_probe.into_iter().zip(results) {
            if found {
                out.insert(id.clone(), ImageRef::Url(href));
            }
        }

        tracing::debug!(bound = out.len(), "resolved image bindings");
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/inject/bindings.rs"]
mod tests;
