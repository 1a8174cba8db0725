use crate::{
    document::arena::RegionDocument,
    foundation::error::{RegionFillError, RegionFillResult},
    geo::admin1::{Admin1Options, FeatureCollection, build_admin1_svg},
    source::transport::{Method, Transport},
};

/// Fetches region documents (SVG, or GeoJSON converted on the fly) through a [`Transport`].
#[derive(Clone, Debug)]
pub struct RegionSourceLoader<T> {
    transport: T,
    geojson: Admin1Options,
}

impl<T: Transport> RegionSourceLoader<T> {
    /// Loader with default GeoJSON conversion options.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            geojson: Admin1Options::default(),
        }
    }

    /// Override how GeoJSON payloads are turned into documents.
    pub fn with_geojson_options(mut self, opts: Admin1Options) -> Self {
        self.geojson = opts;
        self
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch raw bytes, mapping non-2xx to `NotFound` and transport failures to `Network`.
    pub async fn fetch_bytes(&self, url: &str) -> RegionFillResult<Vec<u8>> {
        let resp = self
            .transport
            .request(Method::Get, url)
            .await
            .map_err(|e| RegionFillError::network(url, e.0))?;
        if !resp.is_success() {
            return Err(RegionFillError::not_found(url, resp.status));
        }
        Ok(resp.body)
    }

    /// Fetch and parse the region document at `url`.
    ///
    /// `.json`/`.geojson` locations and bodies starting with `{` are read as GeoJSON admin-1
    /// collections; everything else must be an SVG document.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> RegionFillResult<RegionDocument> {
        let bytes = self.fetch_bytes(url).await?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| RegionFillError::parse(url, format!("payload is not UTF-8: {e}")))?;

        let doc = if looks_like_geojson(url, text) {
            let fc = FeatureCollection::from_json(text.as_bytes(), url)?;
            build_admin1_svg(&fc, &self.geojson)?
        } else {
            RegionDocument::parse(text.trim_start_matches('\u{feff}'), url)?
        };

        tracing::info!(%url, nodes = doc.node_count(), "region document loaded");
        Ok(doc)
    }

    /// Existence check for a per-region image; see [`probe_exists`].
    pub async fn probe(&self, url: &str) -> bool {
        probe_exists(&self.transport, url).await
    }
}

/// `HEAD` first, `GET` when `HEAD` fails at the transport or answers non-2xx, `false` on any
/// remaining failure. Never errors.
pub async fn probe_exists<T: Transport + ?Sized>(transport: &T, url: &str) -> bool {
    match transport.request(Method::Head, url).await {
        Ok(resp) if resp.is_success() => return true,
        Ok(resp) => tracing::debug!(%url, status = resp.status, "HEAD probe negative, retrying GET"),
        Err(e) => tracing::debug!(%url, error = %e, "HEAD probe failed, retrying GET"),
    }
    match transport.request(Method::Get, url).await {
        Ok(resp) => resp.is_success(),
        Err(e) => {
            tracing::debug!(%url, error = %e, "GET probe failed");
            false
        }
    }
}

fn looks_like_geojson(url: &str, text: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    path.ends_with(".geojson")
        || path.ends_with(".json")
        || text.trim_start_matches('\u{feff}').trim_start().starts_with('{')
}

#[cfg(test)]
#[path = "../../tests/unit/source/loader.rs"]
mod tests;
