use std::collections::BTreeSet;

use futures::future::join_all;

use crate::{
    document::arena::{NodeId, RegionDocument},
    identity::slug::CanonicalRegionId,
    inject::{
        apply::{FillReport, degrade_region},
        bindings::{data_uri, parse_data_uri},
        options::FillOptions,
    },
    source::transport::{Method, Transport},
};

/// Replace every generated image href with a validated `data:` URI.
///
/// Remote and site-relative hrefs are fetched through `transport`. A payload that cannot be
/// fetched or decoded degrades its region to the fallback fill; the remaining regions are still
/// processed. Returns the degraded region ids in document order.
#[tracing::instrument(skip_all, fields(regions = report.regions.len()))]
pub async fn inline_images<T: Transport + ?Sized>(
    doc: &mut RegionDocument,
    transport: &T,
    report: &FillReport,
    opts: &FillOptions,
) -> Vec<CanonicalRegionId> {
    let mut targets: Vec<(NodeId, CanonicalRegionId, String)> = Vec::new();
    let mut seen = BTreeSet::new();
    for region in report.filled() {
        let Some(image) = region.image else {
            continue;
        };
        if !seen.insert(image) {
            continue;
        }
        let Some(href) = doc.attr(image, "href").map(str::to_string) else {
            continue;
        };
        targets.push((image, region.id.clone(), href));
    }

    let payloads = join_all(
        targets
            .iter()
            .map(|(_, _, href)| load_payload(transport, href)),
    )
    .await;

    let mut failed = Vec::new();
    for ((image, id, href), payload) in targets.into_iter().zip(payloads) {
        let checked = payload.and_then(|bytes| {
            let format = image::guess_format(&bytes).map_err(|e| e.to_string())?;
            image::load_from_memory_with_format(&bytes, format).map_err(|e| e.to_string())?;
            Ok(data_uri(format.to_mime_type(), &bytes))
        });
        match checked {
            Ok(uri) => {
                doc.set_attr(image, "href", uri.as_str());
                doc.set_attr(image, "xlink:href", uri);
                tracing::debug!(region = %id, %href, "image inlined");
            }
            Err(reason) => {
                tracing::warn!(region = %id, %href, %reason, "region image unusable");
                degrade_region(doc, &id, opts);
                failed.push(id);
            }
        }
    }
    failed
}

async fn load_payload<T: Transport + ?Sized>(transport: &T, href: &str) -> Result<Vec<u8>, String> {
    if href.starts_with("data:") {
        return parse_data_uri(href)
            .map(|(_, bytes)| bytes)
            .ok_or_else(|| "unsupported data URI".to_string());
    }
    let resp = transport
        .request(Method::Get, href)
        .await
        .map_err(|e| e.to_string())?;
    if !resp.is_success() {
        return Err(format!("HTTP {}", resp.status));
    }
    Ok(resp.body)
}

#[cfg(test)]
#[path = "../../tests/unit/render/images.rs"]
mod tests;
