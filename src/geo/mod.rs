//! GeoJSON admin-1 collections to region SVG documents.
//!
//! Regions come out as `<path class="region">` elements with a stable `id="adm1-<CODE>"`,
//! `data-iso` and `data-name`, inside `<g id="regions">`, ready for the fill injector.

pub(crate) mod admin1;
pub(crate) mod projection;
