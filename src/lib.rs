//! regionfill paints images into the regions of SVG maps.
//!
//! A region document (an SVG, or an admin-1 GeoJSON converted on the fly) is fetched through a
//! [`Transport`], its fillable shapes are identified by [`CanonicalRegionId`], and [`apply`]
//! wires each region to its bound image with generated `<pattern>`, `<clipPath>` or `<mask>`
//! definitions:
//!
//! - Resolve which regions have imagery with a [`BindingResolver`]
//! - Fill the document with [`apply`]
//! - Route clicks and key presses back to regions with [`dispatch`]
//! - Drive the whole flow per country with a [`Shell`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod document;
pub(crate) mod geo;
pub(crate) mod identity;
pub(crate) mod inject;
pub(crate) mod interact;
pub(crate) mod render;
pub(crate) mod shell;
pub(crate) mod source;
pub(crate) mod store;

pub use crate::foundation::core::{Affine, BezPath, Point, Rect, ViewBox, fmt_num, parse_length};
pub use crate::foundation::error::{RegionFillError, RegionFillResult};

pub use crate::document::arena::{Attribute, Descendants, Element, NodeData, NodeId, RegionDocument};
pub use crate::document::{SVG_NS, XLINK_NS};
pub use crate::geo::admin1::{
    Admin1Options, Feature, FeatureCollection, Geometry, build_admin1_svg, pick_region_code,
    pick_region_name,
};
pub use crate::identity::region::{IdSource, RegionIdentity, collect_regions, region_identity};
pub use crate::identity::slug::{CanonicalRegionId, resolve};
pub use crate::inject::apply::{FillReport, RegionFill, apply, degrade_region};
pub use crate::inject::artifacts::{ARTIFACT_ATTR, IMAGE_LAYER_ID};
pub use crate::inject::bindings::{
    BindingResolver, ImageBindings, ImageRef, ImageSource, data_uri, parse_data_uri,
};
pub use crate::inject::geometry::{document_box, node_bounds, parse_transform, transform_between};
pub use crate::inject::options::{FillOptions, FillStrategy, ImageStroke};
pub use crate::interact::wiring::{
    HOVER_STYLE_ID, REGION_CLASS, REGION_CODE_ATTR, RegionActivated, UiEvent, bind_region, dispatch,
    ensure_hover_style, is_bound,
};
pub use crate::render::images::inline_images;
pub use crate::render::raster::{MAX_DIM, RasterImage, render_png};
pub use crate::shell::catalog::{CountryCatalog, CountryEntry};
pub use crate::shell::config::ViewerConfig;
pub use crate::shell::session::Shell;
pub use crate::shell::state::{Action, AppState, Diagnostic, ViewState};
pub use crate::source::availability::AvailabilityIndex;
pub use crate::source::join_url;
pub use crate::source::loader::{RegionSourceLoader, probe_exists};
pub use crate::source::transport::{
    DefaultTransport, HttpTransport, MemoryTransport, Method, StaticTransport, Transport,
    TransportError, TransportResponse, is_remote,
};
pub use crate::store::storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use crate::store::uploads::{RegionUpload, UPLOADS_KEY, UploadMap, UploadStore};
