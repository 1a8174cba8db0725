//! Persisted user uploads, keyed by country and region.

pub(crate) mod storage;
pub(crate) mod uploads;
