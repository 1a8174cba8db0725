//! Fetching region documents, availability manifests and per-region existence probes.

pub(crate) mod availability;
pub(crate) mod loader;
pub(crate) mod transport;

/// Join a base location and a relative tail with exactly one `/` between them.
pub fn join_url(base: &str, tail: &str) -> String {
    let base = base.trim_end_matches('/');
    let tail = tail.trim_start_matches('/');
    if base.is_empty() {
        return format!("/{tail}");
    }
    format!("{base}/{tail}")
}
