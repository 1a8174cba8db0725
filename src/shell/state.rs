use std::fmt;

use crate::{
    document::arena::RegionDocument,
    foundation::error::RegionFillError,
    inject::{apply::FillReport, bindings::ImageBindings},
    interact::wiring::RegionActivated,
};

/// User-visible description of a document-level failure.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    /// Location that was attempted.
    pub url: String,
    /// HTTP status when the server answered.
    pub status: Option<u16>,
    /// Error text.
    pub message: String,
}

impl Diagnostic {
    /// Diagnostic for a failed load of `url`.
    pub fn from_error(url: &str, err: &RegionFillError) -> Self {
        Self {
            url: err.url().unwrap_or(url).to_string(),
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "could not load '{}' (HTTP {status}): {}", self.url, self.message),
            None => write!(f, "could not load '{}': {}", self.url, self.message),
        }
    }
}

/// What the viewer currently shows.
#[derive(Clone, Debug)]
pub enum ViewState {
    /// No country open.
    Idle,
    /// A document fetch is in flight.
    Loading {
        /// Country being opened.
        country: String,
        /// Document location.
        url: String,
    },
    /// A filled document is on screen.
    Ready {
        /// Open country.
        country: String,
        /// The filled document.
        document: RegionDocument,
        /// Result of the last fill.
        report: FillReport,
        /// Bindings from the index or probes, before uploads are layered on top.
        remote: ImageBindings,
    },
    /// The document could not be loaded.
    Failed(Diagnostic),
}

/// State transitions. [`AppState::dispatch`] is the only way to change an [`AppState`].
#[derive(Clone, Debug)]
pub enum Action {
    /// Start opening `country`; supersedes any load in flight.
    SelectCountry {
        /// Normalized country code.
        country: String,
        /// Document location.
        url: String,
    },
    /// Close the open country; in-flight loads become stale.
    CloseCountry,
    /// A load (or refill) finished.
    DocumentLoaded {
        /// Generation the load was started under.
        generation: u64,
        /// Country it belongs to.
        country: String,
        /// The filled document.
        document: RegionDocument,
        /// Fill outcome.
        report: FillReport,
        /// Bindings from the index or probes.
        remote: ImageBindings,
    },
    /// A load failed.
    LoadFailed {
        /// Generation the load was started under.
        generation: u64,
        /// What went wrong.
        diagnostic: Diagnostic,
    },
    /// A region of the open document was activated.
    RegionActivated(RegionActivated),
}

/// Owned application state: selection, load generation, and view.
#[derive(Clone, Debug)]
pub struct AppState {
    selected_country: Option<String>,
    selected_region: Option<RegionActivated>,
    generation: u64,
    view: ViewState,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            selected_country: None,
            selected_region: None,
            generation: 0,
            view: ViewState::Idle,
        }
    }
}

impl AppState {
    /// Apply `action`. Returns `false` when it was ignored (stale generation, nothing open).
    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::SelectCountry { country, url } => {
                self.generation += 1;
                self.selected_country = Some(country.clone());
                self.selected_region = None;
                self.view = ViewState::Loading { country, url };
                true
            }
            Action::CloseCountry => {
                self.generation += 1;
                self.selected_country = None;
                self.selected_region = None;
                self.view = ViewState::Idle;
                true
            }
            Action::DocumentLoaded {
                generation,
                country,
                document,
                report,
                remote,
            } => {
                if generation != self.generation {
                    tracing::warn!(generation, current = self.generation, %country, "discarding stale document");
                    return false;
                }
                self.view = ViewState::Ready {
                    country,
                    document,
                    report,
                    remote,
                };
                true
            }
            Action::LoadFailed {
                generation,
                diagnostic,
            } => {
                if generation != self.generation {
                    tracing::warn!(generation, current = self.generation, "discarding stale load failure");
                    return false;
                }
                self.view = ViewState::Failed(diagnostic);
                true
            }
            Action::RegionActivated(ev) => {
                if !matches!(self.view, ViewState::Ready { .. }) {
                    return false;
                }
                self.selected_region = Some(ev);
                true
            }
        }
    }

    /// Selected country code.
    pub fn selected_country(&self) -> Option<&str> {
        self.selected_country.as_deref()
    }

    /// Last activated region.
    pub fn selected_region(&self) -> Option<&RegionActivated> {
        self.selected_region.as_ref()
    }

    /// Current load generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current view.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Open document, when ready.
    pub fn document(&self) -> Option<&RegionDocument> {
        match &self.view {
            ViewState::Ready { document, .. } => Some(document),
            _ => None,
        }
    }

    /// Fill report of the open document, when ready.
    pub fn report(&self) -> Option<&FillReport> {
        match &self.view {
            ViewState::Ready { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Failure shown instead of a document.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match &self.view {
            ViewState::Failed(d) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shell/state.rs"]
mod tests;
