use std::cell::{Ref, RefCell};

use crate::{
    document::arena::{NodeId, RegionDocument},
    foundation::error::{RegionFillError, RegionFillResult},
    identity::{region::collect_regions, slug::CanonicalRegionId},
    inject::{
        apply::{FillReport, apply},
        bindings::{BindingResolver, ImageBindings, ImageRef, ImageSource},
        options::FillOptions,
    },
    interact::wiring::{RegionActivated, UiEvent, dispatch},
    shell::{
        catalog::{CountryCatalog, CountryEntry},
        state::{Action, AppState, Diagnostic, ViewState},
    },
    source::{loader::RegionSourceLoader, transport::Transport},
    store::{storage::KeyValueStorage, uploads::UploadStore},
};

/// Viewer session: opens countries, fills them, and keeps uploads in sync.
///
/// Single-threaded. State lives in [`RefCell`]s that are never borrowed across an `.await`, so
/// several `open_country` calls may be in flight at once; only the newest one is shown.
pub struct Shell<T, S> {
    loader: RegionSourceLoader<T>,
    catalog: CountryCatalog,
    fill: FillOptions,
    image_ext: String,
    use_index: bool,
    store: RefCell<UploadStore<S>>,
    state: RefCell<AppState>,
}

impl<T: Transport, S: KeyValueStorage> Shell<T, S> {
    /// Session with the default catalog and fill options, consulting availability indexes.
    pub fn new(transport: T, storage: S) -> Self {
        Self {
            loader: RegionSourceLoader::new(transport),
            catalog: CountryCatalog::default(),
            fill: FillOptions::default(),
            image_ext: "jpg".to_string(),
            use_index: true,
            store: RefCell::new(UploadStore::open(storage)),
            state: RefCell::new(AppState::default()),
        }
    }

    /// Replace the country catalog.
    pub fn with_catalog(mut self, catalog: CountryCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the fill options. `country_prefix` and `id_prefix` are set per country.
    pub fn with_fill(mut self, fill: FillOptions) -> Self {
        self.fill = fill;
        self
    }

    /// Toggle `index.json` lookups.
    pub fn with_use_index(mut self, use_index: bool) -> Self {
        self.use_index = use_index;
        self
    }

    /// Image extension for conventional image paths.
    pub fn with_image_ext(mut self, ext: impl Into<String>) -> Self {
        self.image_ext = ext.into();
        self
    }

    /// Current state snapshot. Do not hold across an `.await` on this shell.
    pub fn state(&self) -> Ref<'_, AppState> {
        self.state.borrow()
    }

    /// Country catalog in use.
    pub fn catalog(&self) -> &CountryCatalog {
        &self.catalog
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        self.loader.transport()
    }

    /// Upload store.
    pub fn uploads(&self) -> Ref<'_, UploadStore<S>> {
        self.store.borrow()
    }

    /// Open `country`: fetch its document, resolve bindings, fill, and show it.
    ///
    /// Returns `false` when a newer selection superseded this one before it finished, or when
    /// the result was a failure diagnostic.
    #[tracing::instrument(skip(self))]
    pub async fn open_country(&self, country: &str) -> bool {
        let code = self.catalog.normalize(country);
        let entry = self.catalog.lookup(&code);
        let generation = {
            let mut state = self.state.borrow_mut();
            state.dispatch(Action::SelectCountry {
                country: code.clone(),
                url: entry.document_url.clone(),
            });
            state.generation()
        };
        tracing::info!(%code, url = %entry.document_url, generation, "opening country");

        let action = match self.load(&code, &entry).await {
            Ok((document, report, remote)) => Action::DocumentLoaded {
                generation,
                country: code,
                document,
                report,
                remote,
            },
            Err(e) => {
                let diagnostic = Diagnostic::from_error(&entry.document_url, &e);
                tracing::warn!(%diagnostic, "country failed to load");
                Action::LoadFailed {
                    generation,
                    diagnostic,
                }
            }
        };
        let shown_document = matches!(action, Action::DocumentLoaded { .. });
        self.state.borrow_mut().dispatch(action) && shown_document
    }

    /// Close the open country.
    pub fn close(&self) {
        self.state.borrow_mut().dispatch(Action::CloseCountry);
    }

    /// Route a UI event on `target` of the open document; records and returns the activation.
    pub fn activate(&self, target: NodeId, event: &UiEvent) -> Option<RegionActivated> {
        let activated = {
            let state = self.state.borrow();
            dispatch(state.document()?, target, event)?
        };
        self.state
            .borrow_mut()
            .dispatch(Action::RegionActivated(activated.clone()));
        Some(activated)
    }

    /// Store a user image for `region` of the open country and refill.
    ///
    /// While the country is still loading the upload is accepted and shown once the document
    /// is ready. Once it is shown, `region` must name one of its regions.
    pub fn upload_image(
        &self,
        region: &CanonicalRegionId,
        label: &str,
        image: ImageRef,
    ) -> RegionFillResult<()> {
        let country = self.open_code()?;
        match self.state.borrow().view() {
            ViewState::Ready { report, .. } => {
                if region.is_empty() || report.region(region.as_str()).next().is_none() {
                    return Err(RegionFillError::validation(format!(
                        "'{country}' has no region '{region}'"
                    )));
                }
            }
            ViewState::Loading { .. } => {}
            ViewState::Idle | ViewState::Failed(_) => {
                return Err(RegionFillError::validation(format!(
                    "no document is shown for '{country}'"
                )));
            }
        }
        self.store
            .borrow_mut()
            .upsert(&country, region, label, image)?;
        tracing::info!(%country, %region, "upload stored");
        self.refill()
    }

    /// Remove the user image for `region` of the open country and refill.
    pub fn remove_image(&self, region: &CanonicalRegionId) -> RegionFillResult<bool> {
        let country = self.open_code()?;
        let removed = self.store.borrow_mut().remove(&country, region)?;
        if removed {
            self.refill()?;
        }
        Ok(removed)
    }

    /// Remove every stored upload and refill the open document.
    pub fn clear_uploads(&self) -> RegionFillResult<()> {
        self.store.borrow_mut().clear_all()?;
        self.refill()
    }

    fn open_code(&self) -> RegionFillResult<String> {
        self.state
            .borrow()
            .selected_country()
            .map(str::to_string)
            .ok_or_else(|| RegionFillError::validation("no country is open"))
    }

    fn fill_for(&self, entry: &CountryEntry) -> FillOptions {
        let mut fill = self.fill.clone();
        if fill.country_prefix.is_none() {
            fill.country_prefix = Some(entry.prefix.clone());
        }
        fill
    }

    async fn load(
        &self,
        code: &str,
        entry: &CountryEntry,
    ) -> RegionFillResult<(RegionDocument, FillReport, ImageBindings)> {
        let mut document = self.loader.fetch(&entry.document_url).await?;
        let fill = self.fill_for(entry);

        let uploaded = self.store.borrow().bindings_for(code);
        let ids: Vec<CanonicalRegionId> = collect_regions(&document, fill.id_prefix.as_deref())
            .into_iter()
            .map(|(_, ident)| ident.id)
            .filter(|id| !uploaded.contains_key(id))
            .collect();

        let source = entry
            .image_base
            .as_ref()
            .map(|base| ImageSource::new(base.as_str()).with_ext(self.image_ext.as_str()));
        let resolver = BindingResolver::new(self.loader.transport(), source);
        let index = if self.use_index {
            resolver.load_index().await
        } else {
            None
        };
        let remote = resolver
            .resolve(&ids, &ImageBindings::new(), index.as_ref())
            .await;

        // Uploads made while the index and probes were in flight count too.
        let mut bindings = remote.clone();
        bindings.extend(self.store.borrow().bindings_for(code));
        let report = apply(&mut document, &bindings, &fill);
        Ok((document, report, remote))
    }

    /// Re-apply remote bindings plus current uploads to the open document.
    fn refill(&self) -> RegionFillResult<()> {
        let (generation, country, mut document, remote) = {
            let state = self.state.borrow();
            match state.view() {
                ViewState::Ready {
                    country,
                    document,
                    remote,
                    ..
                } => (
                    state.generation(),
                    country.clone(),
                    document.clone(),
                    remote.clone(),
                ),
                _ => return Ok(()),
            }
        };

        let entry = self.catalog.lookup(&country);
        let fill = self.fill_for(&entry);
        let mut bindings = remote.clone();
        bindings.extend(self.store.borrow().bindings_for(&country));
        let report = apply(&mut document, &bindings, &fill);

        self.state.borrow_mut().dispatch(Action::DocumentLoaded {
            generation,
            country,
            document,
            report,
            remote,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shell/session.rs"]
mod tests;
