use std::sync::{Arc, PoisonError, RwLock};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, instrument, warn};

use crate::{
    error::WeatherError,
    model::{DisplayContent, WeatherRecord},
    repository::WeatherRepository,
    store::CityStore,
};

/// In-memory view of the most recent lookup.
#[derive(Debug, Default)]
struct ResolverState {
    current_record: Option<WeatherRecord>,
    last_searched_city: Option<String>,
}

/// Decides what to look up, runs the lookup and keeps the outcome.
///
/// `current_record` always reflects the fetch that completed last: a failure
/// clears it, a success replaces it.
#[derive(Debug)]
pub struct WeatherResolver {
    repository: Arc<dyn WeatherRepository>,
    city_store: Arc<dyn CityStore>,
    state: RwLock<ResolverState>,
}

impl WeatherResolver {
    pub fn new(repository: Arc<dyn WeatherRepository>, city_store: Arc<dyn CityStore>) -> Self {
        Self {
            repository,
            city_store,
            state: RwLock::new(ResolverState::default()),
        }
    }

    /// Fetch weather for `city`, or for the last searched city when `city` is
    /// absent or empty.
    #[instrument(skip(self))]
    pub async fn fetch_for_city(&self, city: Option<&str>) -> Result<WeatherRecord, WeatherError> {
        let target = match self.resolve_target(city) {
            Ok(target) => target,
            Err(e) => {
                self.update(|state| state.current_record = None);
                return Err(e);
            }
        };
        debug!(%target, "resolved lookup target");

        let result = self.repository.fetch_by_city(&target).await;

        match &result {
            // The store is written under the state guard so the persisted city
            // always belongs to the completion applied last.
            Ok(record) => self.update(|state| {
                state.current_record = Some(record.clone());
                state.last_searched_city = Some(target.clone());

                if let Err(e) = self.city_store.save_last_searched_city(&target) {
                    warn!("failed to persist last searched city: {e}");
                }
            }),
            Err(_) => self.update(|state| state.current_record = None),
        }

        result
    }

    fn resolve_target(&self, city: Option<&str>) -> Result<String, WeatherError> {
        match city.filter(|c| !c.is_empty()) {
            Some(city) => Ok(city.to_owned()),
            None => self
                .city_store
                .last_searched_city()?
                .ok_or(WeatherError::NoTarget),
        }
    }

    /// Fetch weather for a coordinate pair. Leaves the last searched city alone.
    #[instrument(skip(self))]
    pub async fn fetch_for_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherRecord, WeatherError> {
        let result = self.repository.fetch_by_coordinates(lat, lon).await;

        let current = result.as_ref().ok().cloned();
        self.update(|state| state.current_record = current);

        result
    }

    /// Run [`Self::fetch_for_city`] on the given runtime.
    pub fn spawn_fetch_for_city(
        self: &Arc<Self>,
        handle: &Handle,
        city: Option<String>,
    ) -> JoinHandle<Result<WeatherRecord, WeatherError>> {
        let resolver = Arc::clone(self);
        handle.spawn(async move { resolver.fetch_for_city(city.as_deref()).await })
    }

    /// Run [`Self::fetch_for_coordinates`] on the given runtime.
    pub fn spawn_fetch_for_coordinates(
        self: &Arc<Self>,
        handle: &Handle,
        lat: f64,
        lon: f64,
    ) -> JoinHandle<Result<WeatherRecord, WeatherError>> {
        let resolver = Arc::clone(self);
        handle.spawn(async move { resolver.fetch_for_coordinates(lat, lon).await })
    }

    /// Display projection of the current record, recomputed on every call.
    pub fn current_content(&self) -> Option<DisplayContent> {
        self.read().current_record.as_ref().map(DisplayContent::from_record)
    }

    pub fn current_record(&self) -> Option<WeatherRecord> {
        self.read().current_record.clone()
    }

    pub fn last_searched_city(&self) -> Option<String> {
        self.read().last_searched_city.clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ResolverState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut ResolverState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }
}
