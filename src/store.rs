//! In-memory recipe list state for a front-end to drive.
//!
//! The store owns the current list, the active filter and the per-recipe
//! image states. Every refresh replaces the list wholesale and starts a new
//! generation; image fetches remember the generation they were issued under
//! and their results are dropped if the list has been replaced since.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::client::RecipeClient;
use crate::config::AppConfig;
use crate::error::FetchError;
use crate::filter::FilterConfig;
use crate::images::{ImageLoader, ImageSize, ImageState};
use crate::model::Recipe;
use crate::sort::{self, SortOrder};

#[derive(Debug, Default)]
struct ItemImages {
    small: ImageState,
    large: ImageState,
}

impl ItemImages {
    fn get(&self, size: ImageSize) -> &ImageState {
        match size {
            ImageSize::Small => &self.small,
            ImageSize::Large => &self.large,
        }
    }

    fn set(&mut self, size: ImageSize, state: ImageState) {
        match size {
            ImageSize::Small => self.small = state,
            ImageSize::Large => self.large = state,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    recipes: Vec<Recipe>,
    generation: u64,
    filter: FilterConfig,
    sort_order: Option<SortOrder>,
    images: HashMap<String, ItemImages>,
    in_flight: HashSet<(String, ImageSize)>,
    last_error: Option<FetchError>,
}

impl State {
    fn contains(&self, id: &str) -> bool {
        self.recipes.iter().any(|recipe| recipe.id == id)
    }

    fn image(&self, id: &str, size: ImageSize) -> ImageState {
        self.images
            .get(id)
            .map(|images| images.get(size).clone())
            .unwrap_or_default()
    }
}

struct Inner {
    client: RecipeClient,
    loader: ImageLoader,
    state: Mutex<State>,
    revision: watch::Sender<u64>,
}

/// Shared handle to the recipe list state. Clones refer to the same store.
#[derive(Clone)]
pub struct RecipeStore {
    inner: Arc<Inner>,
}

enum LoadPlan {
    Done(ImageState),
    Fetch { url: String, generation: u64 },
}

impl RecipeStore {
    pub fn new(client: RecipeClient, loader: ImageLoader) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                client,
                loader,
                state: Mutex::new(State::default()),
                revision,
            }),
        }
    }

    /// Build a client and an image loader sharing one HTTP transport.
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let client = RecipeClient::builder().config(config).build()?;
        let loader = ImageLoader::new(client.transport(), config.max_concurrent_image_loads);
        Ok(Self::new(client, loader))
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.inner.revision.send_modify(|revision| *revision += 1);
    }

    /// Receiver whose value increments on every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Re-fetch the list and replace the current one.
    ///
    /// Image states from the previous list are discarded. On failure the
    /// list is cleared and the error is kept for [`last_error`](Self::last_error).
    pub async fn refresh(&self) -> Result<usize, FetchError> {
        let result = self.inner.client.fetch_recipes().await;

        let outcome = {
            let mut state = self.state();
            state.generation += 1;
            state.images.clear();
            state.in_flight.clear();
            state.sort_order = None;

            match result {
                Ok(list) => {
                    state.recipes = list.into_recipes();
                    state.last_error = None;
                    info!(
                        "Recipe list replaced with {} recipes (generation {})",
                        state.recipes.len(),
                        state.generation
                    );
                    Ok(state.recipes.len())
                }
                Err(e) => {
                    error!("Refreshing recipes failed: {}", e);
                    state.recipes.clear();
                    state.last_error = Some(e.clone());
                    Err(e)
                }
            }
        };

        self.notify();
        outcome
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.state().recipes.clone()
    }

    pub fn recipe(&self, id: &str) -> Option<Recipe> {
        self.state()
            .recipes
            .iter()
            .find(|recipe| recipe.id == id)
            .cloned()
    }

    /// The recipes passing the active filter, in list order.
    pub fn visible(&self) -> Vec<Recipe> {
        let state = self.state();
        state
            .filter
            .apply(&state.recipes)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.state().recipes.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    pub fn last_error(&self) -> Option<FetchError> {
        self.state().last_error.clone()
    }

    pub fn filter(&self) -> FilterConfig {
        self.state().filter.clone()
    }

    pub fn set_filter(&self, filter: FilterConfig) {
        self.state().filter = filter;
        self.notify();
    }

    /// Edit the active filter in place.
    pub fn update_filter(&self, update: impl FnOnce(&mut FilterConfig)) {
        update(&mut self.state().filter);
        self.notify();
    }

    /// Apply the first-element toggle sort and return the order used.
    pub fn sort(&self) -> SortOrder {
        let order = {
            let mut state = self.state();
            let order = sort::sort(&mut state.recipes);
            state.sort_order = Some(order);
            order
        };
        self.notify();
        order
    }

    pub fn sort_with(&self, order: SortOrder) {
        {
            let mut state = self.state();
            sort::sort_by_order(&mut state.recipes, order);
            state.sort_order = Some(order);
        }
        self.notify();
    }

    /// Order of the last sort since the list was replaced, if any.
    pub fn sort_order(&self) -> Option<SortOrder> {
        self.state().sort_order
    }

    pub fn image_state(&self, id: &str, size: ImageSize) -> ImageState {
        self.state().image(id, size)
    }

    pub fn is_loading(&self, id: &str, size: ImageSize) -> bool {
        self.state().in_flight.contains(&(id.to_string(), size))
    }

    /// Load the thumbnail for a recipe that became visible.
    pub async fn load_small(&self, id: &str) -> ImageState {
        self.load(id, ImageSize::Small).await
    }

    /// Load the full-size photo for a recipe that was expanded.
    pub async fn load_large(&self, id: &str) -> ImageState {
        self.load(id, ImageSize::Large).await
    }

    /// Load thumbnails for every visible recipe; returns how many loaded.
    pub async fn load_visible(&self) -> usize {
        let ids: Vec<String> = self.visible().into_iter().map(|recipe| recipe.id).collect();

        let mut tasks = JoinSet::new();
        for id in ids {
            let store = self.clone();
            tasks.spawn(async move { store.load_small(&id).await });
        }

        let mut loaded = 0;
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(state) if state.is_loaded() => loaded += 1,
                Ok(_) => {}
                Err(e) => error!("Image task panicked: {}", e),
            }
        }
        loaded
    }

    /// Fetch at most once per recipe, size and generation. A finished state
    /// (loaded or failed) is returned as is, and a request already in flight
    /// is not duplicated.
    async fn load(&self, id: &str, size: ImageSize) -> ImageState {
        let plan = self.plan_load(id, size);
        let (url, generation) = match plan {
            LoadPlan::Done(state) => return state,
            LoadPlan::Fetch { url, generation } => (url, generation),
        };

        let loaded = self.inner.loader.load_image(Some(url.as_str())).await;

        let current = {
            let mut state = self.state();
            if state.generation != generation || !state.contains(id) {
                debug!(
                    "Discarding {} image for {} from generation {} (now {})",
                    size, id, generation, state.generation
                );
                return state.image(id, size);
            }

            state.in_flight.remove(&(id.to_string(), size));
            state
                .images
                .entry(id.to_string())
                .or_default()
                .set(size, loaded.clone());
            loaded
        };

        self.notify();
        current
    }

    fn plan_load(&self, id: &str, size: ImageSize) -> LoadPlan {
        let mut state = self.state();
        let Some(recipe) = state.recipes.iter().find(|recipe| recipe.id == id) else {
            return LoadPlan::Done(ImageState::Placeholder);
        };

        let url = match size {
            ImageSize::Small => recipe.photo_url_small.clone(),
            ImageSize::Large => recipe.photo_url_large.clone(),
        };

        let current = state.image(id, size);
        if !current.is_placeholder() {
            return LoadPlan::Done(current);
        }

        let Some(url) = url else {
            return LoadPlan::Done(ImageState::Placeholder);
        };

        if !state.in_flight.insert((id.to_string(), size)) {
            return LoadPlan::Done(ImageState::Placeholder);
        }

        LoadPlan::Fetch {
            url,
            generation: state.generation,
        }
    }
}

impl std::fmt::Debug for RecipeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeStore")
            .field("client", &self.inner.client)
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}
