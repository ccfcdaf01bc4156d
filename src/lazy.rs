use crate::types::Result;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Lazily-initialized backend handle with a sticky failure state.
///
/// The factory runs at most once per process lifetime, guarded by a
/// single-acquisition cell. A failed initialization is remembered as `None`
/// so expensive load attempts are never repeated.
pub struct LazyBackend<T: ?Sized> {
    name: String,
    cell: OnceCell<Option<Arc<T>>>,
    factory: Box<dyn Fn() -> Result<Arc<T>> + Send + Sync>,
}

impl<T: ?Sized + Send + Sync + 'static> LazyBackend<T> {
    pub fn new<F>(name: &str, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            cell: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    /// A backend that is already constructed; no lazy load will happen.
    pub fn preset(name: &str, backend: Arc<T>) -> Self {
        Self {
            name: name.to_string(),
            cell: OnceCell::new_with(Some(Some(backend))),
            factory: Box::new(|| unreachable!("preset backend never re-initializes")),
        }
    }

    /// A permanently absent backend. `get` always returns `None`.
    pub fn unavailable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cell: OnceCell::new_with(Some(None)),
            factory: Box::new(|| unreachable!("unavailable backend never initializes")),
        }
    }

    /// Initialize on first use and hand out the shared handle. Returns
    /// `None` when the backend is unavailable or its load failed earlier.
    pub async fn get(&self) -> Option<Arc<T>> {
        self.cell
            .get_or_init(|| async {
                match (self.factory)() {
                    Ok(backend) => {
                        info!("Initialized backend: {}", self.name);
                        Some(backend)
                    }
                    Err(e) => {
                        warn!("Failed to initialize backend {}: {}", self.name, e);
                        None
                    }
                }
            })
            .await
            .clone()
    }
}
