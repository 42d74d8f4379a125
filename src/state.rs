use std::sync::Arc;

use crate::database::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: impl Store + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

impl From<Arc<dyn Store>> for AppState {
    fn from(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}
