//! Hot-reloadable route list.
//!
//! The scanner holds a cheap `Arc` clone of the current route set for the
//! duration of one tick; a control-plane reload swaps in a freshly built
//! `Vec` without requiring the scanner to pause.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::domain::Route;

pub struct RouteList {
    routes: RwLock<Arc<Vec<Route>>>,
}

impl RouteList {
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes: RwLock::new(Arc::new(routes)),
        }
    }

    /// Cheap snapshot: clones the `Arc`, not the underlying `Vec`.
    pub fn snapshot(&self) -> Arc<Vec<Route>> {
        self.routes.read().clone()
    }

    /// Atomically replace the route set, e.g. after `RouteBuilder::rebuild`.
    pub fn replace(&self, routes: Vec<Route>) {
        *self.routes.write() = Arc::new(routes);
    }

    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
