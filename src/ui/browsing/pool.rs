//! Free lists of widgets kept for reuse across page navigations.

use std::{any::Any, collections::HashMap};

use tracing::debug;

/// Kind of pooled widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// A paging grid.
    GridView,
}

/// Widgets released by detached pages, keyed by kind.
#[derive(Default)]
pub struct WidgetPool {
    free: HashMap<WidgetKind, Vec<Box<dyn Any>>>,
}

impl WidgetPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a released widget of the given kind and type, if one is free.
    pub fn obtain<T: 'static>(&mut self, kind: WidgetKind) -> Option<T> {
        let free = self.free.get_mut(&kind)?;
        let index = free.iter().rposition(|widget| widget.is::<T>())?;
        let widget = free.swap_remove(index).downcast::<T>().ok()?;
        debug!(?kind, remaining = free.len(), "Reusing pooled widget");
        Some(*widget)
    }

    /// Returns a widget to the pool.
    pub fn release<T: 'static>(&mut self, kind: WidgetKind, widget: T) {
        let free = self.free.entry(kind).or_default();
        free.push(Box::new(widget));
        debug!(?kind, free = free.len(), "Released widget to pool");
    }

    /// Number of free widgets of a kind.
    #[must_use]
    pub fn len(&self, kind: WidgetKind) -> usize {
        self.free.get(&kind).map_or(0, Vec::len)
    }

    /// Whether no widget of the kind is free.
    #[must_use]
    pub fn is_empty(&self, kind: WidgetKind) -> bool {
        self.len(kind) == 0
    }
}
