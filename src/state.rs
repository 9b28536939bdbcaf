//! Shared, read-only application state.
//!
//! Nothing in here is mutated after startup, so requests share it through an
//! `Arc` without any locking.

/// Ids of the people known to exist.
///
/// A fixed lookup table, not storage: the API never adds to or removes from it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PersonDirectory {
    ids: Vec<i64>,
}

impl PersonDirectory {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self { ids: ids.into_iter().collect() }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}

impl Default for PersonDirectory {
    fn default() -> Self {
        Self::new([1, 2, 3, 4, 5])
    }
}

/// Everything a route adapter may read besides the request itself.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub persons: PersonDirectory,
}

impl AppState {
    pub fn new(persons: PersonDirectory) -> Self {
        Self { persons }
    }
}
