// Persisted user preferences.
// Bookmarks and theme, stored as small JSON/text values in the data directory.

pub mod bookmarks;
pub mod storage;
pub mod theme;

use std::path::Path;

use crate::error::Result;

pub use bookmarks::{BookmarkKind, BookmarkStore};
pub use storage::LocalStorage;
pub use theme::{Theme, ThemeStore};

/// Everything the user chose that outlives a session.
#[derive(Debug, Clone)]
pub struct Preferences {
    pub bookmarks: BookmarkStore,
    pub theme: ThemeStore,
}

impl Preferences {
    pub fn load(data_dir: &Path) -> Result<Self> {
        let storage = LocalStorage::open(data_dir)?;
        Ok(Self {
            bookmarks: BookmarkStore::load(storage.clone()),
            theme: ThemeStore::load(storage),
        })
    }
}
