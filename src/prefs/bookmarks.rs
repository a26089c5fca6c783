// Bookmark store.
// Two persisted id sets; each toggle is written to storage before it takes effect.

use crate::error::Result;

use super::storage::LocalStorage;

pub const BOOKMARKED_POSTS_KEY: &str = "bookmarkedPosts";
pub const BOOKMARKED_USERS_KEY: &str = "bookmarkedUsers";

/// Which set an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkKind {
    Post,
    User,
}

impl BookmarkKind {
    fn storage_key(&self) -> &'static str {
        match self {
            BookmarkKind::Post => BOOKMARKED_POSTS_KEY,
            BookmarkKind::User => BOOKMARKED_USERS_KEY,
        }
    }
}

/// Ordered set of ids, oldest bookmark first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkSet {
    ids: Vec<u64>,
}

impl BookmarkSet {
    fn from_ids(ids: Vec<u64>) -> Self {
        let mut set = Self::default();
        for id in ids {
            if !set.contains(id) {
                set.ids.push(id);
            }
        }
        set
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn toggled(&self, id: u64) -> Self {
        let mut next = self.clone();
        if let Some(pos) = next.ids.iter().position(|&x| x == id) {
            next.ids.remove(pos);
        } else {
            next.ids.push(id);
        }
        next
    }
}

/// Bookmarked posts and users.
#[derive(Debug, Clone)]
pub struct BookmarkStore {
    storage: LocalStorage,
    posts: BookmarkSet,
    users: BookmarkSet,
}

impl BookmarkStore {
    /// Load both sets; missing or unreadable data yields an empty set.
    pub fn load(storage: LocalStorage) -> Self {
        let posts = load_set(&storage, BookmarkKind::Post);
        let users = load_set(&storage, BookmarkKind::User);
        tracing::debug!(posts = posts.len(), users = users.len(), "bookmarks loaded");
        Self {
            storage,
            posts,
            users,
        }
    }

    fn set(&self, kind: BookmarkKind) -> &BookmarkSet {
        match kind {
            BookmarkKind::Post => &self.posts,
            BookmarkKind::User => &self.users,
        }
    }

    fn set_mut(&mut self, kind: BookmarkKind) -> &mut BookmarkSet {
        match kind {
            BookmarkKind::Post => &mut self.posts,
            BookmarkKind::User => &mut self.users,
        }
    }

    /// Flip membership of `id`. Returns whether it is bookmarked afterwards.
    pub fn toggle(&mut self, kind: BookmarkKind, id: u64) -> Result<bool> {
        let next = self.set(kind).toggled(id);
        let json = serde_json::to_string(next.ids())?;
        self.storage.set_item(kind.storage_key(), &json)?;

        let bookmarked = next.contains(id);
        *self.set_mut(kind) = next;
        tracing::debug!(?kind, id, bookmarked, "bookmark toggled");
        Ok(bookmarked)
    }

    pub fn is_bookmarked(&self, kind: BookmarkKind, id: u64) -> bool {
        self.set(kind).contains(id)
    }

    pub fn ids(&self, kind: BookmarkKind) -> &[u64] {
        self.set(kind).ids()
    }

    pub fn count(&self, kind: BookmarkKind) -> usize {
        self.set(kind).len()
    }

    pub fn total(&self) -> usize {
        self.posts.len() + self.users.len()
    }

    /// Remove every bookmark of both kinds. Each set is emptied in memory
    /// only once its key is gone from storage.
    pub fn clear_all(&mut self) -> Result<()> {
        for kind in [BookmarkKind::Post, BookmarkKind::User] {
            self.storage.remove_item(kind.storage_key())?;
            *self.set_mut(kind) = BookmarkSet::default();
        }
        tracing::info!("all bookmarks cleared");
        Ok(())
    }
}

fn load_set(storage: &LocalStorage, kind: BookmarkKind) -> BookmarkSet {
    let raw = match storage.get_item(kind.storage_key()) {
        Ok(Some(raw)) => raw,
        Ok(None) => return BookmarkSet::default(),
        Err(err) => {
            tracing::warn!(?kind, error = %err, "could not read bookmarks");
            return BookmarkSet::default();
        }
    };
    match serde_json::from_str::<Vec<u64>>(&raw) {
        Ok(ids) => BookmarkSet::from_ids(ids),
        Err(err) => {
            tracing::warn!(?kind, error = %err, "ignoring unparsable bookmarks");
            BookmarkSet::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> BookmarkStore {
        BookmarkStore::load(LocalStorage::open(dir.path()).unwrap())
    }

    fn stored(dir: &TempDir, key: &str) -> Option<Vec<u64>> {
        LocalStorage::open(dir.path())
            .unwrap()
            .get_item(key)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[test]
    fn test_toggle_twice_removes() {
        let dir = TempDir::new().unwrap();
        let mut bookmarks = store(&dir);

        assert!(bookmarks.toggle(BookmarkKind::User, 7).unwrap());
        assert!(!bookmarks.toggle(BookmarkKind::User, 7).unwrap());

        assert!(!bookmarks.is_bookmarked(BookmarkKind::User, 7));
        assert_eq!(stored(&dir, BOOKMARKED_USERS_KEY), Some(vec![]));
    }

    #[test]
    fn test_membership_follows_toggle_parity() {
        let dir = TempDir::new().unwrap();
        let mut bookmarks = store(&dir);

        for toggles in 1..=6 {
            bookmarks.toggle(BookmarkKind::Post, 42).unwrap();
            assert_eq!(bookmarks.is_bookmarked(BookmarkKind::Post, 42), toggles % 2 == 1);
            assert!(bookmarks.count(BookmarkKind::Post) <= 1);
        }
    }

    #[test]
    fn test_sets_are_independent_and_persisted() {
        let dir = TempDir::new().unwrap();
        {
            let mut bookmarks = store(&dir);
            bookmarks.toggle(BookmarkKind::Post, 1).unwrap();
            bookmarks.toggle(BookmarkKind::Post, 2).unwrap();
            bookmarks.toggle(BookmarkKind::User, 1).unwrap();
        }

        let reloaded = store(&dir);
        assert_eq!(reloaded.ids(BookmarkKind::Post), &[1, 2]);
        assert_eq!(reloaded.ids(BookmarkKind::User), &[1]);
        assert_eq!(reloaded.total(), 3);
    }

    #[test]
    fn test_unparsable_storage_loads_empty() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::open(dir.path()).unwrap();
        storage.set_item(BOOKMARKED_POSTS_KEY, "not json").unwrap();
        storage.set_item(BOOKMARKED_USERS_KEY, "[3,3,4]").unwrap();

        let bookmarks = BookmarkStore::load(storage);
        assert_eq!(bookmarks.count(BookmarkKind::Post), 0);
        assert_eq!(bookmarks.ids(BookmarkKind::User), &[3, 4]);
    }

    #[test]
    fn test_clear_all() {
        let dir = TempDir::new().unwrap();
        let mut bookmarks = store(&dir);
        bookmarks.toggle(BookmarkKind::Post, 1).unwrap();
        bookmarks.toggle(BookmarkKind::User, 2).unwrap();

        bookmarks.clear_all().unwrap();

        assert_eq!(bookmarks.total(), 0);
        assert_eq!(stored(&dir, BOOKMARKED_POSTS_KEY), None);
        assert_eq!(stored(&dir, BOOKMARKED_USERS_KEY), None);
    }

    #[test]
    fn test_clear_all_partial_failure_matches_storage() {
        let dir = TempDir::new().unwrap();
        let mut bookmarks = store(&dir);
        bookmarks.toggle(BookmarkKind::Post, 1).unwrap();

        // A directory where the users file should be makes its removal fail.
        std::fs::create_dir(dir.path().join("bookmarkedUsers.json")).unwrap();

        assert!(bookmarks.clear_all().is_err());
        assert_eq!(stored(&dir, BOOKMARKED_POSTS_KEY), None);
        assert!(!bookmarks.is_bookmarked(BookmarkKind::Post, 1));
        assert_eq!(bookmarks.count(BookmarkKind::Post), 0);
    }
}
