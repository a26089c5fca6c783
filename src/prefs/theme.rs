// Persisted light/dark theme preference.

use crate::error::Result;

use super::storage::LocalStorage;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThemeStore {
    storage: LocalStorage,
    mode: Theme,
}

impl ThemeStore {
    pub fn load(storage: LocalStorage) -> Self {
        let mode = match storage.get_item(THEME_KEY) {
            Ok(Some(raw)) => Theme::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "unknown theme, using default");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read theme");
                Theme::default()
            }
        };
        Self { storage, mode }
    }

    pub fn mode(&self) -> Theme {
        self.mode
    }

    pub fn set(&mut self, mode: Theme) -> Result<()> {
        self.storage.set_item(THEME_KEY, mode.as_str())?;
        self.mode = mode;
        Ok(())
    }

    /// Switch to the other theme and return it.
    pub fn toggle(&mut self) -> Result<Theme> {
        let next = self.mode.toggled();
        self.set(next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_is_light() {
        let dir = TempDir::new().unwrap();
        let themes = ThemeStore::load(LocalStorage::open(dir.path()).unwrap());
        assert_eq!(themes.mode(), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let dir = TempDir::new().unwrap();
        let mut themes = ThemeStore::load(LocalStorage::open(dir.path()).unwrap());
        assert_eq!(themes.toggle().unwrap(), Theme::Dark);

        let reloaded = ThemeStore::load(LocalStorage::open(dir.path()).unwrap());
        assert_eq!(reloaded.mode(), Theme::Dark);
    }

    #[test]
    fn test_garbage_falls_back() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::open(dir.path()).unwrap();
        storage.set_item(THEME_KEY, "sepia").unwrap();
        assert_eq!(ThemeStore::load(storage).mode(), Theme::Light);
    }
}
