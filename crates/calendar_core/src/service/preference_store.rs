//! Theme preference persisted as a single boolean entry.

use crate::repo::kv_repo::KeyValueRepository;
use crate::service::event_store::StoreResult;
use log::{error, info, warn};

/// Global presentation theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// Value of the document-level theme attribute the shell applies.
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Dark-mode flag synchronized to one persisted entry.
pub struct PreferenceStore<R: KeyValueRepository> {
    repo: R,
    key: String,
    dark: bool,
}

impl<R: KeyValueRepository> PreferenceStore<R> {
    /// Loads the flag from `key`; absent or malformed entries mean light.
    pub fn load(repo: R, key: impl Into<String>) -> Self {
        let key = key.into();
        let dark = match repo.get_item(&key) {
            Ok(Some(raw)) => serde_json::from_str::<bool>(&raw).unwrap_or_else(|err| {
                warn!(
                    "event=theme_load module=preferences status=fallback reason=parse_error error={err}"
                );
                false
            }),
            Ok(None) => false,
            Err(err) => {
                warn!(
                    "event=theme_load module=preferences status=fallback reason=read_error error={err}"
                );
                false
            }
        };

        Self { repo, key, dark }
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn theme(&self) -> ThemeMode {
        ThemeMode::from_dark(self.dark)
    }

    /// Flips the flag, persists it and returns the new theme.
    ///
    /// On write failure the in-memory flag keeps the new value.
    pub fn toggle(&mut self) -> StoreResult<ThemeMode> {
        self.dark = !self.dark;
        let theme = self.theme();
        info!(
            "event=theme_toggle module=preferences status=ok theme={}",
            theme.attribute()
        );

        let raw = serde_json::to_string(&self.dark)?;
        if let Err(err) = self.repo.set_item(&self.key, &raw) {
            error!("event=theme_sync module=preferences status=error error={err}");
            return Err(err.into());
        }
        Ok(theme)
    }
}
