//! Shared view context: active tab and language.
//!
//! Created once per client session and handed to every component that
//! needs to read the current language. Only the view coordinator writes.

use std::sync::{Arc, Mutex, PoisonError};

use crate::i18n::{strings, Strings};
use crate::types::{Language, Tab};

/// Point-in-time copy of the view selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub tab: Tab,
    pub language: Language,
}

/// Cloneable handle to the shared [`ViewState`].
#[derive(Clone, Debug, Default)]
pub struct ViewContext {
    inner: Arc<Mutex<ViewState>>,
}

impl ViewContext {
    pub fn new(language: Language) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ViewState {
                tab: Tab::Welcome,
                language,
            })),
        }
    }

    pub fn snapshot(&self) -> ViewState {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn language(&self) -> Language {
        self.snapshot().language
    }

    pub fn active_tab(&self) -> Tab {
        self.snapshot().tab
    }

    /// String table for the current language.
    pub fn strings(&self) -> &'static Strings {
        strings(self.language())
    }

    /// Returns `true` if the language changed.
    pub fn set_language(&self, language: Language) -> bool {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let changed = state.language != language;
        state.language = language;
        changed
    }

    /// Returns `true` if the tab changed.
    pub fn set_tab(&self, tab: Tab) -> bool {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let changed = state.tab != tab;
        state.tab = tab;
        changed
    }
}
