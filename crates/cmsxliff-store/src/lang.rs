use cmsxliff_core::Result;

use crate::ContentStore;

/// Scoped language switch for read paths. Captures the prior language on
/// enter and restores it on drop, so every exit path (including panics that
/// unwind) leaves the store the way it was found.
pub struct LanguageScope<'a, S: ContentStore + ?Sized> {
    store: &'a S,
    previous: String,
}

impl<'a, S: ContentStore + ?Sized> LanguageScope<'a, S> {
    pub fn enter(store: &'a S, code: &str) -> Self {
        let previous = store.active_language();
        store.set_active_language(code);
        Self { store, previous }
    }
}

impl<S: ContentStore + ?Sized> Drop for LanguageScope<'_, S> {
    fn drop(&mut self) {
        self.store.set_active_language(&self.previous);
    }
}

/// Run `body` with the store's active language switched to `code`.
pub fn with_language<S, T>(store: &S, code: &str, body: impl FnOnce(&S) -> T) -> T
where
    S: ContentStore + ?Sized,
{
    let _scope = LanguageScope::enter(store, code);
    body(store)
}

/// Mutable variant for apply paths. The prior language is restored whether
/// `body` succeeds or fails.
pub fn with_language_mut<S, T>(
    store: &mut S,
    code: &str,
    body: impl FnOnce(&mut S) -> Result<T>,
) -> Result<T>
where
    S: ContentStore + ?Sized,
{
    let previous = store.active_language();
    store.set_active_language(code);
    let out = body(store);
    store.set_active_language(&previous);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use cmsxliff_core::XliffError;

    #[test]
    fn language_is_restored_after_the_scope() {
        let store = MemoryStore::new("en");
        assert_eq!(store.active_language(), "en");
        let seen = with_language(&store, "de", |s| s.active_language());
        assert_eq!(seen, "de");
        assert_eq!(store.active_language(), "en");
    }

    #[test]
    fn language_is_restored_when_the_body_fails() {
        let mut store = MemoryStore::new("en");
        let out: Result<()> = with_language_mut(&mut store, "fr", |_| {
            Err(XliffError::Store("boom".into()))
        });
        assert!(out.is_err());
        assert_eq!(store.active_language(), "en");
    }
}
