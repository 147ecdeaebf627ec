use log::debug;

use super::app::App;

/// Something that ingested components can be published into.
pub trait AppStore {
    /// Records where the store's content came from.
    fn set_origin(&mut self, origin: &str);

    /// Adds a component, taking ownership of it.
    fn add_app(&mut self, app: App);
}

/// An in-memory component store.
///
/// Components keep insertion order.  Adding a component whose id is already
/// present replaces the earlier one in place.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Store {
    origin: Option<String>,
    apps: Vec<App>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the content came from, if recorded.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Components in insertion order.
    pub fn apps(&self) -> &[App] {
        &self.apps
    }

    /// Looks up a component by id.
    pub fn app_by_id(&self, id: &str) -> Option<&App> {
        self.apps.iter().find(|app| app.id() == id)
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    /// Returns true if the store holds no components.
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

impl AppStore for Store {
    fn set_origin(&mut self, origin: &str) {
        self.origin = Some(origin.to_string());
    }

    fn add_app(&mut self, app: App) {
        match self.apps.iter_mut().find(|existing| existing.id() == app.id()) {
            Some(existing) => {
                debug!("replacing {} in store", app.id());
                *existing = app;
            }
            None => self.apps.push(app),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppStore, Store};
    use crate::appstream::{App, Release};

    #[test]
    fn apps_keep_insertion_order() {
        let mut store = Store::new();
        assert!(store.is_empty());
        store.add_app(App::new("b"));
        store.add_app(App::new("a"));
        let ids: Vec<&str> = store.apps().iter().map(App::id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn same_id_replaces() {
        let mut store = Store::new();
        store.add_app(App::new("a"));
        store.add_app(App::new("b"));
        let mut newer = App::new("a");
        newer.add_release(Release::new());
        store.add_app(newer);
        assert_eq!(store.len(), 2);
        assert_eq!(store.apps()[0].id(), "a");
        assert_eq!(store.app_by_id("a").unwrap().releases().len(), 1);
    }

    #[test]
    fn origin() {
        let mut store = Store::new();
        assert_eq!(store.origin(), None);
        store.set_origin("firmware.cab");
        assert_eq!(store.origin(), Some("firmware.cab"));
    }
}
