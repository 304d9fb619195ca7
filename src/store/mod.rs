pub mod category;
pub mod profile;
pub mod theme;
pub mod todo;

pub use category::CategoryStore;
pub use profile::ProfileStore;
pub use theme::ThemeStore;
pub use todo::TodoStore;

/// Persisted key layout: three independent keys plus the profile name.
pub const CATEGORIES_KEY: &str = "categories";
pub const TODOS_KEY: &str = "todoItems";
pub const THEME_KEY: &str = "theme";
pub const PROFILE_NAME_KEY: &str = "profileName";

/// Change-listener registry shared by the stores. Listeners are invoked
/// synchronously after a successful persist (and after a cache refresh), so a
/// subscriber observing `list()` from inside the callback always sees the
/// committed state.
#[derive(Default)]
pub struct Listeners {
    subs: Vec<Box<dyn Fn() + Send + Sync>>,
}

impl Listeners {
    pub fn subscribe(&mut self, listener: impl Fn() + Send + Sync + 'static) {
        self.subs.push(Box::new(listener));
    }

    pub fn notify(&self) {
        for listener in &self.subs {
            listener();
        }
    }
}
