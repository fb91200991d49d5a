// Browsing-context seam
// The transport needs to know the current path (no refresh on the login page)
// and to redirect on terminal auth failure; both go through this trait so the
// client never touches an ambient global

use std::sync::RwLock;

/// Access to the host's navigation state
pub trait Navigator: Send + Sync {
    /// Path of the page the client is currently on
    fn current_path(&self) -> String;

    /// Redirect the browsing context to the given target
    fn navigate(&self, target: &str);
}

/// Navigator backed by plain fields; records navigations instead of
/// performing them. Default implementation and test double
pub struct StaticNavigator {
    current_path: RwLock<String>,
    history: RwLock<Vec<String>>,
}

impl StaticNavigator {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            current_path: RwLock::new(path.into()),
            history: RwLock::new(Vec::new()),
        }
    }

    pub fn set_current_path(&self, path: impl Into<String>) {
        *self.current_path.write().unwrap() = path.into();
    }

    /// Most recent navigation target, if any
    pub fn last_navigation(&self) -> Option<String> {
        self.history.read().unwrap().last().cloned()
    }
}

impl Default for StaticNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for StaticNavigator {
    fn current_path(&self) -> String {
        self.current_path.read().unwrap().clone()
    }

    fn navigate(&self, target: &str) {
        tracing::info!(to = target, "Navigating");
        self.history.write().unwrap().push(target.to_string());
        *self.current_path.write().unwrap() = target.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_updates_path_and_history() {
        let nav = StaticNavigator::new("/dashboard");
        assert_eq!(nav.current_path(), "/dashboard");
        assert_eq!(nav.last_navigation(), None);

        nav.navigate("/login?redirectTo=/dashboard");
        assert_eq!(nav.current_path(), "/login?redirectTo=/dashboard");
        assert_eq!(
            nav.last_navigation(),
            Some("/login?redirectTo=/dashboard".to_string())
        );
    }

    #[test]
    fn test_set_current_path() {
        let nav = StaticNavigator::default();
        assert_eq!(nav.current_path(), "/");
        nav.set_current_path("/orders");
        assert_eq!(nav.current_path(), "/orders");
    }
}
