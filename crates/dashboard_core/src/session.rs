use shared::{domain::View, error::DashboardError};

/// Logged-in identity, active view and the products-changed trigger.
///
/// The identity is whatever the seller typed; nothing is verified or stored.
#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Option<String>,
    active_view: View,
    refresh_counter: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&mut self, username: &str) -> Result<(), DashboardError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DashboardError::user_input("Username is required"));
        }
        self.identity = Some(username.to_string());
        Ok(())
    }

    pub fn logout(&mut self) {
        self.identity = None;
        self.active_view = View::List;
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn active_view(&self) -> View {
        self.active_view
    }

    /// Returns `true` when the active view actually changed.
    pub fn select_view(&mut self, view: View) -> bool {
        if self.active_view == view {
            return false;
        }
        self.active_view = view;
        true
    }

    pub fn refresh_counter(&self) -> u64 {
        self.refresh_counter
    }

    /// Signals that the product list changed and shows it.
    pub fn product_added(&mut self) {
        self.refresh_counter += 1;
        self.active_view = View::Products;
    }
}
