//! UI layer for the seller dashboard: login screen, shell, and the three views.

pub mod app;

pub use app::SellerDashboardApp;
