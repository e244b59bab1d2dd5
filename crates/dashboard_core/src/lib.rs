//! Seller dashboard core: the data access gateway, typed store, and the
//! view state machines the desktop shell renders.

pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod gateway;
pub mod listing_form;
pub mod orders_view;
pub mod products_view;
pub mod session;
pub mod store;

pub use config::{load_settings, Settings};
pub use dashboard::{execute, Command, Completion, DashboardState, Intent};
pub use fetch::{FetchState, FetchTicket};
pub use gateway::{Gateway, ListQuery, OrderBy, RestGateway, Table};
pub use listing_form::{ListingForm, ProductFields, SubmissionState};
pub use orders_view::{OrdersDisplay, OrdersView};
pub use products_view::{ProductsDisplay, ProductsView};
pub use session::Session;
pub use store::SellerStore;

#[cfg(test)]
#[path = "tests/memory_gateway.rs"]
mod memory_gateway;

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod gateway_tests;

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod dashboard_tests;
