use shared::{domain::ProductId, error::DashboardError, protocol::Product};
use tracing::warn;

use crate::fetch::{FetchState, FetchTicket, FetchTracker};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this product?";

/// What the products view should draw right now.
#[derive(Debug, PartialEq)]
pub enum ProductsDisplay<'a> {
    Loading,
    Error(&'a str),
    Empty,
    Rows(&'a [Product]),
}

#[derive(Debug, Default)]
pub struct ProductsView {
    listing: FetchTracker<Product>,
    /// Refresh counter value the latest fetch was issued for.
    fetched_for: Option<u64>,
    pending_delete: Option<ProductId>,
    alert: Option<String>,
}

impl ProductsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fetch of the listing for refresh counter value `refresh`.
    /// Called on mount, when the refresh trigger changes, and after a
    /// successful delete.
    pub fn begin_fetch(&mut self, refresh: u64) -> FetchTicket {
        self.fetched_for = Some(refresh);
        self.listing.begin()
    }

    /// Whether the listing was last fetched for an older refresh counter.
    pub fn needs_refresh(&self, refresh: u64) -> bool {
        self.fetched_for != Some(refresh)
    }

    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Product>, DashboardError>,
    ) -> bool {
        self.listing.finish(ticket, result)
    }

    /// Drops dialogs left over from a previous mount.
    pub fn unmount(&mut self) {
        self.pending_delete = None;
        self.alert = None;
    }

    pub fn display(&self) -> ProductsDisplay<'_> {
        match self.listing.state() {
            FetchState::Loading => ProductsDisplay::Loading,
            FetchState::Failed(message) => ProductsDisplay::Error(message),
            FetchState::Loaded(rows) if rows.is_empty() => ProductsDisplay::Empty,
            FetchState::Loaded(rows) => ProductsDisplay::Rows(rows),
        }
    }

    pub fn products(&self) -> &[Product] {
        self.listing.rows()
    }

    /// Asks for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: ProductId) {
        self.pending_delete = Some(id);
    }

    pub fn pending_delete(&self) -> Option<&ProductId> {
        self.pending_delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Confirms the pending delete, returning the id to delete.
    pub fn confirm_delete(&mut self) -> Option<ProductId> {
        self.pending_delete.take()
    }

    /// Records a delete outcome. Returns `true` when the listing should be
    /// fetched again; failures raise an alert and leave the list as shown.
    pub fn finish_delete(&mut self, id: &ProductId, result: Result<(), DashboardError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(product_id = %id, "products: delete failed: {err}");
                self.alert = Some(err.to_string());
                false
            }
        }
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}
