use shared::{
    domain::{OrderAction, OrderId},
    error::DashboardError,
    protocol::{Order, OrderPatch},
};
use tracing::warn;

use crate::fetch::{FetchState, FetchTicket, FetchTracker};

#[derive(Debug, PartialEq)]
pub enum OrdersDisplay<'a> {
    Loading,
    Error(&'a str),
    Empty,
    Rows(&'a [Order]),
}

#[derive(Debug, Default)]
pub struct OrdersView {
    orders: FetchTracker<Order>,
    alert: Option<String>,
}

impl OrdersView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fetch of the seller's orders. Called on mount, on identity
    /// change, and after a successful status update.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.orders.begin()
    }

    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Order>, DashboardError>,
    ) -> bool {
        self.orders.finish(ticket, result)
    }

    pub fn unmount(&mut self) {
        self.alert = None;
    }

    pub fn display(&self) -> OrdersDisplay<'_> {
        match self.orders.state() {
            FetchState::Loading => OrdersDisplay::Loading,
            FetchState::Failed(message) => OrdersDisplay::Error(message),
            FetchState::Loaded(rows) if rows.is_empty() => OrdersDisplay::Empty,
            FetchState::Loaded(rows) => OrdersDisplay::Rows(rows),
        }
    }

    pub fn orders(&self) -> &[Order] {
        self.orders.rows()
    }

    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.orders().iter().find(|order| &order.id == id)
    }

    /// Validates `action` against the order's displayed status and returns
    /// the patch to send. Edges outside the status machine are rejected
    /// without touching the gateway.
    pub fn request_transition(
        &self,
        id: &OrderId,
        action: OrderAction,
    ) -> Result<OrderPatch, DashboardError> {
        let order = self
            .order(id)
            .ok_or_else(|| DashboardError::user_input(format!("order {id} is not displayed")))?;
        let next = order.status.apply(action).ok_or_else(|| {
            warn!(order_id = %id, status = %order.status, ?action, "orders: transition rejected");
            DashboardError::user_input(format!(
                "cannot {} an order that is {}",
                action.label().to_ascii_lowercase(),
                order.status
            ))
        })?;
        Ok(OrderPatch::status(next))
    }

    /// Records an update outcome. Returns `true` when the orders should be
    /// fetched again; failures raise an alert and leave the list unchanged.
    pub fn finish_transition(
        &mut self,
        id: &OrderId,
        result: Result<Order, DashboardError>,
    ) -> bool {
        match result {
            Ok(_) => true,
            Err(err) => {
                warn!(order_id = %id, "orders: status update failed: {err}");
                self.alert = Some(err.to_string());
                false
            }
        }
    }

    /// Surfaces a failure as a blocking alert.
    pub fn raise_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}
