//! Application state and the reducer driving it.
//!
//! The shell turns user interaction into [`Intent`]s. [`DashboardState::dispatch`]
//! applies them and returns the gateway [`Command`]s to run; once a command
//! finishes, its [`Completion`] goes back through [`DashboardState::apply`],
//! which may ask for follow-up fetches. Nothing here performs I/O, so every
//! transition can be exercised without a runtime.

use std::time::Instant;

use shared::{
    domain::{OrderAction, OrderId, ProductId, View},
    error::DashboardError,
    protocol::{NewProduct, Order, OrderPatch, Product},
};
use tracing::{debug, info};

use crate::{
    fetch::FetchTicket, listing_form::ListingForm, orders_view::OrdersView,
    products_view::ProductsView, session::Session, store::SellerStore,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Login { username: String },
    Logout,
    SelectView(View),
    SubmitProduct,
    RefreshProducts,
    RefreshOrders,
    RequestDeleteProduct(ProductId),
    ConfirmDeleteProduct,
    CancelDeleteProduct,
    TransitionOrder { order_id: OrderId, action: OrderAction },
    DismissAlert,
    /// Periodic clock update from the UI loop.
    Tick,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchProducts { ticket: FetchTicket },
    InsertProduct { product: NewProduct },
    DeleteProduct { id: ProductId },
    FetchOrders { ticket: FetchTicket, seller: String },
    UpdateOrder { id: OrderId, patch: OrderPatch },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchProducts { .. } => "fetch_products",
            Self::InsertProduct { .. } => "insert_product",
            Self::DeleteProduct { .. } => "delete_product",
            Self::FetchOrders { .. } => "fetch_orders",
            Self::UpdateOrder { .. } => "update_order",
        }
    }

    /// The completion this command would have produced had it failed with
    /// `err`. Used when the command never reaches the worker.
    pub fn into_failure(self, err: DashboardError) -> Completion {
        match self {
            Self::FetchProducts { ticket } => Completion::ProductsFetched {
                ticket,
                result: Err(err),
            },
            Self::InsertProduct { .. } => Completion::ProductInserted { result: Err(err) },
            Self::DeleteProduct { id } => Completion::ProductDeleted {
                id,
                result: Err(err),
            },
            Self::FetchOrders { ticket, .. } => Completion::OrdersFetched {
                ticket,
                result: Err(err),
            },
            Self::UpdateOrder { id, .. } => Completion::OrderUpdated {
                id,
                result: Err(err),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum Completion {
    ProductsFetched {
        ticket: FetchTicket,
        result: Result<Vec<Product>, DashboardError>,
    },
    ProductInserted {
        result: Result<Product, DashboardError>,
    },
    ProductDeleted {
        id: ProductId,
        result: Result<(), DashboardError>,
    },
    OrdersFetched {
        ticket: FetchTicket,
        result: Result<Vec<Order>, DashboardError>,
    },
    OrderUpdated {
        id: OrderId,
        result: Result<Order, DashboardError>,
    },
}

/// Runs one command against the store.
pub async fn execute(store: &SellerStore, command: Command) -> Completion {
    match command {
        Command::FetchProducts { ticket } => Completion::ProductsFetched {
            ticket,
            result: store.list_products().await,
        },
        Command::InsertProduct { product } => Completion::ProductInserted {
            result: store.insert_product(&product).await,
        },
        Command::DeleteProduct { id } => {
            let result = store.delete_product(&id).await;
            Completion::ProductDeleted { id, result }
        }
        Command::FetchOrders { ticket, seller } => Completion::OrdersFetched {
            ticket,
            result: store.list_orders_for_seller(&seller).await,
        },
        Command::UpdateOrder { id, patch } => {
            let result = store.update_order(&id, &patch).await;
            Completion::OrderUpdated { id, result }
        }
    }
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub session: Session,
    pub form: ListingForm,
    pub products: ProductsView,
    pub orders: OrdersView,
    login_error: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }

    pub fn dispatch(&mut self, intent: Intent, now: Instant) -> Vec<Command> {
        debug!(?intent, "dashboard: dispatch");
        if let Intent::Login { username } = &intent {
            return self.login(username);
        }
        if !self.session.is_logged_in() {
            return Vec::new();
        }

        match intent {
            Intent::Login { .. } => Vec::new(),
            Intent::Logout => {
                info!(seller = self.session.identity(), "dashboard: logout");
                self.session.logout();
                self.form = ListingForm::new();
                self.products.unmount();
                self.orders.unmount();
                Vec::new()
            }
            Intent::SelectView(view) => {
                let previous = self.session.active_view();
                if self.session.select_view(view) {
                    self.unmount(previous);
                    self.mount(view)
                } else {
                    Vec::new()
                }
            }
            Intent::SubmitProduct => match self.form.submit() {
                Some(product) => vec![Command::InsertProduct { product }],
                None => Vec::new(),
            },
            Intent::RefreshProducts => vec![self.fetch_products()],
            Intent::RefreshOrders => self.fetch_orders().into_iter().collect(),
            Intent::RequestDeleteProduct(id) => {
                self.products.request_delete(id);
                Vec::new()
            }
            Intent::ConfirmDeleteProduct => match self.products.confirm_delete() {
                Some(id) => vec![Command::DeleteProduct { id }],
                None => Vec::new(),
            },
            Intent::CancelDeleteProduct => {
                self.products.cancel_delete();
                Vec::new()
            }
            Intent::TransitionOrder { order_id, action } => {
                match self.orders.request_transition(&order_id, action) {
                    Ok(patch) => vec![Command::UpdateOrder {
                        id: order_id,
                        patch,
                    }],
                    Err(err) => {
                        self.orders.raise_alert(err.to_string());
                        Vec::new()
                    }
                }
            }
            Intent::DismissAlert => {
                self.products.dismiss_alert();
                self.orders.dismiss_alert();
                Vec::new()
            }
            Intent::Tick => {
                self.form.expire_banner(now);
                Vec::new()
            }
        }
    }

    pub fn apply(&mut self, completion: Completion, now: Instant) -> Vec<Command> {
        if !self.session.is_logged_in() {
            debug!("dashboard: dropping completion received while logged out");
            return Vec::new();
        }

        match completion {
            Completion::ProductsFetched { ticket, result } => {
                self.products.finish_fetch(ticket, result);
                Vec::new()
            }
            Completion::ProductInserted { result } => {
                if !self.form.is_submitting() {
                    return Vec::new();
                }
                if self.form.finish(&result, now) {
                    info!("dashboard: product listed");
                    self.product_added()
                } else {
                    Vec::new()
                }
            }
            Completion::ProductDeleted { id, result } => {
                if self.products.finish_delete(&id, result)
                    && self.session.active_view() == View::Products
                {
                    vec![self.fetch_products()]
                } else {
                    Vec::new()
                }
            }
            Completion::OrdersFetched { ticket, result } => {
                self.orders.finish_fetch(ticket, result);
                Vec::new()
            }
            Completion::OrderUpdated { id, result } => {
                if self.orders.finish_transition(&id, result)
                    && self.session.active_view() == View::Orders
                {
                    self.fetch_orders().into_iter().collect()
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn login(&mut self, username: &str) -> Vec<Command> {
        match self.session.login(username) {
            Ok(()) => {
                info!(seller = self.session.identity(), "dashboard: login");
                self.login_error = None;
                self.mount(self.session.active_view())
            }
            Err(err) => {
                self.login_error = Some(err.to_string());
                Vec::new()
            }
        }
    }

    /// Bumps the refresh trigger and shows the listing. The listing refetches
    /// because the counter it was fetched for is now behind.
    fn product_added(&mut self) -> Vec<Command> {
        let previous = self.session.active_view();
        self.session.product_added();
        if previous != View::Products {
            self.unmount(previous);
        }
        if self.products.needs_refresh(self.session.refresh_counter()) {
            vec![self.fetch_products()]
        } else {
            Vec::new()
        }
    }

    fn mount(&mut self, view: View) -> Vec<Command> {
        match view {
            View::List => Vec::new(),
            View::Products => vec![self.fetch_products()],
            View::Orders => self.fetch_orders().into_iter().collect(),
        }
    }

    fn unmount(&mut self, view: View) {
        match view {
            View::List => {}
            View::Products => self.products.unmount(),
            View::Orders => self.orders.unmount(),
        }
    }

    fn fetch_products(&mut self) -> Command {
        Command::FetchProducts {
            ticket: self.products.begin_fetch(self.session.refresh_counter()),
        }
    }

    fn fetch_orders(&mut self) -> Option<Command> {
        let seller = self.session.identity()?.to_string();
        Some(Command::FetchOrders {
            ticket: self.orders.begin_fetch(),
            seller,
        })
    }
}
