use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use shared::{
    domain::{Category, OrderAction, OrderId, OrderStatus, ProductId, View},
    error::DashboardError,
};

use crate::{
    dashboard::{execute, Command, Completion, DashboardState, Intent},
    listing_form::{ProductFields, SubmissionState, SUCCESS_BANNER_TTL},
    memory_gateway::MemoryGateway,
    orders_view::OrdersDisplay,
    products_view::ProductsDisplay,
    store::SellerStore,
};

struct Harness {
    state: DashboardState,
    gateway: Arc<MemoryGateway>,
    store: SellerStore,
    now: Instant,
}

impl Harness {
    fn new() -> Self {
        let gateway = Arc::new(MemoryGateway::new());
        Self {
            state: DashboardState::new(),
            store: SellerStore::new(gateway.clone()),
            gateway,
            now: Instant::now(),
        }
    }

    /// Dispatches `intent` and runs every resulting command to completion,
    /// including follow-up fetches.
    async fn send(&mut self, intent: Intent) {
        let commands = self.state.dispatch(intent, self.now);
        self.drain(commands).await;
    }

    async fn drain(&mut self, mut pending: Vec<Command>) {
        while !pending.is_empty() {
            let command = pending.remove(0);
            let completion = execute(&self.store, command).await;
            pending.extend(self.state.apply(completion, self.now));
        }
    }

    async fn login(&mut self, seller: &str) {
        self.send(Intent::Login {
            username: seller.into(),
        })
        .await;
    }

    fn fill_form(&mut self, name: &str) {
        self.state.form.fields = ProductFields {
            username: "alice".into(),
            name: name.into(),
            price: "12.50".into(),
            original_price: "15.00".into(),
            brand: "AcmeTools".into(),
            category: Some(Category::Tools),
            image: "https://x/y.jpg".into(),
        };
    }

    fn product_names(&self) -> Vec<String> {
        self.state
            .products
            .products()
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    fn order_status(&self, id: &str) -> OrderStatus {
        self.state
            .orders
            .order(&OrderId::from(id))
            .map(|o| o.status)
            .expect("order displayed")
    }
}

#[tokio::test]
async fn listing_a_product_switches_to_products_with_new_item_first() {
    let mut h = Harness::new();
    h.login("alice").await;
    assert_eq!(h.state.session.active_view(), View::List);

    h.fill_form("Rake");
    h.send(Intent::SubmitProduct).await;
    h.fill_form("Hoe");
    h.send(Intent::SubmitProduct).await;

    assert_eq!(h.state.session.active_view(), View::Products);
    assert_eq!(h.state.session.refresh_counter(), 2);
    assert_eq!(h.product_names(), vec!["Hoe".to_string(), "Rake".to_string()]);
    assert!(h.state.form.fields.is_empty());
    assert!(h.state.form.success_visible());
}

#[tokio::test]
async fn successful_insert_issues_exactly_one_listing_fetch() {
    let mut h = Harness::new();
    h.login("alice").await;
    h.fill_form("Hoe");

    let commands = h.state.dispatch(Intent::SubmitProduct, h.now);
    assert!(matches!(commands.as_slice(), [Command::InsertProduct { .. }]));
    assert_eq!(h.state.form.submit_label(), "Adding Product...");

    let completion = execute(&h.store, commands[0].clone()).await;
    let follow_up = h.state.apply(completion, h.now);
    assert_eq!(follow_up.len(), 1);
    assert!(matches!(follow_up[0], Command::FetchProducts { .. }));
    assert_eq!(h.state.session.refresh_counter(), 1);
    assert!(!h.state.products.needs_refresh(1));
    h.drain(follow_up).await;

    assert_eq!(h.product_names(), vec!["Hoe".to_string()]);
}

#[tokio::test]
async fn second_submit_while_in_flight_is_ignored() {
    let mut h = Harness::new();
    h.login("alice").await;
    h.fill_form("Hoe");

    let first = h.state.dispatch(Intent::SubmitProduct, h.now);
    let second = h.state.dispatch(Intent::SubmitProduct, h.now);
    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
}

#[tokio::test]
async fn failed_insert_keeps_fields_and_shows_error() {
    let mut h = Harness::new();
    h.login("alice").await;
    h.fill_form("Hoe");
    h.gateway
        .fail_next(DashboardError::Validation("duplicate key value".into()))
        .await;

    h.send(Intent::SubmitProduct).await;

    assert_eq!(h.state.session.active_view(), View::List);
    assert_eq!(h.state.form.fields.name, "Hoe");
    assert_eq!(h.state.form.error(), Some("duplicate key value"));
    assert_eq!(h.state.form.submit_label(), "List Product");
}

#[tokio::test]
async fn invalid_form_never_reaches_the_gateway() {
    let mut h = Harness::new();
    h.login("alice").await;
    h.fill_form("Hoe");
    h.state.form.fields.price = "-3".into();

    h.send(Intent::SubmitProduct).await;

    assert_eq!(h.state.form.error(), Some("Price must not be negative"));
    assert!(h.gateway.calls().await.is_empty());
}

#[tokio::test]
async fn success_banner_expires_on_tick() {
    let mut h = Harness::new();
    h.login("alice").await;
    h.fill_form("Hoe");
    h.send(Intent::SubmitProduct).await;
    assert!(h.state.form.success_visible());

    h.now += SUCCESS_BANNER_TTL - Duration::from_millis(1);
    h.send(Intent::Tick).await;
    assert!(h.state.form.success_visible());

    h.now += Duration::from_millis(1);
    h.send(Intent::Tick).await;
    assert_eq!(h.state.form.state(), &SubmissionState::Idle);
}

#[tokio::test]
async fn pending_order_walks_the_status_machine() {
    let mut h = Harness::new();
    let id = h.gateway.seed_order("p-1", "alice", "bob", "pending").await;
    h.login("alice").await;
    h.send(Intent::SelectView(View::Orders)).await;
    assert_eq!(h.order_status(&id), OrderStatus::Pending);

    h.send(Intent::TransitionOrder {
        order_id: OrderId::from(id.as_str()),
        action: OrderAction::StartProcessing,
    })
    .await;
    let status = h.order_status(&id);
    assert_eq!(status, OrderStatus::Processing);
    assert!(status.available_actions().contains(&OrderAction::MarkComplete));
    assert!(!status.available_actions().contains(&OrderAction::StartProcessing));

    h.send(Intent::TransitionOrder {
        order_id: OrderId::from(id.as_str()),
        action: OrderAction::MarkComplete,
    })
    .await;
    assert_eq!(h.order_status(&id), OrderStatus::Completed);
    assert!(h.state.orders.alert().is_none());
}

#[tokio::test]
async fn terminal_orders_reject_transitions_without_a_request() {
    let mut h = Harness::new();
    let id = h.gateway.seed_order("p-1", "alice", "bob", "completed").await;
    h.login("alice").await;
    h.send(Intent::SelectView(View::Orders)).await;
    let calls_before = h.gateway.calls().await.len();

    let commands = h.state.dispatch(
        Intent::TransitionOrder {
            order_id: OrderId::from(id.as_str()),
            action: OrderAction::Cancel,
        },
        h.now,
    );

    assert!(commands.is_empty());
    assert_eq!(
        h.state.orders.alert(),
        Some("cannot cancel an order that is completed")
    );
    assert_eq!(h.gateway.calls().await.len(), calls_before);
    assert_eq!(h.order_status(&id), OrderStatus::Completed);
}

#[tokio::test]
async fn failed_status_update_alerts_and_keeps_list() {
    let mut h = Harness::new();
    let id = h.gateway.seed_order("p-1", "alice", "bob", "pending").await;
    h.login("alice").await;
    h.send(Intent::SelectView(View::Orders)).await;
    h.gateway
        .fail_next(DashboardError::Transport("connection reset".into()))
        .await;

    h.send(Intent::TransitionOrder {
        order_id: OrderId::from(id.as_str()),
        action: OrderAction::Cancel,
    })
    .await;

    assert_eq!(h.state.orders.alert(), Some("connection reset"));
    assert_eq!(h.order_status(&id), OrderStatus::Pending);

    h.send(Intent::DismissAlert).await;
    assert!(h.state.orders.alert().is_none());
}

#[tokio::test]
async fn seller_without_orders_sees_empty_state() {
    let mut h = Harness::new();
    h.gateway.seed_order("p-1", "carol", "bob", "pending").await;
    h.login("alice").await;

    let commands = h.state.dispatch(Intent::SelectView(View::Orders), h.now);
    assert_eq!(h.state.orders.display(), OrdersDisplay::Loading);
    assert!(matches!(
        commands.as_slice(),
        [Command::FetchOrders { seller, .. }] if seller == "alice"
    ));
    h.drain(commands).await;

    assert_eq!(h.state.orders.display(), OrdersDisplay::Empty);
}

#[tokio::test]
async fn orders_show_fallback_name_when_product_is_gone() {
    let mut h = Harness::new();
    h.gateway.seed_order("deleted", "alice", "bob", "pending").await;
    h.login("alice").await;
    h.send(Intent::SelectView(View::Orders)).await;

    match h.state.orders.display() {
        OrdersDisplay::Rows(rows) => assert_eq!(rows[0].product_name(), "Product"),
        other => panic!("expected rows, got {other:?}"),
    }
}

#[tokio::test]
async fn stale_listing_response_is_discarded() {
    let mut h = Harness::new();
    h.login("alice").await;
    h.send(Intent::SelectView(View::Products)).await;

    let stale = h.state.dispatch(Intent::RefreshProducts, h.now);
    let fresh = h.state.dispatch(Intent::RefreshProducts, h.now);
    let (Command::FetchProducts { ticket: stale }, Command::FetchProducts { ticket: fresh }) =
        (stale[0].clone(), fresh[0].clone())
    else {
        panic!("expected product fetches");
    };

    h.state.apply(
        Completion::ProductsFetched {
            ticket: fresh,
            result: Ok(Vec::new()),
        },
        h.now,
    );
    h.state.apply(
        Completion::ProductsFetched {
            ticket: stale,
            result: Err(DashboardError::Transport("timed out".into())),
        },
        h.now,
    );

    assert_eq!(h.state.products.display(), ProductsDisplay::Empty);
}

#[tokio::test]
async fn listing_failure_is_shown_as_error() {
    let mut h = Harness::new();
    h.login("alice").await;
    h.gateway
        .fail_next(DashboardError::Query("permission denied for table products".into()))
        .await;
    h.send(Intent::SelectView(View::Products)).await;

    assert_eq!(
        h.state.products.display(),
        ProductsDisplay::Error("permission denied for table products")
    );
}

#[tokio::test]
async fn delete_requires_confirmation_and_refetches() {
    let mut h = Harness::new();
    h.login("alice").await;
    h.fill_form("Hoe");
    h.send(Intent::SubmitProduct).await;
    let id: ProductId = h.state.products.products()[0].id.clone();

    h.send(Intent::RequestDeleteProduct(id.clone())).await;
    h.send(Intent::CancelDeleteProduct).await;
    assert_eq!(h.product_names(), vec!["Hoe".to_string()]);

    h.send(Intent::RequestDeleteProduct(id.clone())).await;
    assert_eq!(h.state.products.pending_delete(), Some(&id));
    h.send(Intent::ConfirmDeleteProduct).await;

    assert_eq!(h.state.products.display(), ProductsDisplay::Empty);
    assert!(h
        .gateway
        .calls()
        .await
        .contains(&format!("delete products {id}")));
}

#[tokio::test]
async fn deleting_a_vanished_product_raises_alert() {
    let mut h = Harness::new();
    h.login("alice").await;
    h.send(Intent::SelectView(View::Products)).await;

    h.send(Intent::RequestDeleteProduct(ProductId::from("gone"))).await;
    h.send(Intent::ConfirmDeleteProduct).await;

    assert_eq!(
        h.state.products.alert(),
        Some("no row in products with id gone")
    );
}

#[tokio::test]
async fn logout_resets_to_login_screen_and_ignores_late_results() {
    let mut h = Harness::new();
    h.login("alice").await;
    h.send(Intent::SelectView(View::Products)).await;
    h.fill_form("Half typed");
    let late = h.state.dispatch(Intent::RefreshProducts, h.now);

    h.send(Intent::Logout).await;
    assert!(!h.state.session.is_logged_in());
    assert_eq!(h.state.session.active_view(), View::List);
    assert!(h.state.form.fields.is_empty());

    let Command::FetchProducts { ticket } = late[0].clone() else {
        panic!("expected product fetch");
    };
    let follow_up = h.state.apply(
        Completion::ProductsFetched {
            ticket,
            result: Ok(Vec::new()),
        },
        h.now,
    );
    assert!(follow_up.is_empty());

    assert!(h.state.dispatch(Intent::RefreshOrders, h.now).is_empty());
}

#[tokio::test]
async fn blank_login_is_rejected() {
    let mut h = Harness::new();
    h.login("   ").await;

    assert!(!h.state.session.is_logged_in());
    assert_eq!(h.state.login_error(), Some("Username is required"));

    h.login(" alice ").await;
    assert_eq!(h.state.session.identity(), Some("alice"));
    assert!(h.state.login_error().is_none());
}

#[tokio::test]
async fn orders_refetch_for_the_new_identity_after_relogin() {
    let mut h = Harness::new();
    let alice_order = h.gateway.seed_order("p-1", "alice", "carol", "pending").await;
    let bob_order = h.gateway.seed_order("p-2", "bob", "dave", "processing").await;

    h.login("alice").await;
    h.send(Intent::SelectView(View::Orders)).await;
    assert!(h.state.orders.order(&OrderId::from(alice_order.as_str())).is_some());

    h.send(Intent::Logout).await;
    h.login("bob").await;
    let commands = h.state.dispatch(Intent::SelectView(View::Orders), h.now);
    assert!(matches!(
        commands.as_slice(),
        [Command::FetchOrders { seller, .. }] if seller == "bob"
    ));
    h.drain(commands).await;

    let sellers: Vec<&str> = h
        .state
        .orders
        .orders()
        .iter()
        .map(|o| o.seller_username.as_str())
        .collect();
    assert_eq!(sellers, vec!["bob"]);
    assert_eq!(h.order_status(&bob_order), OrderStatus::Processing);
    assert!(h.state.orders.order(&OrderId::from(alice_order.as_str())).is_none());
}

#[tokio::test]
async fn orders_fetched_before_logout_are_ignored_after_relogin() {
    let mut h = Harness::new();
    h.gateway.seed_order("p-1", "alice", "carol", "pending").await;
    let bob_order = h.gateway.seed_order("p-2", "bob", "dave", "pending").await;

    h.login("alice").await;
    let late = h.state.dispatch(Intent::SelectView(View::Orders), h.now);
    let late_completion = execute(&h.store, late[0].clone()).await;

    h.send(Intent::Logout).await;
    h.login("bob").await;
    h.send(Intent::SelectView(View::Orders)).await;

    let follow_up = h.state.apply(late_completion, h.now);
    assert!(follow_up.is_empty());
    let sellers: Vec<&str> = h
        .state
        .orders
        .orders()
        .iter()
        .map(|o| o.seller_username.as_str())
        .collect();
    assert_eq!(sellers, vec!["bob"]);
    assert_eq!(h.order_status(&bob_order), OrderStatus::Pending);
}
