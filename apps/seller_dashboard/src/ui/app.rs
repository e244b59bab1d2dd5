use std::{
    collections::{HashMap, HashSet},
    fmt,
    time::{Duration, Instant},
};

use chrono::{DateTime, TimeZone};
use crossbeam_channel::{Receiver, Sender};
use dashboard_core::{
    listing_form::SUCCESS_MESSAGE, products_view::DELETE_CONFIRMATION, DashboardState, Intent,
    OrdersDisplay, ProductsDisplay,
};
use eframe::egui;
use rust_decimal::{Decimal, RoundingStrategy};
use shared::{
    domain::{Category, OrderStatus, View},
    protocol::{Order, Product},
};
use tracing::{error, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiEvent},
    orchestration::{dispatch_backend_command, dispatch_dashboard_commands},
};

const THUMBNAIL_SIZE: egui::Vec2 = egui::vec2(96.0, 96.0);
const ACCENT: egui::Color32 = egui::Color32::from_rgb(22, 163, 74);
const ERROR_FILL: egui::Color32 = egui::Color32::from_rgb(111, 53, 53);

enum ThumbnailSlot {
    Loading,
    Ready(egui::TextureHandle),
    /// Download or decode failed; the reason is shown on hover.
    Missing(String),
}

pub struct SellerDashboardApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: DashboardState,
    username_input: String,
    status: String,
    fatal_error: Option<UiError>,
    thumbnails: HashMap<String, ThumbnailSlot>,
}

impl SellerDashboardApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            state: DashboardState::new(),
            username_input: String::new(),
            status: String::new(),
            fatal_error: None,
            thumbnails: HashMap::new(),
        }
    }

    fn send(&mut self, intent: Intent) {
        if intent == Intent::Logout {
            self.thumbnails.clear();
        }
        let now = Instant::now();
        let commands = self.state.dispatch(intent, now);
        dispatch_dashboard_commands(
            &self.cmd_tx,
            &mut self.state,
            commands,
            &mut self.status,
            now,
        );
    }

    fn process_ui_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Error(err) => {
                    error!(
                        category = ?err.category(),
                        context = ?err.context(),
                        "backend error: {}",
                        err.message()
                    );
                    if err.is_fatal() {
                        self.fatal_error = Some(err);
                    } else {
                        self.status = err.message().to_string();
                    }
                }
                UiEvent::Completed(completion) => {
                    let now = Instant::now();
                    let commands = self.state.apply(completion, now);
                    dispatch_dashboard_commands(
                        &self.cmd_tx,
                        &mut self.state,
                        commands,
                        &mut self.status,
                        now,
                    );
                }
                UiEvent::ImageLoaded { url, image } => {
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(
                        [image.width, image.height],
                        &image.rgba,
                    );
                    let texture = ctx.load_texture(
                        format!("product-thumbnail:{url}"),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    );
                    self.thumbnails.insert(url, ThumbnailSlot::Ready(texture));
                }
                UiEvent::ImageFailed { url, error } => {
                    warn!(
                        %url,
                        category = ?error.category(),
                        context = ?error.context(),
                        "thumbnail unavailable: {}",
                        error.message()
                    );
                    self.thumbnails
                        .insert(url, ThumbnailSlot::Missing(error.message().to_string()));
                }
            }
        }
    }

    /// Drops textures of products no longer listed and queues downloads for
    /// images not seen before. A URL is only marked loading once its request
    /// is queued, so anything that did not fit is retried next frame.
    fn request_thumbnails(&mut self) {
        let listed = match self.state.products.display() {
            ProductsDisplay::Rows(products) => products,
            ProductsDisplay::Empty => &[][..],
            ProductsDisplay::Loading | ProductsDisplay::Error(_) => return,
        };
        let live: HashSet<&str> = listed.iter().map(|p| p.image.as_str()).collect();
        retain_listed(&mut self.thumbnails, &live);

        let missing: Vec<String> = live
            .iter()
            .filter(|url| !self.thumbnails.contains_key(**url))
            .map(|url| url.to_string())
            .collect();
        for url in missing {
            let queued = dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::FetchImage { url: url.clone() },
                &mut self.status,
            );
            if queued.is_err() {
                break;
            }
            self.thumbnails.insert(url, ThumbnailSlot::Loading);
        }
    }

    fn show_fatal_error(&self, ctx: &egui::Context, err: &UiError) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(40.0);
            ui.vertical_centered(|ui| {
                ui.heading("Seller Dashboard is unavailable");
                ui.add_space(8.0);
                ui.label(err.message());
                ui.weak("Check the connection settings and restart the dashboard.");
            });
        });
    }

    fn show_login_screen(&mut self, ctx: &egui::Context) {
        let mut submitted = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            let avail = ui.available_size();
            let card_width = avail.x.clamp(360.0, 460.0);
            ui.add_space((avail.y * 0.18).clamp(18.0, 120.0));

            ui.vertical_centered(|ui| {
                ui.set_width(card_width);
                egui::Frame::NONE
                    .fill(ui.visuals().faint_bg_color)
                    .corner_radius(14.0)
                    .stroke(egui::Stroke::new(
                        1.0,
                        ui.visuals().widgets.noninteractive.bg_stroke.color,
                    ))
                    .inner_margin(egui::Margin::symmetric(20, 18))
                    .show(ui, |ui| {
                        ui.style_mut().spacing.item_spacing = egui::vec2(10.0, 10.0);
                        ui.heading("Seller Dashboard");
                        ui.weak("Sign in to manage your products and orders.");

                        ui.label(egui::RichText::new("Username").strong());
                        let response = ui.add_sized(
                            [ui.available_width(), 32.0],
                            egui::TextEdit::singleline(&mut self.username_input)
                                .id_salt("login_username")
                                .hint_text("Enter your username"),
                        );
                        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))
                        {
                            submitted = true;
                        }

                        if let Some(message) = self.state.login_error() {
                            ui.colored_label(egui::Color32::from_rgb(220, 38, 38), message);
                        }

                        let button = egui::Button::new(egui::RichText::new("Sign in").strong())
                            .min_size(egui::vec2(ui.available_width(), 34.0));
                        if ui.add(button).clicked() {
                            submitted = true;
                        }
                    });
            });
        });

        if submitted {
            let username = self.username_input.clone();
            self.send(Intent::Login { username });
        }
    }

    fn show_dashboard(&mut self, ctx: &egui::Context) {
        let mut intent = None;

        egui::TopBottomPanel::top("dashboard_header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading("Seller Dashboard");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Logout").clicked() {
                        intent = Some(Intent::Logout);
                    }
                    if let Some(name) = self.state.session.identity() {
                        ui.label(format!("Welcome, {name}"));
                    }
                });
            });
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let active = self.state.session.active_view();
                for view in View::ALL {
                    if ui.selectable_label(active == view, view.label()).clicked() {
                        intent = Some(Intent::SelectView(view));
                    }
                }
            });
            ui.add_space(4.0);
        });

        if !self.status.is_empty() {
            egui::TopBottomPanel::bottom("status_strip").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.small(egui::RichText::new(&self.status).weak());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("Dismiss").clicked() {
                            self.status.clear();
                        }
                    });
                });
            });
        }

        if self.state.session.active_view() == View::Products {
            self.request_thumbnails();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.form.success_visible() {
                banner(ui, ACCENT, SUCCESS_MESSAGE);
                ui.add_space(8.0);
            }
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let picked = match self.state.session.active_view() {
                        View::List => self.show_listing_form(ui),
                        View::Products => self.show_products(ui),
                        View::Orders => self.show_orders(ui),
                    };
                    if picked.is_some() {
                        intent = picked;
                    }
                });
        });

        if let Some(picked) = self.show_dialogs(ctx) {
            intent = Some(picked);
        }
        if let Some(intent) = intent {
            self.send(intent);
        }
    }

    fn show_listing_form(&mut self, ui: &mut egui::Ui) -> Option<Intent> {
        let submitting = self.state.form.is_submitting();
        ui.heading("List a New Product");
        ui.add_space(8.0);

        let fields = &mut self.state.form.fields;
        ui.add_enabled_ui(!submitting, |ui| {
            egui::Grid::new("listing_form_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    form_row(ui, "Username", "Your seller name", &mut fields.username);
                    form_row(ui, "Product Name", "Enter product name", &mut fields.name);
                    form_row(ui, "Price ($)", "0.00", &mut fields.price);
                    form_row(ui, "Original Price ($)", "0.00", &mut fields.original_price);
                    form_row(ui, "Brand", "Enter brand name", &mut fields.brand);

                    ui.label("Category");
                    egui::ComboBox::from_id_salt("listing_category")
                        .selected_text(
                            fields
                                .category
                                .map(Category::label)
                                .unwrap_or("Select a category"),
                        )
                        .show_ui(ui, |ui| {
                            for category in Category::ALL {
                                ui.selectable_value(
                                    &mut fields.category,
                                    Some(category),
                                    category.label(),
                                );
                            }
                        });
                    ui.end_row();

                    form_row(ui, "Image URL", "https://example.com/image.jpg", &mut fields.image);
                });
        });

        ui.add_space(8.0);
        if let Some(message) = self.state.form.error() {
            banner(ui, ERROR_FILL, message);
            ui.add_space(8.0);
        }

        let button = egui::Button::new(egui::RichText::new(self.state.form.submit_label()).strong())
            .min_size(egui::vec2(180.0, 34.0));
        if ui.add_enabled(!submitting, button).clicked() {
            return Some(Intent::SubmitProduct);
        }
        None
    }

    fn show_products(&self, ui: &mut egui::Ui) -> Option<Intent> {
        let mut intent = None;
        ui.horizontal(|ui| {
            ui.heading("Listed Products");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    intent = Some(Intent::RefreshProducts);
                }
            });
        });
        ui.add_space(8.0);

        match self.state.products.display() {
            ProductsDisplay::Loading => {
                ui.spinner();
            }
            ProductsDisplay::Error(message) => banner(ui, ERROR_FILL, message),
            ProductsDisplay::Empty => {
                empty_state(ui, "No Products Listed", "Start by listing your first product!")
            }
            ProductsDisplay::Rows(products) => {
                for product in products {
                    let thumbnail = self.thumbnails.get(&product.image);
                    if let Some(picked) = product_card(ui, product, thumbnail) {
                        intent = Some(picked);
                    }
                    ui.add_space(8.0);
                }
            }
        }
        intent
    }

    fn show_orders(&self, ui: &mut egui::Ui) -> Option<Intent> {
        let mut intent = None;
        ui.horizontal(|ui| {
            ui.heading("Active Orders");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    intent = Some(Intent::RefreshOrders);
                }
            });
        });
        ui.add_space(8.0);

        match self.state.orders.display() {
            OrdersDisplay::Loading => {
                ui.spinner();
            }
            OrdersDisplay::Error(message) => banner(ui, ERROR_FILL, message),
            OrdersDisplay::Empty => {
                empty_state(ui, "No Orders Yet", "Orders for your products will appear here")
            }
            OrdersDisplay::Rows(orders) => {
                for order in orders {
                    if let Some(picked) = order_card(ui, order) {
                        intent = Some(picked);
                    }
                    ui.add_space(8.0);
                }
            }
        }
        intent
    }

    /// Delete confirmation and failure alerts. Both block the views behind them.
    fn show_dialogs(&self, ctx: &egui::Context) -> Option<Intent> {
        let mut intent = None;

        if self.state.products.pending_delete().is_some() {
            let response = egui::Modal::new(egui::Id::new("delete_confirmation")).show(ctx, |ui| {
                ui.set_width(320.0);
                ui.heading("Delete Product");
                ui.label(DELETE_CONFIRMATION);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        intent = Some(Intent::ConfirmDeleteProduct);
                    }
                    if ui.button("Cancel").clicked() {
                        intent = Some(Intent::CancelDeleteProduct);
                    }
                });
            });
            if intent.is_none() && response.should_close() {
                intent = Some(Intent::CancelDeleteProduct);
            }
        }

        let alert = self
            .state
            .products
            .alert()
            .or_else(|| self.state.orders.alert());
        if let Some(message) = alert {
            let response = egui::Modal::new(egui::Id::new("failure_alert")).show(ctx, |ui| {
                ui.set_width(320.0);
                ui.heading("Something went wrong");
                ui.label(message);
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    intent = Some(Intent::DismissAlert);
                }
            });
            if intent.is_none() && response.should_close() {
                intent = Some(Intent::DismissAlert);
            }
        }
        intent
    }
}

impl eframe::App for SellerDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events(ctx);
        if self.state.form.success_visible() {
            self.send(Intent::Tick);
        }

        if let Some(err) = self.fatal_error.clone() {
            self.show_fatal_error(ctx, &err);
        } else if self.state.session.is_logged_in() {
            self.show_dashboard(ctx);
        } else {
            self.show_login_screen(ctx);
        }

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

fn form_row(ui: &mut egui::Ui, label: &str, hint: &str, value: &mut String) {
    ui.label(label);
    ui.add(
        egui::TextEdit::singleline(value)
            .hint_text(hint)
            .desired_width(320.0),
    );
    ui.end_row();
}

fn banner(ui: &mut egui::Ui, fill: egui::Color32, message: &str) {
    egui::Frame::NONE
        .fill(fill)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
        });
}

fn empty_state(ui: &mut egui::Ui, title: &str, hint: &str) {
    ui.add_space(40.0);
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new(title).strong().size(18.0));
        ui.weak(hint);
    });
}

fn pill(ui: &mut egui::Ui, text: impl Into<String>, color: egui::Color32) {
    egui::Frame::NONE
        .fill(color.gamma_multiply(0.2))
        .corner_radius(10.0)
        .inner_margin(egui::Margin::symmetric(8, 2))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).small().strong().color(color));
        });
}

fn card(ui: &egui::Ui) -> egui::Frame {
    egui::Frame::NONE
        .fill(ui.visuals().faint_bg_color)
        .corner_radius(10.0)
        .stroke(egui::Stroke::new(
            1.0,
            ui.visuals().widgets.noninteractive.bg_stroke.color,
        ))
        .inner_margin(egui::Margin::symmetric(12, 10))
}

fn thumbnail_view(ui: &mut egui::Ui, slot: Option<&ThumbnailSlot>) {
    match slot {
        Some(ThumbnailSlot::Ready(texture)) => {
            ui.add(egui::Image::new(texture).fit_to_exact_size(THUMBNAIL_SIZE));
        }
        Some(ThumbnailSlot::Loading) => {
            placeholder(ui, "Loading...");
        }
        Some(ThumbnailSlot::Missing(reason)) => {
            placeholder(ui, "No Image").on_hover_text(reason);
        }
        None => {
            placeholder(ui, "No Image");
        }
    }
}

fn retain_listed<T>(slots: &mut HashMap<String, T>, live: &HashSet<&str>) {
    slots.retain(|url, _| live.contains(url.as_str()));
}

fn placeholder(ui: &mut egui::Ui, text: &str) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(THUMBNAIL_SIZE, egui::Sense::hover());
    let visuals = ui.visuals();
    ui.painter()
        .rect_filled(rect, 8.0, visuals.extreme_bg_color);
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(12.0),
        visuals.weak_text_color(),
    );
    response
}

fn product_card(
    ui: &mut egui::Ui,
    product: &Product,
    thumbnail: Option<&ThumbnailSlot>,
) -> Option<Intent> {
    let mut intent = None;
    card(ui).show(ui, |ui| {
        ui.horizontal(|ui| {
            thumbnail_view(ui, thumbnail);
            ui.vertical(|ui| {
                pill(ui, product.category.label(), ACCENT);
                ui.label(egui::RichText::new(&product.name).strong().size(16.0));
                ui.label(&product.brand);
                ui.small(format!("Seller: {}", product.username));
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format_money(product.price))
                            .strong()
                            .color(ACCENT),
                    );
                    if product.shows_original_price() {
                        ui.label(
                            egui::RichText::new(format_money(product.original_price))
                                .strikethrough()
                                .weak(),
                        );
                    }
                });
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                if ui.button("🗑 Delete").clicked() {
                    intent = Some(Intent::RequestDeleteProduct(product.id.clone()));
                }
            });
        });
    });
    intent
}

fn order_card(ui: &mut egui::Ui, order: &Order) -> Option<Intent> {
    let mut intent = None;
    card(ui).show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(order.product_name()).strong().size(16.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (icon, color) = status_badge(order.status);
                pill(ui, order.status.label(), color);
                ui.label(egui::RichText::new(icon).color(color));
            });
        });
        ui.label(format!("Buyer: {}", order.buyer_name));
        ui.label(format!("Quantity: {}", order.quantity));
        ui.label(format!("Total: {}", format_money(order.total_price)));
        ui.small(format!(
            "Order placed: {}",
            format_order_date(&order.created_at.with_timezone(&chrono::Local))
        ));

        if !order.status.is_terminal() {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                for &action in order.status.available_actions() {
                    if ui.button(action.label()).clicked() {
                        intent = Some(Intent::TransitionOrder {
                            order_id: order.id.clone(),
                            action,
                        });
                    }
                }
            });
        }
    });
    intent
}

/// Dollar amount rounded half away from zero to cents.
fn format_money(amount: Decimal) -> String {
    let cents = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${cents:.2}")
}

fn format_order_date<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.format("%-m/%-d/%Y").to_string()
}

fn status_badge(status: OrderStatus) -> (&'static str, egui::Color32) {
    match status {
        OrderStatus::Pending => ("🕒", egui::Color32::from_rgb(202, 138, 4)),
        OrderStatus::Processing => ("📦", egui::Color32::from_rgb(37, 99, 235)),
        OrderStatus::Completed => ("✔", egui::Color32::from_rgb(22, 163, 74)),
        OrderStatus::Cancelled => ("✖", egui::Color32::from_rgb(220, 38, 38)),
    }
}
