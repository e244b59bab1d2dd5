use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{
    domain::{OrderId, ProductId},
    error::DashboardError,
    protocol::{NewProduct, Order, OrderPatch, Product},
};
use tracing::warn;

use crate::gateway::{Gateway, ListQuery, OrderBy, Table};

const CREATED_AT: &str = "created_at";
const SELLER_USERNAME: &str = "seller_username";
const ORDERS_WITH_PRODUCT: &str = "*,products(*)";

/// Typed operations the dashboard views issue against the gateway.
#[derive(Clone)]
pub struct SellerStore {
    gateway: Arc<dyn Gateway>,
}

impl SellerStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// All products, most recently created first.
    pub async fn list_products(&self) -> Result<Vec<Product>, DashboardError> {
        let query = ListQuery::new().order_by(OrderBy::desc(CREATED_AT));
        let rows = self.gateway.list(Table::Products, &query).await?;
        decode_rows(Table::Products, rows)
    }

    pub async fn insert_product(&self, product: &NewProduct) -> Result<Product, DashboardError> {
        let row = self
            .gateway
            .insert(Table::Products, encode(product)?)
            .await?;
        decode(Table::Products, row)
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<(), DashboardError> {
        self.gateway.delete(Table::Products, id.as_str()).await
    }

    /// Orders placed against `seller`'s products, joined with the product row.
    pub async fn list_orders_for_seller(&self, seller: &str) -> Result<Vec<Order>, DashboardError> {
        let query = ListQuery::new()
            .select(ORDERS_WITH_PRODUCT)
            .eq(SELLER_USERNAME, seller)
            .order_by(OrderBy::desc(CREATED_AT));
        let rows = self.gateway.list(Table::Orders, &query).await?;
        decode_rows(Table::Orders, rows)
    }

    pub async fn update_order(
        &self,
        id: &OrderId,
        patch: &OrderPatch,
    ) -> Result<Order, DashboardError> {
        if patch.is_empty() {
            return Err(DashboardError::user_input("order update has no changes"));
        }
        let row = self
            .gateway
            .update(Table::Orders, id.as_str(), encode(patch)?)
            .await?;
        decode(Table::Orders, row)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, DashboardError> {
    serde_json::to_value(value)
        .map_err(|err| DashboardError::UserInput(format!("could not encode row: {err}")))
}

fn decode<T: DeserializeOwned>(table: Table, row: Value) -> Result<T, DashboardError> {
    serde_json::from_value(row).map_err(|err| {
        warn!(table = table.name(), "store: undecodable row: {err}");
        DashboardError::Query(format!("unexpected {table} row from remote store: {err}"))
    })
}

fn decode_rows<T: DeserializeOwned>(
    table: Table,
    rows: Vec<Value>,
) -> Result<Vec<T>, DashboardError> {
    rows.into_iter().map(|row| decode(table, row)).collect()
}
