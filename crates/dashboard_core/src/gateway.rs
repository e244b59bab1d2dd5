//! Boundary over the remote store's table API.
//!
//! [`Gateway`] works on raw JSON rows so it stays object-safe; typed access
//! lives in [`crate::store::SellerStore`]. [`RestGateway`] is the production
//! implementation and speaks the PostgREST dialect exposed by Supabase.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use shared::{error::DashboardError, protocol::RemoteErrorBody};
use tracing::{error, info};
use url::Url;

use crate::config::Settings;

const ID_COLUMN: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Products,
    Orders,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Orders => "orders",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    /// Recency-first ordering used by every dashboard listing.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Column list / embedded resources, `*` when unset.
    pub select: Option<String>,
    pub filter: Option<EqFilter>,
    pub order_by: Option<OrderBy>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter = Some(EqFilter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![(
            "select".to_string(),
            self.select.clone().unwrap_or_else(|| "*".to_string()),
        )];
        if let Some(filter) = &self.filter {
            params.push((filter.column.clone(), format!("eq.{}", filter.value)));
        }
        if let Some(order_by) = &self.order_by {
            let direction = if order_by.ascending { "asc" } else { "desc" };
            params.push((
                "order".to_string(),
                format!("{}.{direction}", order_by.column),
            ));
        }
        params
    }
}

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Rows matching `query`; an empty vector when nothing matches.
    async fn list(&self, table: Table, query: &ListQuery) -> Result<Vec<Value>, DashboardError>;
    /// Inserts one row and returns it with server-assigned columns filled in.
    async fn insert(&self, table: Table, row: Value) -> Result<Value, DashboardError>;
    /// Applies `patch` to the row with `id`; `NotFound` when no row matches.
    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<Value, DashboardError>;
    /// Removes the row with `id`; `NotFound` when no row matches.
    async fn delete(&self, table: Table, id: &str) -> Result<(), DashboardError>;
}

pub struct RestGateway {
    http: Client,
    rest_base: String,
    access_key: String,
}

impl RestGateway {
    pub fn new(settings: &Settings) -> Result<Self, DashboardError> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| {
                DashboardError::Transport(format!("failed to build http client: {err}"))
            })?;
        Ok(Self::with_client(
            http,
            &settings.endpoint_url,
            settings.access_key.clone(),
        ))
    }

    pub fn with_client(http: Client, endpoint_url: &Url, access_key: impl Into<String>) -> Self {
        Self {
            http,
            rest_base: format!("{}/rest/v1", endpoint_url.as_str().trim_end_matches('/')),
            access_key: access_key.into(),
        }
    }

    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.rest_base, table.name()))
            .header("apikey", &self.access_key)
            .bearer_auth(&self.access_key)
    }

    fn mutation(&self, method: Method, table: Table) -> RequestBuilder {
        self.request(method, table)
            .header("Prefer", "return=representation")
    }

    async fn send(
        &self,
        table: Table,
        op: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, DashboardError> {
        let response = request.send().await.map_err(|err| {
            error!(table = table.name(), op, "gateway: transport failure: {err}");
            DashboardError::Transport(err.to_string())
        })?;
        let response = ensure_success(response).await;
        if let Err(err) = &response {
            error!(table = table.name(), op, "gateway: {op} failed: {err}");
        }
        response
    }
}

#[async_trait]
impl Gateway for RestGateway {
    async fn list(&self, table: Table, query: &ListQuery) -> Result<Vec<Value>, DashboardError> {
        let request = self.request(Method::GET, table).query(&query.to_params());
        let rows = read_rows(self.send(table, "list", request).await?).await?;
        info!(table = table.name(), rows = rows.len(), "gateway: list");
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, DashboardError> {
        let request = self
            .mutation(Method::POST, table)
            .json(&Value::Array(vec![row]));
        let rows = read_rows(self.send(table, "insert", request).await?).await?;
        let inserted = rows.into_iter().next().ok_or_else(|| {
            DashboardError::Query(format!("insert into {table} returned no row"))
        })?;
        info!(table = table.name(), "gateway: insert");
        Ok(inserted)
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<Value, DashboardError> {
        let request = self
            .mutation(Method::PATCH, table)
            .query(&[(ID_COLUMN, format!("eq.{id}"))])
            .json(&patch);
        let rows = read_rows(self.send(table, "update", request).await?).await?;
        let updated = rows
            .into_iter()
            .next()
            .ok_or_else(|| missing_row(table, id))?;
        info!(table = table.name(), id, "gateway: update");
        Ok(updated)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), DashboardError> {
        let request = self
            .mutation(Method::DELETE, table)
            .query(&[(ID_COLUMN, format!("eq.{id}"))]);
        let rows = read_rows(self.send(table, "delete", request).await?).await?;
        if rows.is_empty() {
            return Err(missing_row(table, id));
        }
        info!(table = table.name(), id, "gateway: delete");
        Ok(())
    }
}

pub(crate) fn missing_row(table: Table, id: &str) -> DashboardError {
    DashboardError::NotFound(format!("no row in {table} with id {id}"))
}

async fn read_rows(response: Response) -> Result<Vec<Value>, DashboardError> {
    let body = response.json::<Value>().await.map_err(|err| {
        if err.is_decode() {
            DashboardError::Query(format!("malformed response from remote store: {err}"))
        } else {
            DashboardError::Transport(format!("response body interrupted: {err}"))
        }
    })?;
    match body {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

async fn ensure_success(response: Response) -> Result<Response, DashboardError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body =
        serde_json::from_str::<RemoteErrorBody>(&text).unwrap_or_else(|_| RemoteErrorBody {
            message: text.trim().to_string(),
            ..RemoteErrorBody::default()
        });
    Err(classify_failure(status, &body))
}

/// Maps a non-success response onto the dashboard error taxonomy.
///
/// PostgreSQL SQLSTATE classes 22 (data exception) and 23 (integrity
/// constraint violation) are rejected writes; everything else is a query
/// failure carrying the remote message verbatim.
pub(crate) fn classify_failure(status: StatusCode, body: &RemoteErrorBody) -> DashboardError {
    let message = if body.message.is_empty() {
        format!("remote store returned {status}")
    } else {
        body.message.clone()
    };

    let constraint = body
        .code
        .as_deref()
        .is_some_and(|code| code.starts_with("22") || code.starts_with("23"));

    if status == StatusCode::CONFLICT || constraint {
        DashboardError::Validation(message)
    } else {
        DashboardError::Query(message)
    }
}
