//! # Supabase
//!
//! Hosted Postgres behind PostgREST, owned by the scraper. Read only from here.
//!
//! ## Query
//! - `GET {url}/rest/v1/{table}?select=*` for a full scan
//! - `&order=ville.asc` when the caller wants rows by city
//! - `apikey` and bearer headers both carry the anon key
//!
//! ## Client
//! - One `reqwest::Client` built at startup and shared behind `Arc`
//! - No retry, no pagination, the default client timeouts apply
use std::cmp::Ordering;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::ACCEPT};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{config::Config, models::Row};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Data store returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Malformed data store response: {0}")]
    Decode(String),
}

/// Table-scoped read access: select every column, optionally ordered by one.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn fetch_rows(&self, order_by: Option<&str>) -> Result<Vec<Row>, StoreError>;
}

pub struct SupabaseStore {
    client: Client,
    base_url: String,
    key: String,
    table: String,
}

impl SupabaseStore {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            key: config.supabase_key.clone(),
            table: config.table.clone(),
        })
    }

    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

fn select_query(order_by: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("select", "*".to_string())];

    if let Some(column) = order_by {
        query.push(("order", format!("{column}.asc")));
    }

    query
}

#[async_trait]
impl RestaurantStore for SupabaseStore {
    async fn fetch_rows(&self, order_by: Option<&str>) -> Result<Vec<Row>, StoreError> {
        let url = self.table_url();
        debug!("Fetching {url} ordered by {order_by:?}");

        let response = self
            .client
            .get(&url)
            .query(&select_query(order_by))
            .header("apikey", &self.key)
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let rows = rows_from_value(response.json().await?)?;
        debug!("Fetched {} rows from {}", rows.len(), self.table);

        Ok(rows)
    }
}

pub fn rows_from_value(value: Value) -> Result<Vec<Row>, StoreError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(StoreError::Decode(format!(
                "expected an array of rows, got {other}"
            )));
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(row) => Ok(row),
            other => Err(StoreError::Decode(format!(
                "expected an object row, got {other}"
            ))),
        })
        .collect()
}

/// In-process store over a fixed snapshot. Test double for `SupabaseStore`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Vec<Row>,
    failure: Option<String>,
}

impl MemoryStore {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            failure: None,
        }
    }

    /// A store whose every fetch answers 503 with `message` as the body.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            failure: Some(message.into()),
        }
    }
}

#[async_trait]
impl RestaurantStore for MemoryStore {
    async fn fetch_rows(&self, order_by: Option<&str>) -> Result<Vec<Row>, StoreError> {
        if let Some(message) = &self.failure {
            return Err(StoreError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: message.clone(),
            });
        }

        let mut rows = self.rows.clone();
        if let Some(column) = order_by {
            rows.sort_by(|a, b| compare_cells(a.get(column), b.get(column)));
        }

        Ok(rows)
    }
}

// Ascending with nulls last, like PostgREST's default.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
    }
}
