use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::api::{ApiError, RestClient};
use crate::domain::Category;

use super::Lookup;

/// Category typeahead: categories whose name matches the typed text.
pub struct CategorySearch {
    client: Arc<RestClient>,
}

impl CategorySearch {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Lookup for CategorySearch {
    type Query = String;
    type Output = Vec<Category>;

    async fn lookup(&self, query: String) -> Result<Vec<Category>, ApiError> {
        self.client.search_categories(query.trim()).await
    }

    fn failure_message(&self) -> &'static str {
        "Unable to search categories"
    }

    fn is_empty(&self, query: &String) -> bool {
        query.trim().is_empty()
    }
}

/// Input of the "report already exists for this date" validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDateQuery {
    pub date: NaiveDate,
    pub company_id: Option<String>,
}

/// Async validator: resolves to `true` when the date is already taken.
pub struct ReportDateExists {
    client: Arc<RestClient>,
}

impl ReportDateExists {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Lookup for ReportDateExists {
    type Query = ReportDateQuery;
    type Output = bool;

    async fn lookup(&self, query: ReportDateQuery) -> Result<bool, ApiError> {
        self.client
            .report_date_exists(query.date, query.company_id.as_deref())
            .await
    }

    fn failure_message(&self) -> &'static str {
        "Unable to check report date"
    }
}
