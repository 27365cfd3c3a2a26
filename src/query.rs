use sea_orm::Order;
use serde::Deserialize;

use crate::db::entities::item;

/// Raw query string of `GET /items`. Values are kept as strings so that
/// unrecognized input degrades to defaults instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
}

/// Field an item listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// `created_at`, ties broken by insertion order.
    #[default]
    Created,
    /// `due_date`; items without one sort after all dated items in both
    /// directions.
    Date,
    /// `name`, case-insensitive.
    Name,
}

impl SortKey {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("date") => Self::Date,
            Some("name") => Self::Name,
            _ => Self::Created,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

impl From<SortOrder> for Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

/// Predicate over the `completed` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionFilter {
    #[default]
    All,
    Complete,
    Incomplete,
}

impl CompletionFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("complete") => Self::Complete,
            Some("incomplete") => Self::Incomplete,
            _ => Self::All,
        }
    }

    pub fn keeps(&self, completed: bool) -> bool {
        match self {
            CompletionFilter::All => true,
            CompletionFilter::Complete => completed,
            CompletionFilter::Incomplete => !completed,
        }
    }
}

/// Substring match over name and description. `needle` must already be
/// trimmed and lowercased by the caller.
pub fn matches_search(item: &item::Model, needle: &str) -> bool {
    item.name.to_lowercase().contains(needle)
        || item
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(needle))
}
