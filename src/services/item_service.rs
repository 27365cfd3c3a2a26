use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::{
    db::{
        entities::item,
        store::{ItemChanges, ItemStore, NewItem},
    },
    error::ItemError,
    query::{CompletionFilter, ListParams, SortKey, SortOrder, matches_search},
};

/// Inclusive cap on the trimmed name, counted in Unicode scalar values.
pub const NAME_MAX_CHARS: usize = 200;

/// Raw create/replace payload. All fields are optional at this layer so that
/// a missing name surfaces as a validation error, not a deserialization one.
#[derive(Debug, Default)]
pub struct ItemInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<String>,
}

pub async fn create(store: &dyn ItemStore, input: ItemInput) -> Result<item::Model, ItemError> {
    let name = validate_name(input.name.as_deref())?;
    let due_date = parse_due_date(input.due_date.as_deref())?;
    let model = store
        .insert(NewItem {
            name,
            description: input.description,
            due_date,
        })
        .await?;
    Ok(model)
}

pub async fn get(store: &dyn ItemStore, id: i64) -> Result<item::Model, ItemError> {
    store.fetch(id).await?.ok_or(ItemError::NotFound)
}

/// The list pipeline: the store returns rows already sorted, then the
/// completion filter and the search predicate run over them in that order,
/// both preserving the sorted sequence. Never fails on a well-formed query;
/// unrecognized filter/sort/order values degrade to their defaults.
pub async fn list(
    store: &dyn ItemStore,
    params: &ListParams,
) -> Result<Vec<item::Model>, ItemError> {
    let sort = SortKey::parse(params.sort.as_deref());
    let order = SortOrder::parse(params.order.as_deref());
    let filter = CompletionFilter::parse(params.filter.as_deref());

    let mut items = store.fetch_sorted(sort, order).await?;
    items.retain(|item| filter.keeps(item.completed));

    if let Some(search) = &params.search {
        let needle = search.trim().to_lowercase();
        if !needle.is_empty() {
            items.retain(|item| matches_search(item, &needle));
        }
    }

    Ok(items)
}

pub async fn replace(
    store: &dyn ItemStore,
    id: i64,
    input: ItemInput,
) -> Result<item::Model, ItemError> {
    // The id must resolve before the body is validated: a missing item is
    // NotFound even when the payload is invalid.
    store.fetch(id).await?.ok_or(ItemError::NotFound)?;
    let name = validate_name(input.name.as_deref())?;
    let due_date = parse_due_date(input.due_date.as_deref())?;
    store
        .replace(
            id,
            ItemChanges {
                name,
                description: input.description,
                completed: input.completed,
                due_date,
            },
        )
        .await?
        .ok_or(ItemError::NotFound)
}

pub async fn toggle(store: &dyn ItemStore, id: i64) -> Result<item::Model, ItemError> {
    store.toggle(id).await?.ok_or(ItemError::NotFound)
}

/// Returns the deleted id as confirmation. There is no soft delete; a second
/// call for the same id is `NotFound`.
pub async fn delete(store: &dyn ItemStore, id: i64) -> Result<i64, ItemError> {
    if store.remove(id).await? {
        Ok(id)
    } else {
        Err(ItemError::NotFound)
    }
}

fn validate_name(name: Option<&str>) -> Result<String, ItemError> {
    let trimmed = name.unwrap_or_default().trim();
    if trimmed.is_empty() {
        return Err(ItemError::NameRequired);
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        return Err(ItemError::NameTooLong);
    }
    Ok(trimmed.to_string())
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` timestamp, or a bare
/// `YYYY-MM-DD` date (read as midnight UTC). A blank string counts as absent;
/// anything else is rejected before any write.
fn parse_due_date(raw: Option<&str>) -> Result<Option<DateTimeWithTimeZone>, ItemError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(parsed.and_utc().fixed_offset()));
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(parsed.and_time(NaiveTime::MIN).and_utc().fixed_offset()));
    }
    Err(ItemError::InvalidDueDate)
}
