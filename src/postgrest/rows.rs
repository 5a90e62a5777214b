//! Row shapes of the `tasks` and `medicines` tables

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::model::{DraftKind, Item, ItemId, ItemKind, ItemPatch, NewItem, OwnerId, Priority};

/// Which row layout a table uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSchema {
    /// `title`, `description`, `completed`, `priority`, `due_date`
    Tasks,
    /// `name`, `barcode`, `expiry_date`
    Medicines,
}

impl TableSchema {
    /// Body of the insert request for `item`
    pub(crate) fn insert_body(&self, item: &NewItem) -> Result<Value> {
        match (self, &item.kind) {
            (TableSchema::Tasks, DraftKind::Task { priority }) => Ok(json!({
                "user_id": item.owner_id,
                "title": item.title,
                "description": item.description,
                "completed": false,
                "priority": priority,
                "due_date": item.target_date,
            })),
            (TableSchema::Medicines, DraftKind::Medicine { barcode }) => {
                let expiry = item
                    .target_date
                    .ok_or_else(|| Error::validation("medicines need an expiry date"))?;
                Ok(json!({
                    "user_id": item.owner_id,
                    "name": item.title,
                    "barcode": barcode,
                    "expiry_date": expiry,
                }))
            }
            (schema, kind) => Err(Error::validation(format!(
                "{:?} draft cannot be stored in the {:?} table",
                kind, schema
            ))),
        }
    }

    /// Body of the update request for `patch`
    pub(crate) fn patch_body(&self, patch: &ItemPatch) -> Result<Value> {
        let mut body = Map::new();
        match self {
            TableSchema::Tasks => {
                if patch.barcode.is_some() {
                    return Err(Error::validation("tasks do not have a barcode"));
                }
                insert_some(&mut body, "title", &patch.title);
                insert_some(&mut body, "description", &patch.description);
                insert_some(&mut body, "due_date", &patch.target_date);
                insert_some(&mut body, "completed", &patch.completed);
                insert_some(&mut body, "priority", &patch.priority);
            }
            TableSchema::Medicines => {
                if patch.completed.is_some() || patch.priority.is_some() {
                    return Err(Error::validation(
                        "medicines do not track completion or priority",
                    ));
                }
                if patch.description.is_some() {
                    return Err(Error::validation("medicines do not have a description"));
                }
                if matches!(patch.target_date, Some(None)) {
                    return Err(Error::validation("medicines need an expiry date"));
                }
                insert_some(&mut body, "name", &patch.title);
                insert_some(&mut body, "barcode", &patch.barcode);
                insert_some(&mut body, "expiry_date", &patch.target_date);
            }
        }
        Ok(Value::Object(body))
    }

    /// Decode returned rows into items
    pub(crate) fn decode(&self, rows: Vec<Value>) -> Result<Vec<Item>> {
        rows.into_iter()
            .map(|row| match self {
                TableSchema::Tasks => Ok(serde_json::from_value::<TaskRow>(row)?.into()),
                TableSchema::Medicines => Ok(serde_json::from_value::<MedicineRow>(row)?.into()),
            })
            .collect()
    }
}

fn insert_some<T: serde::Serialize>(body: &mut Map<String, Value>, key: &str, value: &Option<T>) {
    if let Some(value) = value {
        // Serializing plain data into a Value cannot fail.
        if let Ok(value) = serde_json::to_value(value) {
            body.insert(key.to_string(), value);
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    id: ItemId,
    user_id: OwnerId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    priority: Priority,
    #[serde(default, deserialize_with = "lenient_date")]
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Item {
    fn from(row: TaskRow) -> Self {
        Item {
            id: row.id,
            owner_id: row.user_id,
            title: row.title,
            description: row.description,
            target_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
            kind: ItemKind::Task {
                completed: row.completed,
                priority: row.priority,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct MedicineRow {
    id: ItemId,
    user_id: OwnerId,
    name: String,
    #[serde(default)]
    barcode: Option<String>,
    #[serde(deserialize_with = "lenient_date")]
    expiry_date: Option<NaiveDate>,
    #[serde(alias = "date_added")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<MedicineRow> for Item {
    fn from(row: MedicineRow) -> Self {
        Item {
            id: row.id,
            owner_id: row.user_id,
            title: row.name,
            description: None,
            target_date: row.expiry_date,
            created_at: row.created_at,
            updated_at: row.updated_at.unwrap_or(row.created_at),
            kind: ItemKind::Medicine {
                barcode: row.barcode,
            },
        }
    }
}

/// Accepts `date` columns ("2024-03-10") as well as timestamps.
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| Some(ts.date_naive()))
        .map_err(serde::de::Error::custom)
}
