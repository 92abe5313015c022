
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::raw::{self, ApiMealRecord, UpstreamPayload};

/// Upstream date format of `mealDt`.
pub const MEAL_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("payload has no data member")]
    MissingData,
    #[error("unexpected {found} at {path}, expected {expected}")]
    UnexpectedType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl ParseError {
    pub(crate) fn unexpected(
        path: impl Into<String>,
        expected: &'static str,
        found: &Value,
    ) -> Self {
        Self::UnexpectedType {
            path: path.into(),
            expected,
            found: raw::kind_of(found),
        }
    }
}

/// Which entries of a payload make up today's lunch.
#[derive(Debug, Clone)]
pub struct MenuFilter {
    pub date: NaiveDate,
    /// slot code of lunch in the nested shape
    pub lunch_code: String,
    /// positional fields of the flat shape
    pub corner_field: usize,
    pub menu_field: usize,
}

impl MenuFilter {
    pub const DEFAULT_LUNCH_CODE: &'static str = "2";
    pub const DEFAULT_CORNER_FIELD: usize = 1;
    pub const DEFAULT_MENU_FIELD: usize = 3;

    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            lunch_code: Self::DEFAULT_LUNCH_CODE.into(),
            corner_field: Self::DEFAULT_CORNER_FIELD,
            menu_field: Self::DEFAULT_MENU_FIELD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    /// the flat shape only carries a single menu text
    pub side: Option<String>,
}

/// Corner name -> menu item for one day. Keys are never blank.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealMenu {
    corners: BTreeMap<String, MenuItem>,
}

impl MealMenu {
    /// Reduce a raw provider payload to the lunch served on `filter.date`.
    pub fn parse(payload: Value, filter: &MenuFilter) -> Result<Self, ParseError> {
        Self::from_payload(UpstreamPayload::try_from(payload)?, filter)
    }

    pub fn from_payload(
        payload: UpstreamPayload,
        filter: &MenuFilter,
    ) -> Result<Self, ParseError> {
        match payload {
            UpstreamPayload::NestedByDay(days) => Self::from_days(days, filter),
            UpstreamPayload::FlatRows(rows) => Ok(Self::from_rows(&rows, filter)),
        }
    }

    fn from_days(days: Vec<raw::ApiDay>, filter: &MenuFilter) -> Result<Self, ParseError> {
        let date = filter.date.format(MEAL_DATE_FORMAT).to_string();
        let mut menu = Self::default();

        // entries for a date are not guaranteed to sit under that day's key
        for raw::ApiDay { day, mut slots } in days {
            let records = match slots.remove(&filter.lunch_code) {
                None => continue,
                Some(Value::Array(records)) => records,
                Some(other) => return Err(ParseError::unexpected(
                    format!("data.{day}.{}", filter.lunch_code), "array", &other,
                )),
            };

            for record in records {
                let record = match serde_json::from_value::<ApiMealRecord>(record) {
                    Ok(v) => v,
                    Err(err) => {
                        tracing::warn!("skipping meal record in {day}: {err}");
                        continue;
                    },
                };
                if record.meal_dt != date { continue }

                let Some(corner) = record.corner.filter(|c| !c.trim().is_empty()) else {
                    tracing::debug!("skipping meal record without corner: {}", record.name);
                    continue;
                };

                menu.insert(corner, MenuItem {
                    name: record.name,
                    side: record.side,
                });
            }
        }

        Ok(menu)
    }

    fn from_rows(rows: &[Value], filter: &MenuFilter) -> Self {
        let min_len = filter.corner_field.max(filter.menu_field) + 1;
        let text = |v: &Value| v.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned);

        let mut menu = Self::default();
        for row in rows {
            let Some(fields) = row.as_array().filter(|r| r.len() >= min_len) else {
                tracing::debug!("skipping short row: {row}");
                continue;
            };
            let (Some(corner), Some(name)) = (
                text(&fields[filter.corner_field]),
                text(&fields[filter.menu_field]),
            ) else {
                tracing::debug!("skipping row with blank fields: {row}");
                continue;
            };

            menu.insert(corner, MenuItem { name, side: None });
        }
        menu
    }

    /// Last insert wins. Blank corners are ignored.
    pub fn insert(&mut self, corner: String, item: MenuItem) -> Option<MenuItem> {
        if corner.trim().is_empty() { return None }
        self.corners.insert(corner, item)
    }

    pub fn get(&self, corner: &str) -> Option<&MenuItem> {
        self.corners.get(corner)
    }

    pub fn is_empty(&self) -> bool { self.corners.is_empty() }

    pub fn len(&self) -> usize { self.corners.len() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MenuItem)> {
        self.corners.iter().map(|(k, v)| (k.as_str(), v))
    }
}
