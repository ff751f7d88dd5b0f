use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::{self, Clock};
use super::query::{QueryValue, SearchParams, parse_int_prefix};
use crate::error::{Result, StateError};

/// Signed-in user as handed over by the authentication layer.
pub type User = serde_json::Value;

/// A single jobs grid column definition. Owned by the grid configuration.
pub type ColumnDef = serde_json::Value;

/// Fallback values used when the URL does not supply a jobs parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamDefaults {
    pub page: u32,
    pub page_size: u32,
    pub order: Vec<String>,
    /// How many days back the default `started` bound reaches.
    pub lookback_days: u32,
}

impl Default for ParamDefaults {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 25,
            order: vec!["-last_modified".to_string()],
            lookback_days: 7,
        }
    }
}

/// Filter, sort and pagination state for the jobs list.
///
/// Field order is also the order in which keys are written to the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobsParams {
    pub page: u32,
    pub page_size: u32,
    pub started: String,
    pub ended: String,
    pub order: Vec<String>,
    pub status: Option<String>,
    pub error_category: Option<String>,
    pub job_type_id: Option<i64>,
    pub job_type_name: Option<String>,
    pub job_type_category: Option<String>,
    /// Reserved; filled in by whoever issues the jobs request.
    pub url: Option<String>,
}

impl JobsParams {
    /// Query string keys, in write order.
    pub const KEYS: [&'static str; 11] = [
        "page",
        "page_size",
        "started",
        "ended",
        "order",
        "status",
        "error_category",
        "job_type_id",
        "job_type_name",
        "job_type_category",
        "url",
    ];

    /// Parameters with every field at its default.
    pub fn defaults(clock: &dyn Clock, defaults: &ParamDefaults) -> Self {
        Self::from_search(&SearchParams::new(), clock, defaults)
    }

    /// Seed parameters from a query string snapshot.
    ///
    /// Absent, empty or unparseable values fall back to `defaults`; the
    /// optional filters fall back to `None`. `url` is never read.
    pub fn from_search(
        search: &SearchParams,
        clock: &dyn Clock,
        defaults: &ParamDefaults,
    ) -> Self {
        let order: Vec<String> = search
            .get_all("order")
            .iter()
            .filter(|v| !v.is_empty())
            .cloned()
            .collect();

        Self {
            page: search
                .truthy("page")
                .and_then(parse_positive)
                .unwrap_or(defaults.page),
            page_size: search
                .truthy("page_size")
                .and_then(parse_positive)
                .unwrap_or(defaults.page_size),
            started: search.truthy("started").map(str::to_string).unwrap_or_else(|| {
                clock::to_iso(clock::start_of_day_days_ago(clock, defaults.lookback_days))
            }),
            ended: search
                .truthy("ended")
                .map(str::to_string)
                .unwrap_or_else(|| clock::to_iso(clock::end_of_today(clock))),
            order: if order.is_empty() {
                defaults.order.clone()
            } else {
                order
            },
            status: optional_text(search, "status"),
            error_category: optional_text(search, "error_category"),
            job_type_id: search.truthy("job_type_id").and_then(parse_int_prefix),
            job_type_name: optional_text(search, "job_type_name"),
            job_type_category: optional_text(search, "job_type_category"),
            url: None,
        }
    }

    /// Key/value pairs as written to the query string, in field order.
    pub fn to_query(&self) -> Vec<(&'static str, QueryValue)> {
        vec![
            ("page", QueryValue::Int(i64::from(self.page))),
            ("page_size", QueryValue::Int(i64::from(self.page_size))),
            ("started", QueryValue::Text(self.started.clone())),
            ("ended", QueryValue::Text(self.ended.clone())),
            ("order", QueryValue::List(self.order.clone())),
            ("status", self.status.clone().into()),
            ("error_category", self.error_category.clone().into()),
            ("job_type_id", self.job_type_id.into()),
            ("job_type_name", self.job_type_name.clone().into()),
            ("job_type_category", self.job_type_category.clone().into()),
            ("url", self.url.clone().into()),
        ]
    }

    /// Merge a single `key=value` override into these parameters.
    ///
    /// Unlike [`JobsParams::from_search`], bad input is reported instead of
    /// replaced by a default. An empty value clears an optional field.
    /// `order` takes a comma-separated list.
    pub fn apply(&mut self, key: &str, raw: &str) -> Result<()> {
        let invalid = |reason: &'static str| StateError::InvalidParam {
            key: key.to_string(),
            value: raw.to_string(),
            reason,
        };

        match key {
            "page" | "page_size" => {
                let value = raw
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| invalid("expected a positive integer"))?;
                if key == "page" {
                    self.page = value;
                } else {
                    self.page_size = value;
                }
            }
            "started" | "ended" => {
                let ts = DateTime::parse_from_rfc3339(raw.trim())
                    .map_err(|_| invalid("expected an ISO-8601 timestamp"))?;
                let iso = clock::to_iso(ts.with_timezone(&Utc));
                if key == "started" {
                    self.started = iso;
                } else {
                    self.ended = iso;
                }
            }
            "order" => {
                let order: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if order.is_empty() {
                    return Err(invalid("expected at least one sort field"));
                }
                self.order = order;
            }
            "job_type_id" => {
                self.job_type_id = if raw.is_empty() {
                    None
                } else {
                    Some(raw.trim().parse().map_err(|_| invalid("expected an integer"))?)
                };
            }
            "status" => self.status = non_empty(raw),
            "error_category" => self.error_category = non_empty(raw),
            "job_type_name" => self.job_type_name = non_empty(raw),
            "job_type_category" => self.job_type_category = non_empty(raw),
            "url" => self.url = non_empty(raw),
            other => return Err(StateError::UnknownParam(other.to_string())),
        }
        Ok(())
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    parse_int_prefix(raw)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

fn optional_text(search: &SearchParams, key: &str) -> Option<String> {
    search.truthy(key).map(str::to_string)
}

fn non_empty(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}
