//! Page-lifetime UI state.
//!
//! One `UiStateStore` exists per application instance. It owns the current
//! user, the application version, the jobs grid column definitions and the
//! jobs list parameters. The jobs parameters are seeded from the URL once at
//! construction and written back to it on every [`UiStateStore::set_jobs_params`].

use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::models::{ColumnDef, JobsParams, ParamDefaults, User};
use crate::location::QueryLocation;

pub struct UiStateStore<L: QueryLocation> {
    location: L,
    user: User,
    version: String,
    jobs_col_defs: Vec<ColumnDef>,
    jobs_params: JobsParams,
}

impl<L: QueryLocation> UiStateStore<L> {
    /// Create a store using the wall clock and built-in defaults.
    pub fn new(location: L) -> Self {
        Self::with_defaults(location, &SystemClock, &ParamDefaults::default())
    }

    /// Create a store, reading the location's query string exactly once.
    pub fn with_defaults(location: L, clock: &dyn Clock, defaults: &ParamDefaults) -> Self {
        let search = location.search();
        let jobs_params = JobsParams::from_search(&search, clock, defaults);

        debug!(
            query_keys = search.len(),
            page = jobs_params.page,
            page_size = jobs_params.page_size,
            "Seeded jobs parameters from URL"
        );

        Self {
            location,
            user: User::Object(Default::default()),
            version: String::new(),
            jobs_col_defs: Vec::new(),
            jobs_params,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn set_user(&mut self, user: User) {
        self.user = user;
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    pub fn jobs_col_defs(&self) -> &[ColumnDef] {
        &self.jobs_col_defs
    }

    pub fn set_jobs_col_defs(&mut self, col_defs: Vec<ColumnDef>) {
        self.jobs_col_defs = col_defs;
    }

    pub fn jobs_params(&self) -> &JobsParams {
        &self.jobs_params
    }

    /// In-place access to the stored parameters. Changes made through this
    /// reference are not written to the URL.
    pub fn jobs_params_mut(&mut self) -> &mut JobsParams {
        &mut self.jobs_params
    }

    /// Write every key of `params` to the URL, then replace the stored
    /// parameters with it. Nothing is merged with the previous value.
    pub fn set_jobs_params(&mut self, params: JobsParams) {
        for (key, value) in params.to_query() {
            trace!(key = %key, "Syncing jobs parameter to URL");
            self.location.set_search(key, value);
        }
        debug!(page = params.page, page_size = params.page_size, "Jobs parameters updated");
        self.jobs_params = params;
    }

    pub fn location(&self) -> &L {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::query::{QueryValue, SearchParams};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::cell::Cell;

    /// Records writes so ordering can be checked.
    #[derive(Default)]
    struct RecordingLocation {
        initial: Vec<(String, String)>,
        reads: Cell<usize>,
        writes: Vec<(String, QueryValue)>,
    }

    impl QueryLocation for RecordingLocation {
        fn search(&self) -> SearchParams {
            self.reads.set(self.reads.get() + 1);
            SearchParams::from_pairs(self.initial.clone())
        }

        fn set_search(&mut self, key: &str, value: QueryValue) {
            self.writes.push((key.to_string(), value));
        }
    }

    fn store(initial: &[(&str, &str)]) -> UiStateStore<RecordingLocation> {
        let location = RecordingLocation {
            initial: initial
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        };
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        UiStateStore::with_defaults(location, &clock, &ParamDefaults::default())
    }

    #[test]
    fn initial_values() {
        let s = store(&[]);

        assert_eq!(s.user(), &json!({}));
        assert_eq!(s.version(), "");
        assert!(s.jobs_col_defs().is_empty());
        assert_eq!(s.jobs_params().page, 1);
        assert!(s.location().writes.is_empty());
        assert_eq!(s.location().reads.get(), 1);
    }

    #[test]
    fn accessors_round_trip() {
        let mut s = store(&[]);

        let user = json!({ "username": "admin", "is_admin": true });
        s.set_user(user.clone());
        s.set_version("5.4.0");
        s.set_jobs_col_defs(vec![json!({ "field": "job_type" }), json!({ "field": "status" })]);

        assert_eq!(s.user(), &user);
        assert_eq!(s.version(), "5.4.0");
        assert_eq!(s.jobs_col_defs().len(), 2);
        assert_eq!(s.jobs_col_defs()[1]["field"], "status");
        assert!(s.location().writes.is_empty());
    }

    #[test]
    fn set_jobs_params_writes_every_key_in_order() {
        let mut s = store(&[("status", "RUNNING")]);
        let mut params = s.jobs_params().clone();
        params.page = 2;
        params.status = None;

        s.set_jobs_params(params.clone());

        let keys: Vec<&str> = s.location().writes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, JobsParams::KEYS);
        assert_eq!(s.location().writes[0].1, QueryValue::Int(2));
        assert_eq!(s.location().writes[5].1, QueryValue::Null);
        assert_eq!(s.jobs_params(), &params);
    }

    #[test]
    fn mutable_access_does_not_touch_url() {
        let mut s = store(&[]);

        s.jobs_params_mut().page = 9;
        s.jobs_params_mut().order.push("id".into());

        assert_eq!(s.jobs_params().page, 9);
        assert_eq!(s.jobs_params().order, vec!["-last_modified", "id"]);
        assert!(s.location().writes.is_empty());
    }
}
