//! Read/write access to the query string of the current navigable URL.
//!
//! The store only talks to [`QueryLocation`]. [`UrlLocation`] is the concrete
//! implementation over a parsed URL and understands both plain query strings
//! (`/jobs?page=2`) and hash-routed pages (`/#/jobs?page=2`).

use std::fmt;

use tracing::trace;
use url::{Url, form_urlencoded};

use crate::core::query::{QueryValue, SearchParams};
use crate::error::{Result, StateError};

/// Query string access as provided by the navigation layer.
pub trait QueryLocation {
    /// Snapshot of the current query parameters.
    fn search(&self) -> SearchParams;

    /// Replace `key` with `value`. [`QueryValue::Null`] removes the key.
    fn set_search(&mut self, key: &str, value: QueryValue);
}

/// Where the query string lives inside the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingMode {
    /// Regular `?query` component.
    Html5,
    /// After the route inside the fragment, e.g. `#/jobs?page=2`.
    Hash,
}

/// A [`QueryLocation`] backed by an in-memory URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlLocation {
    url: Url,
    mode: RoutingMode,
}

impl UrlLocation {
    /// Parse `input`, picking [`RoutingMode::Hash`] when the fragment holds a
    /// route (`#/...` or `#!/...`).
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input.trim()).map_err(|source| StateError::InvalidUrl {
            url: input.to_string(),
            source,
        })?;

        let mode = match url.fragment() {
            Some(f) if f.starts_with('/') || f.starts_with("!/") => RoutingMode::Hash,
            _ => RoutingMode::Html5,
        };

        Ok(Self { url, mode })
    }

    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The raw query component for the current mode, without `?`.
    pub fn query(&self) -> Option<&str> {
        match self.mode {
            RoutingMode::Html5 => self.url.query(),
            RoutingMode::Hash => self
                .url
                .fragment()
                .and_then(|f| f.split_once('?'))
                .map(|(_, q)| q),
        }
    }

    fn pairs(&self) -> Vec<(String, String)> {
        self.query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default()
    }

    fn write_pairs(&mut self, pairs: &[(String, String)]) {
        let encoded = (!pairs.is_empty()).then(|| {
            form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish()
        });

        match self.mode {
            RoutingMode::Html5 => self.url.set_query(encoded.as_deref()),
            RoutingMode::Hash => {
                let route = self
                    .url
                    .fragment()
                    .map(|f| f.split_once('?').map_or(f, |(route, _)| route))
                    .unwrap_or("/")
                    .to_string();
                let fragment = match encoded {
                    Some(q) => format!("{}?{}", route, q),
                    None => route,
                };
                self.url.set_fragment(Some(&fragment));
            }
        }
    }
}

impl QueryLocation for UrlLocation {
    fn search(&self) -> SearchParams {
        SearchParams::from_pairs(self.pairs())
    }

    fn set_search(&mut self, key: &str, value: QueryValue) {
        let values = value.to_values();
        let mut pairs = Vec::new();
        let mut written = false;

        // An existing key keeps its position; all of its old values go.
        for (k, v) in self.pairs() {
            if k == key {
                if !written {
                    pairs.extend(values.iter().map(|v| (key.to_string(), v.clone())));
                    written = true;
                }
                continue;
            }
            pairs.push((k, v));
        }
        if !written {
            pairs.extend(values.iter().map(|v| (key.to_string(), v.clone())));
        }

        trace!(key = %key, value = %value, "Updating query string");
        self.write_pairs(&pairs);
    }
}

impl fmt::Display for UrlLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_relative_urls() {
        let err = UrlLocation::parse("/jobs?page=2").unwrap_err();
        assert!(matches!(err, StateError::InvalidUrl { .. }));
    }

    #[test]
    fn reads_repeated_keys() {
        let loc = UrlLocation::parse("http://scale.test/jobs?order=name&order=-priority").unwrap();
        assert_eq!(loc.mode(), RoutingMode::Html5);
        assert_eq!(loc.search().get_all("order"), ["name", "-priority"]);
    }

    #[test]
    fn replaces_in_place_and_appends_new_keys() {
        let mut loc = UrlLocation::parse("http://scale.test/jobs?page=1&tab=log").unwrap();

        loc.set_search("page", QueryValue::Int(2));
        loc.set_search("status", QueryValue::Text("RUNNING".into()));

        assert_eq!(loc.query(), Some("page=2&tab=log&status=RUNNING"));
    }

    #[test]
    fn null_removes_key() {
        let mut loc = UrlLocation::parse("http://scale.test/jobs?status=FAILED").unwrap();

        loc.set_search("status", QueryValue::Null);

        assert_eq!(loc.query(), None);
        assert_eq!(loc.as_str(), "http://scale.test/jobs");
    }

    #[test]
    fn list_writes_repeated_pairs() {
        let mut loc = UrlLocation::parse("http://scale.test/jobs?order=a&page=1&order=b").unwrap();

        loc.set_search("order", QueryValue::List(vec!["x".into(), "-y".into()]));

        assert_eq!(loc.query(), Some("order=x&order=-y&page=1"));
    }

    #[test]
    fn values_are_percent_encoded() {
        let mut loc = UrlLocation::parse("http://scale.test/jobs").unwrap();

        loc.set_search("job_type_name", QueryValue::Text("a b&c".into()));

        assert_eq!(loc.query(), Some("job_type_name=a+b%26c"));
        assert_eq!(loc.search().get("job_type_name"), Some("a b&c"));
    }

    #[test]
    fn hash_routes_keep_query_in_fragment() {
        let mut loc = UrlLocation::parse("http://scale.test/#/jobs?page=3").unwrap();
        assert_eq!(loc.mode(), RoutingMode::Hash);
        assert_eq!(loc.search().get("page"), Some("3"));

        loc.set_search("page", QueryValue::Int(4));
        assert_eq!(loc.as_str(), "http://scale.test/#/jobs?page=4");

        loc.set_search("page", QueryValue::Null);
        assert_eq!(loc.as_str(), "http://scale.test/#/jobs");
    }
}
