//! Query string value model.
//!
//! `SearchParams` is a read-only snapshot of a URL query string with repeated
//! keys grouped together. `QueryValue` is what gets written back for a single
//! key.

use std::fmt;

/// Value written to the query string for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Removes the key from the query string.
    Null,
    Text(String),
    Int(i64),
    /// Written as one `key=value` pair per element.
    List(Vec<String>),
}

impl QueryValue {
    /// The textual values this produces in the query string, in order.
    /// Empty when the key should be removed.
    pub fn to_values(&self) -> Vec<String> {
        match self {
            QueryValue::Null => Vec::new(),
            QueryValue::Text(s) => vec![s.clone()],
            QueryValue::Int(n) => vec![n.to_string()],
            QueryValue::List(items) => items.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, QueryValue::Null)
    }
}

impl From<Option<String>> for QueryValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(QueryValue::Null, QueryValue::Text)
    }
}

impl From<Option<i64>> for QueryValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(QueryValue::Null, QueryValue::Int)
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Null => write!(f, "null"),
            QueryValue::Text(s) => write!(f, "{}", s),
            QueryValue::Int(n) => write!(f, "{}", n),
            QueryValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Snapshot of a query string. Keys keep the order of their first
/// appearance; each key holds every value it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    entries: Vec<(String, Vec<String>)>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded `(key, value)` pairs, grouping repeated keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.append(key.into(), value.into());
        }
        params
    }

    pub fn append(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// First value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// All values for `key` in query order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// First value for `key` when it is present and non-empty.
    pub fn truthy(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Parse an integer the way browsers' `parseInt(s, 10)` does: skip leading
/// whitespace, accept an optional sign, then take the longest run of decimal
/// digits. Returns `None` when no digits follow or the value overflows.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let mut value: i64 = 0;
    for b in rest[..digits_len].bytes() {
        let digit = i64::from(b - b'0');
        value = value.checked_mul(10)?;
        value = if negative {
            value.checked_sub(digit)?
        } else {
            value.checked_add(digit)?
        };
    }
    Some(value)
}
