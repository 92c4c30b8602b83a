use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::PortalError;

/// Naive layouts the upstream has been seen to send, tried in order.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Field mapping a record kind exposes to the filter predicate.
pub trait Filterable {
    /// Text fields searched by the free-text query.
    fn search_text(&self) -> Vec<&str>;

    /// Timestamp used by the date range, as local wall-clock time.
    fn timestamp(&self, _offset: FixedOffset) -> Option<NaiveDateTime> {
        None
    }

    /// Value of a named category selector, already in string form.
    fn category(&self, _key: &str) -> Option<String> {
        None
    }
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn search_text(&self) -> Vec<&str> {
        (**self).search_text()
    }

    fn timestamp(&self, offset: FixedOffset) -> Option<NaiveDateTime> {
        (**self).timestamp(offset)
    }

    fn category(&self, key: &str) -> Option<String> {
        (**self).category(key)
    }
}

/// Inclusive calendar-day range. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Start is inclusive from 00:00, end inclusive through 23:59:59.999.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        if let Some(start) = self.start {
            if at < start.and_time(NaiveTime::MIN) {
                return false;
            }
        }
        if let Some(end) = self.end {
            match end.and_hms_milli_opt(23, 59, 59, 999) {
                Some(limit) if at <= limit => {}
                _ => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Lowercased, trimmed search text; empty means no text filter.
    query: String,
    range: DateRange,
    categories: BTreeMap<String, String>,
    offset: FixedOffset,
}

impl FilterCriteria {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            query: String::new(),
            range: DateRange::default(),
            categories: BTreeMap::new(),
            offset,
        }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.trim().to_lowercase();
        self
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    /// A blank value clears the selector instead of matching empty strings.
    pub fn with_category(mut self, key: &str, value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            self.categories.remove(key);
        } else {
            self.categories.insert(key.to_string(), value.to_string());
        }
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn category(&self, key: &str) -> Option<&str> {
        self.categories.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && !self.range.is_active() && self.categories.is_empty()
    }

    /// Same offset, no active criteria.
    pub fn cleared(&self) -> Self {
        Self::new(self.offset)
    }

    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        self.matches_query(record) && self.matches_range(record) && self.matches_categories(record)
    }

    fn matches_query<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        self.query.is_empty()
            || record
                .search_text()
                .iter()
                .any(|field| field.to_lowercase().contains(&self.query))
    }

    fn matches_range<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        if !self.range.is_active() {
            return true;
        }
        record
            .timestamp(self.offset)
            .is_some_and(|at| self.range.contains(at))
    }

    fn matches_categories<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        self.categories
            .iter()
            .all(|(key, wanted)| record.category(key).as_deref() == Some(wanted.as_str()))
    }
}

/// Records satisfying every active criterion, in their original order.
pub fn apply<'a, R: Filterable>(records: &'a [R], criteria: &FilterCriteria) -> Vec<&'a R> {
    records.iter().filter(|r| criteria.matches(*r)).collect()
}

/// Reads an upstream date/time string as local wall-clock time.
///
/// Offset-qualified timestamps and epoch milliseconds are shifted into
/// `offset`; naive values are taken as already local. Anything else is `None`.
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&offset).naive_local());
    }

    if raw.len() > 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|at| at.with_timezone(&offset).naive_local());
    }

    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Parses a `YYYY-MM-DD` query parameter; blank means unset.
pub fn parse_date_param(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, PortalError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                PortalError::InvalidInput(format!("{name} must be a date like 2024-01-31"))
            }),
    }
}
