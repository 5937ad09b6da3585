//! Response snapshots.
//!
//! A [`ResponseSnapshot`] is an immutable captured copy of one response:
//! status, headers and the fully buffered body. Freshness is not stored in
//! the snapshot; it is derived from the response `date` header when needed
//! (see [`ResponseSnapshot::age`]).

use bytes::Bytes;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use http::{HeaderMap, HeaderValue, StatusCode, header};
use serde::{Deserialize, Serialize};
use std::mem::size_of;

use crate::Raw;

/// An immutable copy of one response.
///
/// # Example
///
/// ```
/// use swcache_core::ResponseSnapshot;
/// use http::StatusCode;
///
/// let snapshot = ResponseSnapshot::builder(StatusCode::OK)
///     .header("content-type", "text/css")
///     .header("date", "Sun, 06 Nov 1994 08:49:37 GMT")
///     .body("body { margin: 0 }")
///     .build();
///
/// assert!(snapshot.is_success());
/// assert_eq!(snapshot.body().as_ref(), b"body { margin: 0 }");
/// assert!(snapshot.date().is_some());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResponseSnapshot {
    #[serde(with = "http_serde::status_code")]
    status: StatusCode,
    #[serde(with = "http_serde::header_map")]
    headers: HeaderMap,
    body: Raw,
}

impl ResponseSnapshot {
    /// Creates a snapshot from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        ResponseSnapshot {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Starts building a snapshot with the given status.
    pub fn builder(status: StatusCode) -> SnapshotBuilder {
        SnapshotBuilder {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Returns the response status.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the buffered body.
    #[inline]
    pub fn body(&self) -> &Raw {
        &self.body
    }

    /// Returns `true` for statuses in the 2xx range.
    ///
    /// Only such responses are ever written into a namespace.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parses the `date` header.
    ///
    /// Accepts the three HTTP-date forms: IMF-fixdate and the obsolete
    /// RFC 850 and asctime forms. Returns `None` if the header is absent or
    /// in none of them.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        let value = self.headers.get(header::DATE)?.to_str().ok()?;
        parse_http_date(value.trim())
    }

    /// Age of the snapshot at `now`, derived from the `date` header.
    ///
    /// Returns `None` when the age cannot be deduced.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.date().map(|date| now - date)
    }

    /// Returns the estimated memory usage of this snapshot in bytes.
    pub fn memory_size(&self) -> usize {
        let headers: usize = self
            .headers
            .iter()
            .map(|(name, value)| name.as_str().len() + value.len())
            .sum();
        size_of::<Self>() + headers + self.body.len()
    }
}

// RFC 850: `Sunday, 06-Nov-94 08:49:37 GMT`.
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
// asctime: `Sun Nov  6 08:49:37 1994`, always UTC.
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, RFC_850)
        .or_else(|_| NaiveDateTime::parse_from_str(value, ASCTIME))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Builder for [`ResponseSnapshot`], mostly useful in tests and fixtures.
#[derive(Debug)]
pub struct SnapshotBuilder {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl SnapshotBuilder {
    /// Appends a header. Invalid names or values are skipped.
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the `date` header to the given instant.
    pub fn date(self, date: DateTime<Utc>) -> Self {
        let formatted = date.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        self.header("date", &formatted)
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the snapshot.
    pub fn build(self) -> ResponseSnapshot {
        ResponseSnapshot::new(self.status, self.headers, self.body)
    }
}
