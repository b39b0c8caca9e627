//! Page-level metadata: title, location, timestamps.
//!
//! These are thin readers over the parsed page. None of them fail: anything
//! that cannot be read comes back as `None` and the caller falls back.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::{Node, NodeRef};

/// Suffix the chat UI appends to every page title
static TITLE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s+)- Claude.*$").unwrap());

static DATE_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").unwrap(),
        Regex::new(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}").unwrap(),
    ]
});

static LEADING_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(-?\d+)").unwrap());

/// Attributes that may hold a unix timestamp, in lookup order
const TIMESTAMP_ATTRS: [&str; 3] = ["data-timestamp", "data-created", "data-time"];

/// Values above this are milliseconds, below it seconds
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A captured conversation page
#[derive(Debug, Clone)]
pub struct Page {
    pub root: Node,
    /// Text of the document's `<title>`
    pub raw_title: String,
    /// Where the page was captured from
    pub location: String,
}

impl Page {
    pub fn new(root: Node, raw_title: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            root,
            raw_title: raw_title.into(),
            location: location.into(),
        }
    }

    /// Parse a saved HTML page
    #[cfg(feature = "html")]
    pub fn from_html(html: &str, location: impl Into<String>) -> Self {
        let root = crate::html::parse_document(html);
        let raw_title = NodeRef::new(&root)
            .find(|n| n.tag_name() == "title")
            .map(|t| t.text_content())
            .unwrap_or_default();
        Self::new(root, raw_title, location)
    }

    pub fn root_ref(&self) -> NodeRef<'_> {
        NodeRef::new(&self.root)
    }

    /// Title with the UI suffix removed
    pub fn title(&self) -> Option<String> {
        page_title(&self.raw_title)
    }

    /// Best-effort conversation date
    pub fn chat_date(&self) -> Option<NaiveDateTime> {
        chat_date(&self.root_ref())
    }
}

/// Strip the ` - Claude…` suffix; blank titles become `None`
pub fn page_title(raw: &str) -> Option<String> {
    let title = TITLE_SUFFIX.replace(raw.trim(), "");
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// `YYYY-MM-DD HH:MM:SS` in UTC
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(DISPLAY_FORMAT).to_string()
}

/// `YYYY-MM-DD HH:MM:SS`
pub fn format_date(date: NaiveDateTime) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Look for the date the conversation took place.
///
/// Tried in order: `<time datetime=…>` elements, the first date-time pattern
/// in the body text, then `data-timestamp`/`data-created`/`data-time`
/// attributes holding unix seconds or milliseconds.
pub fn chat_date(root: &NodeRef<'_>) -> Option<NaiveDateTime> {
    let descendants = root.descendants();

    let from_time_elements = descendants
        .iter()
        .filter(|n| n.tag_name() == "time")
        .filter_map(|n| n.attr("datetime"))
        .find_map(parse_date_time);
    if from_time_elements.is_some() {
        return from_time_elements;
    }

    let body = root
        .find(|n| n.tag_name() == "body")
        .unwrap_or_else(|| root.clone());
    let text = body.text_content();
    let from_text = DATE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .find(&text)
            .and_then(|m| parse_date_time(m.as_str()))
    });
    if from_text.is_some() {
        return from_text;
    }

    descendants.iter().find_map(|n| {
        let value = TIMESTAMP_ATTRS.iter().find_map(|attr| n.attr(attr))?;
        parse_unix_timestamp(value)
    })
}

/// Parse an RFC 3339 date-time (normalized to UTC), a naive date-time, or a date
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Leading integer as unix seconds, or milliseconds when large enough
fn parse_unix_timestamp(value: &str) -> Option<NaiveDateTime> {
    let caps = LEADING_INTEGER.captures(value)?;
    let number: i64 = caps[1].parse().ok()?;
    let dt = if number > MILLIS_THRESHOLD {
        DateTime::<Utc>::from_timestamp_millis(number)
    } else {
        DateTime::<Utc>::from_timestamp(number, 0)
    };
    dt.map(|dt| dt.naive_utc())
}
