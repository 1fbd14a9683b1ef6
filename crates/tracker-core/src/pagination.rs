//! Pagination control: page math and navigation state, independent of rendering.
//!
//! Everything here is a pure function of `(item_count, page_size, current_page)`.
//! The current page is read fresh from each request; nothing is kept between calls.

use serde::Serialize;

/// Number of pages needed for `item_count` items. Never less than 1.
pub fn page_count(item_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }
    item_count.div_ceil(page_size).max(1)
}

/// Which navigation button a [`Control`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlKind {
    First,
    Previous,
    Next,
    Last,
}

impl ControlKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Previous => "previous",
            Self::Next => "next",
            Self::Last => "last",
        }
    }
}

/// A navigation button with its target page and enabled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub kind: ControlKind,
    pub target_page: u64,
    pub disabled: bool,
}

impl Control {
    /// Fires `navigate` with `params` plus `page=<target>`, unless disabled.
    ///
    /// Returns `true` if navigation happened.
    pub fn activate<F>(&self, params: &QueryParams, navigate: F) -> bool
    where
        F: FnOnce(QueryParams),
    {
        if self.disabled {
            return false;
        }
        navigate(params.with_page(self.target_page));
        true
    }
}

/// Page metadata for a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Pagination {
    /// A single page: only the item count is shown.
    #[serde(rename_all = "camelCase")]
    Summary { item_count: u64, label: String },
    /// Several pages: "Page P of N" plus first/previous/next/last.
    #[serde(rename_all = "camelCase")]
    Navigator {
        item_count: u64,
        current_page: u64,
        page_count: u64,
        label: String,
        controls: [Control; 4],
    },
}

impl Pagination {
    pub fn new(item_count: u64, page_size: u64, current_page: u64) -> Self {
        let pages = page_count(item_count, page_size);
        if pages <= 1 {
            let label = if item_count == 1 {
                "1 item".to_string()
            } else {
                format!("{item_count} items")
            };
            return Self::Summary { item_count, label };
        }

        let current = current_page.clamp(1, pages);
        let at_start = current <= 1;
        let at_end = current >= pages;
        let controls = [
            Control {
                kind: ControlKind::First,
                target_page: 1,
                disabled: at_start,
            },
            Control {
                kind: ControlKind::Previous,
                target_page: current.saturating_sub(1).max(1),
                disabled: at_start,
            },
            Control {
                kind: ControlKind::Next,
                target_page: current.saturating_add(1).min(pages),
                disabled: at_end,
            },
            Control {
                kind: ControlKind::Last,
                target_page: pages,
                disabled: at_end,
            },
        ];

        Self::Navigator {
            item_count,
            current_page: current,
            page_count: pages,
            label: format!("Page {current} of {pages}"),
            controls,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Summary { label, .. } | Self::Navigator { label, .. } => label,
        }
    }

    pub fn page_count(&self) -> u64 {
        match self {
            Self::Summary { .. } => 1,
            Self::Navigator { page_count, .. } => *page_count,
        }
    }

    /// The navigation controls; empty for a single page.
    pub fn controls(&self) -> &[Control] {
        match self {
            Self::Summary { .. } => &[],
            Self::Navigator { controls, .. } => controls,
        }
    }

    /// Looks up a control by kind.
    pub fn control(&self, kind: ControlKind) -> Option<&Control> {
        self.controls().iter().find(|c| c.kind == kind)
    }
}

/// Ordered query-string pairs. Order and duplicates are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a form-urlencoded query string (without the leading `?`).
    /// Malformed input yields an empty set.
    pub fn parse(query: &str) -> Self {
        let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(query).unwrap_or_default();
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces the first `key` pair in place, or appends one.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_owned(), value)),
        }
    }

    /// A copy with `page` set to `page`; every other pair is kept verbatim.
    pub fn with_page(&self, page: u64) -> Self {
        let mut next = self.clone();
        next.set("page", page.to_string());
        next
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Serialises back to a form-urlencoded query string.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(&self.pairs).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
