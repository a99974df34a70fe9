//! Search criteria model
//!
//! `UserQuery` holds what the user asked for: free text, the wildcard
//! flag, a map click, an optional geo radius and match field, and the
//! pagination cursor. It is the single source of truth for request
//! construction; every outgoing search derives its parameters from
//! this struct at call time, never from cached copies.

use crate::service::{AggregateParams, FindParams};

/// Results per page, fixed for the whole session.
pub const ITEMS_PER_PAGE: u64 = 100;

/// A map click position. Both coordinates always travel together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Current search criteria.
///
/// Mutations go through the named setters so the offset/limit
/// derivation in [`UserQuery::find_params`] stays auditable. Free text
/// is stored exactly as typed; lower-casing happens at request-build
/// time so the typed case survives for display and autocompletion.
#[derive(Debug, Clone, PartialEq)]
pub struct UserQuery {
    free_text: Option<String>,
    wildcard: Option<bool>,
    click: Option<GeoPoint>,
    distance: Option<String>,
    field: Option<String>,
    page_index: u64,
    page_size: u64,
}

impl UserQuery {
    pub fn new() -> Self {
        Self {
            free_text: None,
            wildcard: None,
            click: None,
            distance: None,
            field: None,
            page_index: 1,
            page_size: ITEMS_PER_PAGE,
        }
    }

    /// Store the free text as typed; `None` clears it.
    pub fn set_free_text(&mut self, text: Option<String>) {
        self.free_text = text;
    }

    /// Set or clear the wildcard-match flag.
    pub fn set_wildcard(&mut self, wildcard: Option<bool>) {
        self.wildcard = wildcard;
    }

    /// Record a map click. The newest click overwrites any earlier one;
    /// at most one point of interest is active at a time.
    pub fn set_map_click(&mut self, lat: f64, lon: f64) {
        self.click = Some(GeoPoint { lat, lon });
    }

    /// Set the page index, clamped to 1. No side effects: whether a
    /// page change triggers a search is the controller's decision.
    pub fn set_page(&mut self, page: u64) {
        self.page_index = page.max(1);
    }

    /// Set or clear the geo radius in kilometres. The service applies
    /// its geo filter only while a distance is present.
    pub fn set_distance(&mut self, distance: Option<String>) {
        self.distance = distance;
    }

    /// Set or clear the document field the free text matches against.
    pub fn set_field(&mut self, field: Option<String>) {
        self.field = field;
    }

    pub fn free_text(&self) -> Option<&str> {
        self.free_text.as_deref()
    }

    pub fn wildcard(&self) -> Option<bool> {
        self.wildcard
    }

    pub fn click(&self) -> Option<GeoPoint> {
        self.click
    }

    pub fn distance(&self) -> Option<&str> {
        self.distance.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Derive the parameters for a paged search.
    ///
    /// Offset and limit are computed fresh here every time. Blank free
    /// text becomes an absent parameter rather than an empty one.
    pub fn find_params(&self) -> FindParams {
        FindParams {
            query: self.normalized_text(),
            wildcard: self.wildcard,
            field: self.field.clone(),
            distance: self.distance.clone(),
            lat: self.click.map(|c| c.lat),
            lon: self.click.map(|c| c.lon),
            skip: (self.page_index - 1) * self.page_size,
            limit: self.page_size,
        }
    }

    /// Derive the parameters for a facet aggregation: the same criteria
    /// as [`UserQuery::find_params`] minus pagination, since buckets
    /// are counted over the full filtered set rather than one page.
    pub fn aggregate_params(&self) -> AggregateParams {
        AggregateParams {
            query: self.normalized_text(),
            wildcard: self.wildcard,
            field: self.field.clone(),
            distance: self.distance.clone(),
            lat: self.click.map(|c| c.lat),
            lon: self.click.map(|c| c.lon),
        }
    }

    fn normalized_text(&self) -> Option<String> {
        self.free_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .map(str::to_lowercase)
    }
}

impl Default for UserQuery {
    fn default() -> Self {
        Self::new()
    }
}
