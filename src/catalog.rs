//! Read-only travel catalog and attribute filtering
//!
//! The catalog is loaded once from a JSON document and never mutated.
//! Filtering is a plain predicate scan: each provided filter value must equal
//! the item's attribute, except for empty values and the sentinel `all`,
//! which leave that attribute unconstrained.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Filter value meaning "no constraint".
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Destination,
    Category,
    Region,
}

/// Anything the catalog filter can match against.
pub trait CatalogItem {
    fn id(&self) -> &str;
    fn attribute(&self, field: FilterField) -> Option<&str>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl CatalogFilter {
    pub fn destination(mut self, value: impl Into<String>) -> Self {
        self.destination = Some(value.into());
        self
    }

    pub fn category(mut self, value: impl Into<String>) -> Self {
        self.category = Some(value.into());
        self
    }

    pub fn region(mut self, value: impl Into<String>) -> Self {
        self.region = Some(value.into());
        self
    }

    /// Constraints that actually apply, with sentinel and blank values dropped.
    fn constraints(&self) -> impl Iterator<Item = (FilterField, &str)> {
        [
            (FilterField::Destination, self.destination.as_deref()),
            (FilterField::Category, self.category.as_deref()),
            (FilterField::Region, self.region.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| match value {
            Some(v) if !v.trim().is_empty() && !v.trim().eq_ignore_ascii_case(ALL) => {
                Some((field, v))
            }
            _ => None,
        })
    }

    pub fn matches<T: CatalogItem>(&self, item: &T) -> bool {
        self.constraints()
            .all(|(field, wanted)| item.attribute(field) == Some(wanted))
    }
}

/// Items matching `filter`, in source order. The source is left untouched.
pub fn filter_items<T: CatalogItem + Clone>(items: &[T], filter: &CatalogFilter) -> Vec<T> {
    items
        .iter()
        .filter(|item| filter.matches(*item))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accommodation {
    pub id: String,
    pub name: String,
    pub destination: String,
    pub category: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price_per_night: Option<f64>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl CatalogItem for Accommodation {
    fn id(&self) -> &str {
        &self.id
    }

    fn attribute(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Destination => Some(&self.destination),
            FilterField::Category => Some(&self.category),
            FilterField::Region => self.region.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub region: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CatalogItem for Destination {
    fn id(&self) -> &str {
        &self.id
    }

    // A destination is its own destination: its id is the slug other items
    // reference.
    fn attribute(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Destination => Some(&self.id),
            FilterField::Category => self.category.as_deref(),
            FilterField::Region => Some(&self.region),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub id: String,
    pub title: String,
    pub destination: String,
    pub category: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub price_from: Option<f64>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl CatalogItem for Itinerary {
    fn id(&self) -> &str {
        &self.id
    }

    fn attribute(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Destination => Some(&self.destination),
            FilterField::Category => Some(&self.category),
            FilterField::Region => self.region.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Accommodations,
    Destinations,
    Itineraries,
}

impl FromStr for CatalogKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "accommodations" => Ok(Self::Accommodations),
            "destinations" => Ok(Self::Destinations),
            "itineraries" => Ok(Self::Itineraries),
            other => Err(Error::NotFound(format!("Catalog '{}'", other))),
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Accommodations => "accommodations",
            Self::Destinations => "destinations",
            Self::Itineraries => "itineraries",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub accommodations: Vec<Accommodation>,
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub itineraries: Vec<Itinerary>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Catalog(format!("Invalid catalog: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Catalog(format!("Could not read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            "Loaded catalog from {}: {} accommodations, {} destinations, {} itineraries",
            path.display(),
            catalog.accommodations.len(),
            catalog.destinations.len(),
            catalog.itineraries.len()
        );
        Ok(catalog)
    }

    pub fn accommodations(&self, filter: &CatalogFilter) -> Vec<Accommodation> {
        filter_items(&self.accommodations, filter)
    }

    pub fn destinations(&self, filter: &CatalogFilter) -> Vec<Destination> {
        filter_items(&self.destinations, filter)
    }

    pub fn itineraries(&self, filter: &CatalogFilter) -> Vec<Itinerary> {
        filter_items(&self.itineraries, filter)
    }

    pub fn accommodation(&self, id: &str) -> Option<&Accommodation> {
        find_by_id(&self.accommodations, id)
    }

    pub fn destination(&self, id: &str) -> Option<&Destination> {
        find_by_id(&self.destinations, id)
    }

    pub fn itinerary(&self, id: &str) -> Option<&Itinerary> {
        find_by_id(&self.itineraries, id)
    }

    /// Filtered items of `kind` as JSON values, for callers that dispatch on
    /// the kind at runtime.
    pub fn filtered_json(
        &self,
        kind: CatalogKind,
        filter: &CatalogFilter,
    ) -> Result<serde_json::Value> {
        let value = match kind {
            CatalogKind::Accommodations => serde_json::to_value(self.accommodations(filter))?,
            CatalogKind::Destinations => serde_json::to_value(self.destinations(filter))?,
            CatalogKind::Itineraries => serde_json::to_value(self.itineraries(filter))?,
        };
        Ok(value)
    }

    pub fn item_json(&self, kind: CatalogKind, id: &str) -> Result<serde_json::Value> {
        let value = match kind {
            CatalogKind::Accommodations => self.accommodation(id).map(serde_json::to_value),
            CatalogKind::Destinations => self.destination(id).map(serde_json::to_value),
            CatalogKind::Itineraries => self.itinerary(id).map(serde_json::to_value),
        };
        match value {
            Some(json) => Ok(json?),
            None => Err(Error::NotFound(format!("{} item '{}'", kind, id))),
        }
    }
}

fn find_by_id<'a, T: CatalogItem>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}
