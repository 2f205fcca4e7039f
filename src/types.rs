use geo::Point;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

/// Label used when a record carries no value for a requested attribute.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// One collision as loaded from the source dataset.
///
/// The position is `None` when the source row had no usable geometry; such
/// records stay in the dataset but are skipped by every aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    position: Option<Point<f64>>,
    attributes: HashMap<String, String>,
}

impl PointRecord {
    pub fn new(position: Option<Point<f64>>, attributes: HashMap<String, String>) -> Self {
        Self { position, attributes }
    }

    pub fn at(lon: f64, lat: f64) -> Self {
        Self::new(Some(Point::new(lon, lat)), HashMap::new())
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Position with finite coordinates, if any.
    pub fn coordinate(&self) -> Option<Point<f64>> {
        self.position
            .filter(|p| p.x().is_finite() && p.y().is_finite())
    }

    /// Attribute value; empty strings read as absent.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }
}

/// Cell identity: `floor(lon / size)`, `floor(lat / size)`.
///
/// Kept as floats so quotients beyond the `i64` range stay distinct. Always
/// finite; `-0.0` is stored as `0.0` so equal floors hash equally.
#[derive(Debug, Clone, Copy)]
pub struct CellKey {
    x: f64,
    y: f64,
}

impl CellKey {
    /// `None` unless both floors are finite.
    pub fn from_floors(x: f64, y: f64) -> Option<Self> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        // adding 0.0 turns -0.0 into 0.0
        Some(Self { x: x + 0.0, y: y + 0.0 })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

impl PartialEq for CellKey {
    fn eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

impl Eq for CellKey {}

impl Hash for CellKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

impl PartialOrd for CellKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    #[serde(skip_serializing)]
    pub key: CellKey,
    /// `[lon, lat]`
    pub center: [f64; 2],
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: u32,
}

/// Totals for the points inside one viewport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewportAggregate {
    pub total: u32,
    // field name -> top entries, highest count first
    pub categories: BTreeMap<String, Vec<CategoryCount>>,
}
