use crate::error::{AnalyticsError, AnalyticsResult};
use crate::index::PointIndex;
use crate::types::{CategoryCount, PointRecord, ViewportAggregate, UNKNOWN_LABEL};
use geo::{coord, Point, Rect};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tracing::debug;

/// Visible lon/lat rectangle. Edges count as inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    rect: Rect<f64>,
}

impl Viewport {
    /// Corners are normalised, so swapped edges describe the same rectangle.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            rect: Rect::new(coord! { x: west, y: south }, coord! { x: east, y: north }),
        }
    }

    pub fn contains(&self, point: &Point<f64>) -> bool {
        let (min, max) = (self.rect.min(), self.rect.max());
        point.x() >= min.x && point.x() <= max.x && point.y() >= min.y && point.y() <= max.y
    }

    pub fn rect(&self) -> Rect<f64> {
        self.rect
    }
}

/// Parses `west,south,east,north`.
impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid bounds '{}': {}", s, e))?;

        match parts.as_slice() {
            &[west, south, east, north] => Ok(Viewport::new(west, south, east, north)),
            _ => Err(format!(
                "expected west,south,east,north but got {} values",
                parts.len()
            )),
        }
    }
}

// Counts in first-seen order so a stable sort keeps ties deterministic.
#[derive(Default)]
struct Tally {
    slots: HashMap<String, usize>,
    entries: Vec<CategoryCount>,
}

impl Tally {
    fn bump(&mut self, label: &str) {
        match self.slots.get(label) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.slots.insert(label.to_string(), self.entries.len());
                self.entries.push(CategoryCount {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    fn into_top(mut self, top_n: usize) -> Vec<CategoryCount> {
        self.entries.sort_by(|a, b| b.count.cmp(&a.count));
        self.entries.truncate(top_n);
        self.entries
    }
}

/// Total and per-field top-N frequency tables for points inside `bounds`.
pub fn summarize(
    points: &[PointRecord],
    bounds: &Viewport,
    category_fields: &[String],
    top_n: usize,
) -> AnalyticsResult<ViewportAggregate> {
    check_top_n(top_n)?;
    let visible = points
        .iter()
        .filter(|r| r.coordinate().is_some_and(|p| bounds.contains(&p)));
    Ok(tally(visible, category_fields, top_n))
}

/// Same result as [`summarize`], using `index` to find the visible points.
pub fn summarize_indexed(
    index: &PointIndex,
    points: &[PointRecord],
    bounds: &Viewport,
    category_fields: &[String],
    top_n: usize,
) -> AnalyticsResult<ViewportAggregate> {
    check_top_n(top_n)?;
    let visible = index
        .within(bounds)
        .into_iter()
        .filter_map(|i| points.get(i));
    Ok(tally(visible, category_fields, top_n))
}

fn check_top_n(top_n: usize) -> AnalyticsResult<()> {
    if top_n < 1 {
        return Err(AnalyticsError::invalid("top_n", "must be at least 1"));
    }
    Ok(())
}

fn tally<'a>(
    visible: impl Iterator<Item = &'a PointRecord>,
    category_fields: &[String],
    top_n: usize,
) -> ViewportAggregate {
    let mut total = 0u32;
    let mut tallies: Vec<Tally> = category_fields.iter().map(|_| Tally::default()).collect();

    for record in visible {
        total += 1;
        for (field, tally) in category_fields.iter().zip(tallies.iter_mut()) {
            tally.bump(record.attribute(field).unwrap_or(UNKNOWN_LABEL));
        }
    }

    let mut categories = BTreeMap::new();
    for (field, tally) in category_fields.iter().zip(tallies) {
        categories
            .entry(field.clone())
            .or_insert_with(|| tally.into_top(top_n));
    }

    debug!(total, fields = category_fields.len(), "viewport summary");

    ViewportAggregate { total, categories }
}
