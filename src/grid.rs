use crate::error::{AnalyticsError, AnalyticsResult};
use crate::types::{CellKey, GridCell, PointRecord};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use std::collections::HashMap;
use tracing::debug;

/// Bucket every located point into square cells of `cell_size` degrees.
///
/// Cells come back sorted by key so repeated runs over the same data are
/// identical regardless of input order. A `cell_size` so small that a
/// coordinate's quotient overflows to infinity is rejected.
pub fn aggregate(points: &[PointRecord], cell_size: f64) -> AnalyticsResult<Vec<GridCell>> {
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(AnalyticsError::invalid(
            "cell_size",
            format!("must be a positive number of degrees, got {}", cell_size),
        ));
    }

    let mut counts: HashMap<CellKey, u32> = HashMap::new();
    let mut skipped = 0usize;

    for record in points {
        let Some(point) = record.coordinate() else {
            skipped += 1;
            continue;
        };
        let key = CellKey::from_floors(
            (point.x() / cell_size).floor(),
            (point.y() / cell_size).floor(),
        )
        .ok_or_else(|| {
            AnalyticsError::invalid(
                "cell_size",
                format!(
                    "{} is too small for coordinate ({}, {})",
                    cell_size,
                    point.x(),
                    point.y()
                ),
            )
        })?;
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut cells: Vec<GridCell> = counts
        .into_iter()
        .map(|(key, count)| {
            let cell_x = key.x() * cell_size;
            let cell_y = key.y() * cell_size;
            GridCell {
                key,
                center: [cell_x + cell_size / 2.0, cell_y + cell_size / 2.0],
                count,
            }
        })
        .collect();
    cells.sort_by_key(|c| c.key);

    debug!(
        cells = cells.len(),
        skipped,
        cell_size,
        "grid aggregation finished"
    );

    Ok(cells)
}

/// Point features at each cell center carrying a `count` property.
pub fn to_feature_collection(cells: &[GridCell]) -> FeatureCollection {
    let features = cells
        .iter()
        .map(|cell| {
            let mut properties = JsonObject::new();
            properties.insert("count".to_string(), cell.count.into());
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(cell.center.to_vec()))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
