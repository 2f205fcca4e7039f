use crate::grid::to_feature_collection;
use crate::types::GridCell;
use anyhow::{Context, Result};
use geojson::GeoJson;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write grid cells as a GeoJSON FeatureCollection, creating parent dirs.
pub fn write_grid_geojson(path: &Path, cells: &[GridCell]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }

    let geojson = GeoJson::from(to_feature_collection(cells));
    fs::write(path, geojson.to_string())
        .with_context(|| format!("Failed to write grid GeoJSON: {:?}", path))?;

    info!("Wrote {} grid cells to {:?}", cells.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellKey;
    use tempfile::tempdir;

    #[test]
    fn test_writes_feature_collection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("grid.geojson");
        let cells = vec![GridCell {
            key: CellKey::from_floors(-24466.0, 9522.0).unwrap(),
            center: [-122.3275, 47.6125],
            count: 4,
        }];

        write_grid_geojson(&path, &cells).unwrap();

        let written: GeoJson = fs::read_to_string(&path).unwrap().parse().unwrap();
        match written {
            GeoJson::FeatureCollection(fc) => {
                assert_eq!(fc.features.len(), 1);
                let count = fc.features[0].property("count").and_then(|v| v.as_u64());
                assert_eq!(count, Some(4));
            }
            other => panic!("expected a FeatureCollection, got {:?}", other),
        }
    }
}
