use crate::config::InputConfig;
use crate::types::PointRecord;
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use geo::Point;
use geojson::{GeoJson, Value};
use shapefile::dbase::FieldValue;
use shapefile::{Reader, Shape};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Load the collision dataset, picking the parser from the file extension.
pub fn load_points(input: &InputConfig) -> Result<Vec<PointRecord>> {
    let path = &input.dataset;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Dataset file has no extension: {:?}", path))?;

    info!("Loading dataset from {:?}", path);

    let points = match extension.as_str() {
        "json" | "geojson" => load_geojson(path)?,
        "csv" => load_csv(path, &input.lon_column, &input.lat_column)?,
        "shp" => load_shapefile(path)?,
        _ => return Err(anyhow!("Unsupported dataset format: {}", extension)),
    };

    let unlocated = points.iter().filter(|p| p.coordinate().is_none()).count();
    if unlocated > 0 {
        warn!("{} of {} records have no usable coordinate", unlocated, points.len());
    }
    info!("Loaded {} records", points.len());

    Ok(points)
}

fn load_geojson(path: &Path) -> Result<Vec<PointRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
    let reader = BufReader::new(file);

    // Loads the whole document into memory.
    let geojson = GeoJson::from_reader(reader).context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };

    let points = collection
        .features
        .into_iter()
        .map(|feature| {
            let position = match feature.geometry.map(|g| g.value) {
                Some(Value::Point(coords)) if coords.len() >= 2 => {
                    Some(Point::new(coords[0], coords[1]))
                }
                _ => None,
            };

            let attributes = feature
                .properties
                .unwrap_or_default()
                .into_iter()
                .filter_map(|(name, value)| json_to_attribute(value).map(|v| (name, v)))
                .collect();

            PointRecord::new(position, attributes)
        })
        .collect();

    Ok(points)
}

// ArcGIS exports mix numeric and string encodings for the same field.
fn json_to_attribute(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn load_csv(path: &Path, lon_column: &str, lat_column: &str) -> Result<Vec<PointRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let mut rdr = ReaderBuilder::new().from_reader(file);
    let headers = rdr.headers()?.clone();

    let lon_idx = headers
        .iter()
        .position(|h| h == lon_column)
        .ok_or_else(|| anyhow!("Longitude column '{}' not found in CSV", lon_column))?;
    let lat_idx = headers
        .iter()
        .position(|h| h == lat_column)
        .ok_or_else(|| anyhow!("Latitude column '{}' not found in CSV", lat_column))?;

    let mut points = Vec::new();

    for result in rdr.records() {
        let record = result?;

        let lon = record.get(lon_idx).and_then(|v| v.trim().parse::<f64>().ok());
        let lat = record.get(lat_idx).and_then(|v| v.trim().parse::<f64>().ok());
        let position = lon.zip(lat).map(|(x, y)| Point::new(x, y));

        let attributes: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .enumerate()
            .filter(|(i, (_, value))| *i != lon_idx && *i != lat_idx && !value.is_empty())
            .map(|(_, (name, value))| (name.to_string(), value.to_string()))
            .collect();

        points.push(PointRecord::new(position, attributes));
    }

    Ok(points)
}

fn load_shapefile(path: &Path) -> Result<Vec<PointRecord>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open Shapefile: {:?}", path))?;

    let mut points = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let position = match shape {
            Shape::Point(p) => Some(Point::new(p.x, p.y)),
            Shape::PointM(p) => Some(Point::new(p.x, p.y)),
            Shape::PointZ(p) => Some(Point::new(p.x, p.y)),
            _ => None,
        };

        let fields: HashMap<String, FieldValue> = record.into();
        let attributes = fields
            .into_iter()
            .filter_map(|(name, value)| field_to_attribute(value).map(|v| (name, v)))
            .collect();

        points.push(PointRecord::new(position, attributes));
    }

    Ok(points)
}

fn field_to_attribute(value: FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(s) => s,
        FieldValue::Memo(s) => Some(s),
        FieldValue::Numeric(n) => n.map(|n| n.to_string()),
        FieldValue::Float(f) => f.map(|f| f.to_string()),
        FieldValue::Logical(b) => b.map(|b| b.to_string()),
        FieldValue::Integer(i) => Some(i.to_string()),
        FieldValue::Double(d) => Some(d.to_string()),
        FieldValue::Date(d) => d.map(|d| format!("{}/{:02}/{:02}", d.year(), d.month(), d.day())),
        _ => None,
    }
}
