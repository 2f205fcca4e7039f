use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub dataset: PathBuf,
    // Only read for CSV datasets
    #[serde(default = "default_lon_column")]
    pub lon_column: String,
    #[serde(default = "default_lat_column")]
    pub lat_column: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GridConfig {
    /// Cell side in degrees.
    pub cell_size: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { cell_size: 0.005 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub category_fields: Vec<String>,
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            category_fields: vec!["COLLISIONTYPE".to_string(), "SEVERITYDESC".to_string()],
            top_n: 7,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    /// Max distance in degrees for picking a single collision.
    pub pick_radius: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            static_dir: PathBuf::from("."),
            pick_radius: 0.001,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub grid_geojson: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            grid_geojson: PathBuf::from("output/grid.geojson"),
        }
    }
}

fn default_lon_column() -> String {
    "X".to_string()
}

fn default_lat_column() -> String {
    "Y".to_string()
}

impl AppConfig {
    /// Read, parse and validate a TOML config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Cannot read collision map config {:?}", path))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config in {:?}", path))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let parsed: AppConfig = toml::from_str(raw)?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid.cell_size.is_finite() && self.grid.cell_size > 0.0,
            "grid.cell_size must be positive, got {}",
            self.grid.cell_size
        );
        ensure!(self.dashboard.top_n >= 1, "dashboard.top_n must be at least 1");
        ensure!(
            self.server.pick_radius.is_finite() && self.server.pick_radius >= 0.0,
            "server.pick_radius must be a non-negative number"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = write_config(
            r#"
[input]
dataset = "assets/SDOT_Collisions_2024.geojson"
"#,
        );
        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.grid.cell_size, 0.005);
        assert_eq!(config.dashboard.top_n, 7);
        assert_eq!(
            config.dashboard.category_fields,
            vec!["COLLISIONTYPE", "SEVERITYDESC"]
        );
        assert_eq!(config.input.lon_column, "X");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_full_config() {
        let file = write_config(
            r#"
[input]
dataset = "collisions.csv"
lon_column = "longitude"
lat_column = "latitude"

[grid]
cell_size = 0.01

[dashboard]
category_fields = ["COLLISIONTYPE"]
top_n = 3

[server]
port = 8080
static_dir = "web"
pick_radius = 0.0005

[output]
grid_geojson = "out/cells.geojson"
"#,
        );
        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.input.lat_column, "latitude");
        assert_eq!(config.grid.cell_size, 0.01);
        assert_eq!(config.dashboard.top_n, 3);
        assert_eq!(config.server.static_dir, PathBuf::from("web"));
        assert_eq!(config.output.grid_geojson, PathBuf::from("out/cells.geojson"));
    }

    #[test]
    fn test_rejects_bad_tuning_values() {
        let bad_cell = write_config(
            "[input]\ndataset = \"a.geojson\"\n[grid]\ncell_size = 0.0\n",
        );
        assert!(AppConfig::load_from_file(bad_cell.path()).is_err());

        let bad_top = write_config(
            "[input]\ndataset = \"a.geojson\"\n[dashboard]\ncategory_fields = []\ntop_n = 0\n",
        );
        assert!(AppConfig::load_from_file(bad_top.path()).is_err());
    }

    #[test]
    fn test_from_toml_reports_validation_error() {
        let err = AppConfig::from_toml("[input]\ndataset = \"a.csv\"\n[grid]\ncell_size = -1.0\n")
            .unwrap_err();
        assert!(err.to_string().contains("cell_size"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = AppConfig::load_from_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
