//! Spatial grid aggregation and viewport analytics over collision points.
//!
//! ```text
//!  .geojson / .csv / .shp
//!        │
//!        ▼
//!   ┌──────────┐
//!   │   data    │  parse file → Vec<PointRecord>
//!   └──────────┘
//!        │
//!        ├──────────────┐
//!        ▼              ▼
//!   ┌──────────┐   ┌──────────┐
//!   │   grid    │   │ viewport  │  (optionally via index)
//!   └──────────┘   └──────────┘
//!        │              │
//!        ▼              ▼
//!   GridCell[]     ViewportAggregate
//! ```
//!
//! `grid`, `viewport`, `index` and `details` are pure; `data`, `output` and
//! `server` do the I/O around them.

pub mod config;
pub mod data;
pub mod details;
pub mod error;
pub mod grid;
pub mod index;
pub mod output;
pub mod server;
pub mod types;
pub mod viewport;

pub use error::{AnalyticsError, AnalyticsResult};
pub use grid::aggregate;
pub use types::{CategoryCount, CellKey, GridCell, PointRecord, ViewportAggregate, UNKNOWN_LABEL};
pub use viewport::{summarize, summarize_indexed, Viewport};
