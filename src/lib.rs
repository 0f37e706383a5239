//! # osm-route-updater Library
//!
//! Turns a GeoJSON route into an OpenStreetMap route relation.
//!
//! ## Pipeline
//!
//! - **Validate**: the input must be a FeatureCollection whose geometries are
//!   present, non-empty and well-formed
//! - **Match**: each feature's coordinates are sent to a Valhalla
//!   `trace_attributes` endpoint and snapped onto OSM ways
//! - **Dedup**: consecutive repeats of the same way collapse into one member
//! - **Write**: the ways become the members of a new `type=route`,
//!   `route=bus` relation in an OSM-XML 0.6 file
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use osm_route_updater::{ModeKind, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = RunOptions::new("line-12.geojson", ModeKind::Create);
//!     let summary = osm_route_updater::run_with_defaults(&options).await?;
//!     println!("wrote {:?}", summary.written);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom matcher and observer
//!
//! ```rust,no_run
//! use osm_route_updater::{
//!     MapMatcher, MatcherConfig, ModeKind, RecordingObserver, ReplaceMembers, RunOptions,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let matcher = MapMatcher::with_config(MatcherConfig {
//!     endpoint: "http://localhost:8002/trace_attributes".to_string(),
//!     ..Default::default()
//! })?;
//! let observer = RecordingObserver::new();
//!
//! let mut options = RunOptions::new("line-12.geojson", ModeKind::Update);
//! options.relation_id = Some(1234567);
//!
//! osm_route_updater::run(&options, &matcher, &ReplaceMembers, &observer).await?;
//! for (level, message) in observer.entries() {
//!     println!("{level}: {message}");
//! }
//! # Ok(())
//! # }
//! ```

// Re-export core types that users might need
pub use crate::core::dedup::dedup_consecutive;
pub use crate::core::error::{Error, InvalidGeoJson, Result};
pub use crate::core::matcher::{
    build_request, trace_points, trace_positions, Edge, MapMatcher, MatcherConfig,
    TraceAttributes, TracePoint, TraceRequest, DEFAULT_ENDPOINT,
};
pub use crate::core::observer::{LogObserver, RecordingObserver, RunObserver};
pub use crate::core::pipeline::{
    run, MemberMerge, Mode, ModeKind, ReplaceMembers, RunOptions, RunSummary,
};
pub use crate::core::relation::{render_relation, write_relation, WayId};
pub use crate::core::validate::{parse_feature_collection, validate_geojson};

// Internal modules
mod core;

/// Run with the public Valhalla instance, replacing members in update mode,
/// and reporting through the `log` facade.
pub async fn run_with_defaults(options: &RunOptions) -> Result<RunSummary> {
    let matcher = MapMatcher::new()?;
    run(options, &matcher, &ReplaceMembers, &LogObserver).await
}
