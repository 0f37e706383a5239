//! Valhalla map-matching client
//!
//! Sends a feature's coordinates to a `trace_attributes` endpoint and reads
//! back the ways the trace was snapped onto.

use std::time::Duration;

use geojson::{Geometry, Position};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::relation::WayId;
use crate::core::validate::geometry_kind;

/// Public Valhalla instance run by FOSSGIS
pub const DEFAULT_ENDPOINT: &str = "https://valhalla1.openstreetmap.de/trace_attributes";

/// Longest slice of an error body quoted back in messages
const MAX_BODY_EXCERPT: usize = 200;

/// Configuration for the map-matching service
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Full URL of the `trace_attributes` endpoint
    pub endpoint: String,

    /// Valhalla costing model
    pub costing: String,

    /// Valhalla shape matching strategy
    pub shape_match: String,

    /// Overall request timeout; `None` waits as long as the server does
    pub timeout: Option<Duration>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            costing: "auto".to_string(),
            shape_match: "walk_or_snap".to_string(),
            timeout: None,
        }
    }
}

/// One shape point as Valhalla expects it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TracePoint {
    pub lat: f64,
    pub lon: f64,
}

/// Request body for `trace_attributes`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRequest<'a> {
    pub shape: Vec<TracePoint>,
    pub costing: &'a str,
    pub shape_match: &'a str,
}

/// The part of a `trace_attributes` response this tool reads
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TraceAttributes {
    #[serde(default)]
    pub edges: Option<Vec<Edge>>,
}

/// A matched edge; only its way id matters here
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub way_id: Option<WayId>,
}

impl TraceAttributes {
    /// Way ids of the matched edges in traversal order.
    ///
    /// Returns `None` when the response has no `edges` at all. Edges without
    /// a `way_id` are skipped.
    pub fn way_ids(&self) -> Option<Vec<WayId>> {
        self.edges.as_ref().map(|edges| {
            edges
                .iter()
                .filter_map(|edge| edge.way_id.clone())
                .collect()
        })
    }
}

/// Convert GeoJSON `(lon, lat, ...)` positions into `{lat, lon}` points.
/// Anything past the second component (elevation, measure) is dropped.
pub fn trace_points(positions: &[Position]) -> Result<Vec<TracePoint>> {
    positions
        .iter()
        .enumerate()
        .map(|(idx, position)| match position.as_slice() {
            [lon, lat, ..] => Ok(TracePoint { lat: *lat, lon: *lon }),
            _ => Err(Error::InvalidInput(format!(
                "position #{} has fewer than two components",
                idx + 1
            ))),
        })
        .collect()
}

/// Build the request body for a coordinate sequence
pub fn build_request<'a>(positions: &[Position], config: &'a MatcherConfig) -> Result<TraceRequest<'a>> {
    Ok(TraceRequest {
        shape: trace_points(positions)?,
        costing: &config.costing,
        shape_match: &config.shape_match,
    })
}

/// Coordinate sequence to send for a geometry.
///
/// Multi-line geometries are sent as one trace, lines concatenated in order.
/// Areas and collections have no traversal order and are rejected.
pub fn trace_positions(geometry: &Geometry) -> Result<Vec<Position>> {
    match &geometry.value {
        geojson::Value::Point(position) => Ok(vec![position.clone()]),
        geojson::Value::MultiPoint(positions) | geojson::Value::LineString(positions) => {
            Ok(positions.clone())
        }
        geojson::Value::MultiLineString(lines) => Ok(lines.concat()),
        other => Err(Error::UnsupportedGeometry(geometry_kind(other).to_string())),
    }
}

/// HTTP client for the map-matching service
pub struct MapMatcher {
    client: Client,
    config: MatcherConfig,
}

impl MapMatcher {
    /// Create a matcher against the public Valhalla instance
    pub fn new() -> Result<Self> {
        Self::with_config(MatcherConfig::default())
    }

    /// Create a matcher with custom configuration
    pub fn with_config(config: MatcherConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new().user_agent(format!(
            "osm-route-updater/{}",
            env!("ROUTE_UPDATER_VERSION")
        ));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Send one trace and parse the response.
    ///
    /// A single request is made; failures are returned as-is without retrying.
    pub async fn trace_attributes(&self, positions: &[Position]) -> Result<TraceAttributes> {
        let request = build_request(positions, &self.config)?;
        let endpoint = &self.config.endpoint;

        let response = self.client.post(endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(create_status_error(endpoint, status, &body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            Error::HttpError(format!("Unparseable response from {endpoint}: {e}"))
        })
    }
}

/// Turn a non-success response into an error, quoting Valhalla's own message when present
fn create_status_error(endpoint: &str, status: StatusCode, body: &str) -> Error {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().chars().take(MAX_BODY_EXCERPT).collect());

    if detail.is_empty() {
        Error::HttpError(format!("{endpoint} answered {status}"))
    } else {
        Error::HttpError(format!("{endpoint} answered {status}: {detail}"))
    }
}
