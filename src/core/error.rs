//! Error types for osm-route-updater
//!
//! Every failure of a run maps to one variant of [`Error`]. Whether a failure
//! aborts the run or only skips one feature is decided by the pipeline, not here.

use std::fmt;
use std::path::PathBuf;

/// Reasons a GeoJSON document is rejected by the validator
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidGeoJson {
    /// Top-level `type` is missing or is not `FeatureCollection`
    NotFeatureCollection(Option<String>),

    /// The `features` key is absent
    MissingFeatures,

    /// Feature has no geometry, or a `null` one (1-based index)
    MissingGeometry { feature: usize },

    /// Geometry has no `coordinates`, or an empty / non-array one
    InvalidCoordinates { feature: usize },

    /// A position carries fewer than two finite numbers
    ShortPosition { feature: usize },

    /// Geometry violates the OGC validity rules (self-intersection, degenerate ring, ...)
    IllFormedGeometry { feature: usize, kind: String },

    /// Structure the GeoJSON model could not parse
    Malformed(String),
}

impl fmt::Display for InvalidGeoJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidGeoJson::NotFeatureCollection(Some(found)) => {
                write!(f, "the GeoJSON is not a FeatureCollection (type is '{found}')")
            }
            InvalidGeoJson::NotFeatureCollection(None) => {
                write!(f, "the GeoJSON is not a FeatureCollection (no 'type')")
            }
            InvalidGeoJson::MissingFeatures => {
                write!(f, "the 'features' key is missing")
            }
            InvalidGeoJson::MissingGeometry { feature } => {
                write!(f, "feature #{feature} has no geometry")
            }
            InvalidGeoJson::InvalidCoordinates { feature } => {
                write!(f, "feature #{feature} has invalid coordinates")
            }
            InvalidGeoJson::ShortPosition { feature } => {
                write!(f, "feature #{feature} has a position without longitude and latitude")
            }
            InvalidGeoJson::IllFormedGeometry { feature, kind } => {
                write!(f, "feature #{feature} has an ill-formed {kind} geometry")
            }
            InvalidGeoJson::Malformed(msg) => {
                write!(f, "malformed GeoJSON: {msg}")
            }
        }
    }
}

/// Main error type for osm-route-updater operations
#[derive(Debug)]
pub enum Error {
    /// Input GeoJSON file does not exist
    InputNotFound(PathBuf),

    /// File I/O error
    IoError(std::io::Error),

    /// Input is not parseable JSON
    JsonError(serde_json::Error),

    /// Input is JSON but not a usable FeatureCollection
    InvalidGeoJson(InvalidGeoJson),

    /// HTTP-specific error (non-success status, unparseable body, ...)
    HttpError(String),

    /// Network connectivity issues
    NetworkError(String),

    /// Geometry kind that cannot be sent as a trace
    UnsupportedGeometry(String),

    /// Update mode was selected without a relation id
    MissingRelationId,

    /// Invalid configuration or parameters
    InvalidInput(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InputNotFound(path) => {
                write!(f, "File '{}' not found", path.display())
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {}", err)
            }
            Error::JsonError(err) => {
                write!(f, "Invalid JSON: {}", err)
            }
            Error::InvalidGeoJson(reason) => {
                write!(f, "Invalid GeoJSON: {}", reason)
            }
            Error::HttpError(msg) => {
                write!(f, "HTTP error: {}", msg)
            }
            Error::NetworkError(msg) => {
                write!(f, "Network error: {}", msg)
            }
            Error::UnsupportedGeometry(kind) => {
                write!(f, "Unsupported geometry for map matching: {}", kind)
            }
            Error::MissingRelationId => {
                write!(f, "--relation-id is required in update mode")
            }
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            Error::JsonError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err)
    }
}

impl From<InvalidGeoJson> for Error {
    fn from(reason: InvalidGeoJson) -> Self {
        Error::InvalidGeoJson(reason)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Error::NetworkError(err.to_string())
        } else {
            Error::HttpError(err.to_string())
        }
    }
}

/// Convenience result type for osm-route-updater operations
pub type Result<T> = std::result::Result<T, Error>;
