//! Core library modules for osm-route-updater
//!
//! This module contains the internal implementation of the conversion pipeline.

pub mod dedup;
pub mod error;
pub mod matcher;
pub mod observer;
pub mod pipeline;
pub mod relation;
pub mod validate;
