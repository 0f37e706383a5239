//! Run orchestration
//!
//! validate -> match each feature -> dedup -> (merge) -> write, strictly in
//! sequence. Failures tied to one feature skip that feature; everything else
//! stops the run.

use std::fmt;
use std::path::{Path, PathBuf};

use geojson::Feature;

use crate::core::dedup::dedup_consecutive;
use crate::core::error::{Error, Result};
use crate::core::matcher::{trace_positions, MapMatcher};
use crate::core::observer::RunObserver;
use crate::core::relation::{write_relation, WayId};
use crate::core::validate::validate_geojson;

/// Operating mode as selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    /// Build a brand new relation
    Create,
    /// Rebuild the members of an existing relation
    Update,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeKind::Create => f.write_str("create"),
            ModeKind::Update => f.write_str("update"),
        }
    }
}

/// Mode resolved together with its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update { relation_id: u64 },
}

impl Mode {
    /// Combine the selected mode with the optional relation id.
    /// Update mode needs a positive id.
    pub fn resolve(kind: ModeKind, relation_id: Option<u64>) -> Result<Self> {
        match (kind, relation_id) {
            (ModeKind::Create, _) => Ok(Mode::Create),
            (ModeKind::Update, Some(relation_id)) if relation_id > 0 => {
                Ok(Mode::Update { relation_id })
            }
            (ModeKind::Update, _) => Err(Error::MissingRelationId),
        }
    }

    /// Output file for the `feature`-th (1-based) of `total` features.
    ///
    /// Collections with several features get one numbered file per feature so
    /// that no result overwrites another.
    pub fn output_path(&self, dir: &Path, feature: usize, total: usize) -> PathBuf {
        let stem = match self {
            Mode::Create => "output".to_string(),
            Mode::Update { relation_id } => format!("output_relation_{relation_id}"),
        };

        if total > 1 {
            dir.join(format!("{stem}_{feature}.osm"))
        } else {
            dir.join(format!("{stem}.osm"))
        }
    }
}

/// Hook deciding the final member list of an updated relation.
///
/// Receives the relation id being updated and the freshly matched,
/// deduplicated ways. Implementations may fetch the relation's current
/// members and combine them.
pub trait MemberMerge {
    fn merge(&self, relation_id: u64, matched: Vec<WayId>) -> Vec<WayId>;
}

/// Keeps the matched ways as the relation's whole member list
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplaceMembers;

impl MemberMerge for ReplaceMembers {
    fn merge(&self, _relation_id: u64, matched: Vec<WayId>) -> Vec<WayId> {
        matched
    }
}

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// GeoJSON FeatureCollection to convert
    pub geojson: PathBuf,

    pub mode: ModeKind,

    /// Relation to update; required by [`ModeKind::Update`]
    pub relation_id: Option<u64>,

    /// Directory receiving the `.osm` files
    pub output_dir: PathBuf,
}

impl RunOptions {
    pub fn new(geojson: impl Into<PathBuf>, mode: ModeKind) -> Self {
        Self {
            geojson: geojson.into(),
            mode,
            relation_id: None,
            output_dir: PathBuf::from("."),
        }
    }
}

/// What a run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files written, in feature order
    pub written: Vec<PathBuf>,

    /// Features that produced no file
    pub skipped: usize,
}

/// Execute a full run.
///
/// Every failure is reported to `observer` where it happens; the returned
/// error only tells the caller that the run stopped.
pub async fn run(
    options: &RunOptions,
    matcher: &MapMatcher,
    merge: &dyn MemberMerge,
    observer: &dyn RunObserver,
) -> Result<RunSummary> {
    let mode = match Mode::resolve(options.mode, options.relation_id) {
        Ok(mode) => mode,
        Err(err) => {
            observer.error(&format!("❌ {err}"));
            return Err(err);
        }
    };

    if !options.geojson.exists() {
        let err = Error::InputNotFound(options.geojson.clone());
        observer.error(&format!("❌ {err}."));
        return Err(err);
    }
    observer.info(&format!("✔ File '{}' found.", options.geojson.display()));
    observer.info(&format!("✔ Mode selected: {}", options.mode));

    let collection = validate_geojson(&options.geojson, observer)?;
    observer.info("✔ GeoJSON is valid.");

    if let Mode::Update { relation_id } = mode {
        observer.info(&format!("🔄 Update mode: relation_id = {relation_id}"));
    }

    let total = collection.features.len();
    if total == 0 {
        observer.warn("⚠️  The FeatureCollection has no features, nothing to write.");
    }

    let mut summary = RunSummary::default();
    for (idx, feature) in collection.features.iter().enumerate() {
        let number = idx + 1;

        let Some(way_ids) = match_feature(feature, number, total, matcher, observer).await else {
            summary.skipped += 1;
            continue;
        };

        let members = match mode {
            Mode::Create => way_ids,
            Mode::Update { relation_id } => merge.merge(relation_id, way_ids),
        };
        observer.info(&format!(
            "🛣️  Total way_ids (without consecutive repeats): {}",
            members.len()
        ));
        if members.is_empty() {
            observer.warn(&format!(
                "⚠️  Feature #{number} matched no ways, the relation will have no members."
            ));
        }

        let path = mode.output_path(&options.output_dir, number, total);
        if let Err(err) = write_relation(&path, &members) {
            observer.error(&format!("❌ Could not write the OSM file: {err}"));
            return Err(err);
        }
        observer.info(&format!("📁 OSM file written: {}", path.display()));
        summary.written.push(path);
    }

    Ok(summary)
}

/// Matched and deduplicated ways of one feature, or `None` if the feature is skipped
async fn match_feature(
    feature: &Feature,
    number: usize,
    total: usize,
    matcher: &MapMatcher,
    observer: &dyn RunObserver,
) -> Option<Vec<WayId>> {
    let positions = match feature.geometry.as_ref().map(trace_positions) {
        Some(Ok(positions)) => positions,
        Some(Err(err)) => {
            observer.error(&format!("❌ Feature #{number} skipped: {err}"));
            return None;
        }
        None => {
            observer.error(&format!("❌ Feature #{number} skipped: no geometry"));
            return None;
        }
    };

    observer.matching_started(number, total);
    let response = matcher.trace_attributes(&positions).await;
    observer.matching_finished(number);

    let response = match response {
        Ok(response) => response,
        Err(err) => {
            observer.error(&format!(
                "❌ Map-matching request failed for feature #{number}: {err}"
            ));
            return None;
        }
    };
    observer.info("📡 Valhalla response received.");

    match response.way_ids() {
        Some(way_ids) => Some(dedup_consecutive(way_ids)),
        None => {
            observer.error(&format!(
                "❌ The Valhalla response for feature #{number} does not contain 'edges'."
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mode() {
        assert_eq!(Mode::resolve(ModeKind::Create, None).unwrap(), Mode::Create);
        assert_eq!(Mode::resolve(ModeKind::Create, Some(5)).unwrap(), Mode::Create);
        assert_eq!(
            Mode::resolve(ModeKind::Update, Some(1234567)).unwrap(),
            Mode::Update { relation_id: 1234567 }
        );
        assert!(matches!(
            Mode::resolve(ModeKind::Update, None),
            Err(Error::MissingRelationId)
        ));
        assert!(matches!(
            Mode::resolve(ModeKind::Update, Some(0)),
            Err(Error::MissingRelationId)
        ));
    }

    #[test]
    fn test_output_path_single_feature() {
        let dir = Path::new("out");
        assert_eq!(Mode::Create.output_path(dir, 1, 1), dir.join("output.osm"));
        assert_eq!(
            Mode::Update { relation_id: 42 }.output_path(dir, 1, 1),
            dir.join("output_relation_42.osm")
        );
    }

    #[test]
    fn test_output_path_numbers_multiple_features() {
        let dir = Path::new("out");
        assert_eq!(Mode::Create.output_path(dir, 2, 3), dir.join("output_2.osm"));
        assert_eq!(
            Mode::Update { relation_id: 42 }.output_path(dir, 3, 3),
            dir.join("output_relation_42_3.osm")
        );
    }

    #[test]
    fn test_replace_members_keeps_matched_ways() {
        let matched = vec![WayId::Numeric(3), WayId::Numeric(4)];
        assert_eq!(ReplaceMembers.merge(99, matched.clone()), matched);
    }

    #[test]
    fn test_mode_kind_display() {
        assert_eq!(ModeKind::Create.to_string(), "create");
        assert_eq!(ModeKind::Update.to_string(), "update");
    }
}
