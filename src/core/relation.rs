//! OSM-XML relation output
//!
//! Writes a single new route relation (placeholder id `-1`) whose members are
//! the matched ways, in traversal order.

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// Value of the `generator` attribute on the `<osm>` root
pub const GENERATOR: &str = "osm-route-updater";

/// Identifier of a matched way, as returned by the map matcher
///
/// Valhalla emits integers. Text identifiers are accepted so that other
/// matchers can be plugged in without losing their ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WayId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for WayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WayId::Numeric(id) => write!(f, "{id}"),
            WayId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for WayId {
    fn from(id: i64) -> Self {
        WayId::Numeric(id)
    }
}

impl From<&str> for WayId {
    fn from(id: &str) -> Self {
        WayId::Text(id.to_string())
    }
}

/// Render the relation document into any writer
pub fn render_relation<W: Write>(out: &mut W, members: &[WayId]) -> std::io::Result<()> {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, r#"<osm version="0.6" generator="{GENERATOR}">"#)?;
    writeln!(out, r#"  <relation id="-1" visible="true" version="1">"#)?;
    for member in members {
        let reference = member.to_string();
        writeln!(
            out,
            r#"    <member type="way" ref="{}" role=""/>"#,
            escape_attribute(&reference)
        )?;
    }
    writeln!(out, r#"    <tag k="type" v="route"/>"#)?;
    writeln!(out, r#"    <tag k="route" v="bus"/>"#)?;
    writeln!(out, "  </relation>")?;
    writeln!(out, "</osm>")?;
    Ok(())
}

/// Write the relation document to `path`, replacing any existing file
pub fn write_relation(path: &Path, members: &[WayId]) -> Result<()> {
    let with_path = |err: std::io::Error| {
        Error::IoError(std::io::Error::new(
            err.kind(),
            format!("{}: {err}", path.display()),
        ))
    };

    let file = File::create(path).map_err(with_path)?;
    let mut out = BufWriter::new(file);
    render_relation(&mut out, members).map_err(with_path)?;
    out.flush().map_err(with_path)?;
    Ok(())
}

fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn render(members: &[WayId]) -> String {
        let mut buffer = Vec::new();
        render_relation(&mut buffer, members).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_render_three_members_in_order() {
        let members: Vec<WayId> = vec![101.into(), 102.into(), 103.into()];
        let xml = render(&members);

        let refs: Vec<&str> = xml
            .lines()
            .filter(|line| line.trim_start().starts_with("<member"))
            .filter_map(|line| line.split("ref=\"").nth(1))
            .filter_map(|rest| rest.split('"').next())
            .collect();
        assert_eq!(refs, vec!["101", "102", "103"]);

        assert_eq!(xml.matches(r#"<tag k="type" v="route"/>"#).count(), 1);
        assert_eq!(xml.matches(r#"<tag k="route" v="bus"/>"#).count(), 1);
        assert_eq!(xml.matches("<relation ").count(), 1);
        assert!(xml.contains(r#"<relation id="-1" visible="true" version="1">"#));
    }

    #[test]
    fn test_render_exact_document() {
        let xml = render(&[WayId::Numeric(42)]);
        let expected = "\
<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<osm version=\"0.6\" generator=\"osm-route-updater\">
  <relation id=\"-1\" visible=\"true\" version=\"1\">
    <member type=\"way\" ref=\"42\" role=\"\"/>
    <tag k=\"type\" v=\"route\"/>
    <tag k=\"route\" v=\"bus\"/>
  </relation>
</osm>
";
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_render_without_members_still_tags_relation() {
        let xml = render(&[]);
        assert!(!xml.contains("<member"));
        assert!(xml.contains(r#"<tag k="route" v="bus"/>"#));
    }

    #[test]
    fn test_text_ids_are_escaped() {
        let xml = render(&[WayId::from("w<1>&\"2\"")]);
        assert!(xml.contains(r#"ref="w&lt;1&gt;&amp;&quot;2&quot;""#));
    }

    #[test]
    fn test_way_id_deserializes_numbers_and_strings() {
        let ids: Vec<WayId> = serde_json::from_str(r#"[12, -3, "abc"]"#).unwrap();
        assert_eq!(
            ids,
            vec![WayId::Numeric(12), WayId::Numeric(-3), WayId::from("abc")]
        );
    }

    #[test]
    fn test_write_relation_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.osm");
        std::fs::write(&path, "previous content that is much longer than nothing").unwrap();

        write_relation(&path, &[WayId::Numeric(7)]).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<?xml"));
        assert!(written.contains(r#"ref="7""#));
        assert!(!written.contains("previous content"));
    }

    #[test]
    fn test_write_relation_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("output.osm");

        match write_relation(&path, &[WayId::Numeric(1)]) {
            Err(Error::IoError(err)) => {
                assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
                assert!(err.to_string().contains("output.osm"));
            }
            other => panic!("Expected IoError, got {other:?}"),
        }
    }
}
