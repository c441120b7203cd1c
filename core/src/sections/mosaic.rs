//! Section records of the line-oriented mosaic file:
//! `section,<x_um>,<y_um>,<angle>\r\n`.

use crate::coord::Point;
use crate::prelude::{SectionError, SectionResult};

pub const SECTION_TAG: &str = "section";

/// Position and rotation parsed from one section line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionRecord {
    pub x_um: f64,
    pub y_um: f64,
    pub angle: f64,
}

pub fn format_section_line(location: &Point, angle: f64) -> String {
    let (x_um, y_um) = location.um();
    format!("{SECTION_TAG},{x_um},{y_um},{angle}\r\n")
}

/// Splits a raw line into trimmed comma-separated fields.
pub fn split_fields(line: &str) -> Vec<&str> {
    line.trim_end_matches(['\r', '\n'])
        .split(',')
        .map(str::trim)
        .collect()
}

/// `Ok(None)` when the line carries another record tag. Lines written with
/// the older `section,<index>,<x>,<y>,<angle>` layout are accepted too.
pub fn parse_section_fields(fields: &[&str], line: usize) -> SectionResult<Option<SectionRecord>> {
    if fields.first().map(|tag| tag.trim()) != Some(SECTION_TAG) {
        return Ok(None);
    }

    let values = match fields.len() {
        4 => &fields[1..4],
        5 => &fields[2..5],
        count => {
            return Err(SectionError::MalformedRecord {
                line,
                reason: format!("expected 3 or 4 values after the tag, found {}", count - 1),
            })
        }
    };

    let parse = |name: &str, raw: &str| {
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| SectionError::MalformedRecord {
                line,
                reason: format!("{name} '{raw}' is not a number"),
            })
    };

    Ok(Some(SectionRecord {
        x_um: parse("x", values[0])?,
        y_um: parse("y", values[1])?,
        angle: parse("angle", values[2])?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::UnitScale;

    #[test]
    fn other_tags_are_not_claimed() {
        assert_eq!(parse_section_fields(&["image", "a.dax"], 1).unwrap(), None);
        assert_eq!(parse_section_fields(&[], 1).unwrap(), None);
    }

    #[test]
    fn current_and_legacy_layouts_parse() {
        let current = parse_section_fields(&split_fields("section,1.5,-2,30\r\n"), 1).unwrap();
        let legacy = parse_section_fields(&split_fields("section,7,1.5,-2,30"), 2).unwrap();
        let expected = SectionRecord {
            x_um: 1.5,
            y_um: -2.0,
            angle: 30.0,
        };
        assert_eq!(current, Some(expected));
        assert_eq!(legacy, Some(expected));
    }

    #[test]
    fn malformed_lines_report_their_number() {
        let err = parse_section_fields(&split_fields("section,1.0,abc,0"), 12).unwrap_err();
        match err {
            SectionError::MalformedRecord { line, .. } => assert_eq!(line, 12),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(parse_section_fields(&split_fields("section,1.0"), 3).is_err());
    }

    #[test]
    fn formatted_line_parses_back() {
        let point = Point::from_um(-1234.56, 0.01, UnitScale::default());
        let line = format_section_line(&point, -179.5);
        let record = parse_section_fields(&split_fields(&line), 1)
            .unwrap()
            .unwrap();
        assert_eq!((record.x_um, record.y_um, record.angle), (-1234.56, 0.01, -179.5));
    }
}
