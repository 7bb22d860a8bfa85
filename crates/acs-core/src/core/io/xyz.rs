//! Conversion between plain xyz text and the structured `arc_xyz` geometry.
//!
//! The text form stores one atom per line (`symbol x y z`, Angstroms) without charge
//! or multiplicity. A leading atom-count line and its comment line, as written by
//! most chemistry tools, are accepted on input and never produced on output.

use crate::core::models::geometry::{ArcXyz, most_common_isotope};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum XyzError {
    #[error("Line {line}: expected 'symbol x y z', found '{content}'")]
    MalformedLine { line: usize, content: String },
    #[error("Line {line}: invalid coordinate '{value}'")]
    InvalidCoordinate { line: usize, value: String },
    #[error("Line {line}: unknown element symbol '{symbol}'")]
    UnknownElement { line: usize, symbol: String },
    #[error("Header declares {declared} atoms but {found} were read")]
    AtomCountMismatch { declared: usize, found: usize },
    #[error("Geometry arrays have mismatched lengths")]
    InconsistentGeometry,
    #[error("No atoms found")]
    Empty,
}

/// Parses xyz text into an [`ArcXyz`], assigning each atom its most common isotope.
pub fn parse_xyz_str(text: &str) -> Result<ArcXyz, XyzError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .skip_while(|(_, line)| line.trim().is_empty())
        .peekable();

    let mut declared = None;
    if let Some((_, first)) = lines.peek() {
        if let Ok(count) = first.trim().parse::<usize>() {
            declared = Some(count);
            lines.next();
            lines.next();
        }
    }

    let mut xyz = ArcXyz::default();
    for (line_num, line) in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        if parts.len() != 4 {
            return Err(XyzError::MalformedLine {
                line: line_num,
                content: trimmed.to_string(),
            });
        }

        let symbol = parts[0];
        let isotope = most_common_isotope(symbol).ok_or_else(|| XyzError::UnknownElement {
            line: line_num,
            symbol: symbol.to_string(),
        })?;

        let mut coord = [0.0; 3];
        for (slot, value) in coord.iter_mut().zip(&parts[1..]) {
            *slot = value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| XyzError::InvalidCoordinate {
                    line: line_num,
                    value: value.to_string(),
                })?;
        }

        xyz.symbols.push(symbol.to_string());
        xyz.isotopes.push(isotope);
        xyz.coords.push(coord);
    }

    if let Some(declared) = declared {
        if declared != xyz.atom_count() {
            return Err(XyzError::AtomCountMismatch {
                declared,
                found: xyz.atom_count(),
            });
        }
    }
    if xyz.atom_count() == 0 {
        return Err(XyzError::Empty);
    }
    Ok(xyz)
}

/// Formats an [`ArcXyz`] as headerless xyz text, one atom per line.
pub fn to_xyz_str(xyz: &ArcXyz) -> Result<String, XyzError> {
    if !xyz.is_consistent() {
        return Err(XyzError::InconsistentGeometry);
    }
    let mut out = String::new();
    for (symbol, [x, y, z]) in xyz.symbols.iter().zip(&xyz.coords) {
        out.push_str(&format!("{:<4}{:14.8}{:14.8}{:14.8}\n", symbol, x, y, z));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER: &str = "O       0.00000000    0.00000000    0.11730000
H       0.00000000    0.75720000   -0.46920000
H       0.00000000   -0.75720000   -0.46920000
";

    #[test]
    fn parses_headerless_text() {
        let xyz = parse_xyz_str(WATER).unwrap();
        assert_eq!(xyz.symbols, vec!["O", "H", "H"]);
        assert_eq!(xyz.isotopes, vec![16, 1, 1]);
        assert_eq!(xyz.coords[1], [0.0, 0.7572, -0.4692]);
    }

    #[test]
    fn accepts_count_and_comment_header() {
        let text = format!("3\nwater, optimized\n{WATER}");
        let xyz = parse_xyz_str(&text).unwrap();
        assert_eq!(xyz.atom_count(), 3);
    }

    #[test]
    fn header_count_must_match() {
        let text = format!("4\n\n{WATER}");
        assert_eq!(
            parse_xyz_str(&text),
            Err(XyzError::AtomCountMismatch {
                declared: 4,
                found: 3
            })
        );
    }

    #[test]
    fn formatting_reproduces_the_text_form() {
        let xyz = parse_xyz_str(WATER).unwrap();
        let text = to_xyz_str(&xyz).unwrap();
        assert_eq!(text, WATER);
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(matches!(
            parse_xyz_str("C 0.0 0.0"),
            Err(XyzError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            parse_xyz_str("C 0.0 abc 0.0"),
            Err(XyzError::InvalidCoordinate { line: 1, .. })
        ));
        assert!(matches!(
            parse_xyz_str("H 0 0 0\nXx 0.0 0.0 0.0"),
            Err(XyzError::UnknownElement { line: 2, .. })
        ));
        assert_eq!(parse_xyz_str("\n  \n"), Err(XyzError::Empty));
    }

    #[test]
    fn inconsistent_geometry_cannot_be_formatted() {
        let xyz = ArcXyz {
            symbols: vec!["C".into()],
            isotopes: vec![],
            coords: vec![[0.0; 3]],
        };
        assert_eq!(to_xyz_str(&xyz), Err(XyzError::InconsistentGeometry));
    }
}
