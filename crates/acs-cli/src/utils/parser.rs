use acs::core::models::species::{ParseTorsionError, Torsion};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Dihedral subset cannot be empty. Expected torsions such as '1-2-3-4,7-8-9-10'.")]
    EmptySubset,

    #[error("Torsion {torsion} is listed twice in subset '{subset}'.")]
    RepeatedTorsion { torsion: Torsion, subset: String },

    #[error(transparent)]
    Torsion(#[from] ParseTorsionError),

    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidKeyValue(String),
}

/// Parses one dihedral subset written as comma-separated torsions.
pub fn parse_subset(s: &str) -> Result<Vec<Torsion>, ParseError> {
    let mut subset: Vec<Torsion> = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let torsion: Torsion = part.parse()?;
        if subset.contains(&torsion) {
            return Err(ParseError::RepeatedTorsion {
                torsion,
                subset: s.to_string(),
            });
        }
        subset.push(torsion);
    }
    if subset.is_empty() {
        return Err(ParseError::EmptySubset);
    }
    Ok(subset)
}

/// Splits a `KEY=VALUE` override at the first `=`.
pub fn parse_key_value(s: &str) -> Result<(&str, &str), ParseError> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(ParseError::InvalidKeyValue(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_and_multiple_torsions() {
        assert_eq!(parse_subset("1-2-3-4"), Ok(vec![Torsion([1, 2, 3, 4])]));
        assert_eq!(
            parse_subset(" 1-2-3-4 , 7-8-9-10 "),
            Ok(vec![Torsion([1, 2, 3, 4]), Torsion([7, 8, 9, 10])])
        );
    }

    #[test]
    fn rejects_empty_repeated_and_malformed_subsets() {
        assert_eq!(parse_subset(""), Err(ParseError::EmptySubset));
        assert_eq!(parse_subset(" , "), Err(ParseError::EmptySubset));
        assert!(matches!(
            parse_subset("1-2-3-4,1-2-3-4"),
            Err(ParseError::RepeatedTorsion { .. })
        ));
        assert!(matches!(parse_subset("1-2-3"), Err(ParseError::Torsion(_))));
        assert!(matches!(parse_subset("0-1-2-3"), Err(ParseError::Torsion(_))));
    }

    #[test]
    fn key_value_splits_at_first_equals() {
        assert_eq!(
            parse_key_value("project.folder=/a=b"),
            Ok(("project.folder", "/a=b"))
        );
        assert_eq!(
            parse_key_value("selection.keep-lowest = 5"),
            Ok(("selection.keep-lowest", "5"))
        );
        assert!(parse_key_value("no-equals").is_err());
        assert!(parse_key_value("=value").is_err());
    }
}
