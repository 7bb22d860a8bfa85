use crate::error::{CliError, Result};
use acs::core::io::xyz::{parse_xyz_str, to_xyz_str};
use acs::core::models::species::{Species, Torsion};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Species description accepted by `acs new --species`.
///
/// ```toml
/// name = "hexanol"
/// smiles = "CCCCCCO"
/// multiplicity = 1
/// charge = 0
/// torsions = ["1-2-3-4", "2-3-4-5"]
/// xyz-file = "hexanol.xyz"
/// ```
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct SpeciesFile {
    pub name: Option<String>,
    pub smiles: Option<String>,
    pub is_ts: Option<bool>,
    pub multiplicity: Option<u32>,
    pub charge: Option<i32>,
    pub torsions: Option<Vec<String>>,
    /// Inline xyz block, with or without the count/comment header.
    pub xyz: Option<String>,
    /// Xyz file, relative to the species file.
    pub xyz_file: Option<PathBuf>,
}

impl SpeciesFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading species from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Builds the record species; `origin` is the species file, used for errors and
    /// for resolving `xyz-file`.
    pub fn into_species(self, origin: &Path) -> Result<Species> {
        let parse_error = |source: anyhow::Error| CliError::FileParsing {
            path: origin.to_path_buf(),
            source,
        };

        let torsions = self
            .torsions
            .map(|list| {
                list.iter()
                    .map(|t| t.parse::<Torsion>())
                    .collect::<std::result::Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(|e| parse_error(e.into()))?;

        let mut species = Species {
            name: self.name,
            smiles: self.smiles,
            is_ts: self.is_ts,
            multiplicity: self.multiplicity,
            charge: self.charge,
            torsions,
            ..Species::default()
        };

        let xyz_text = match (self.xyz, self.xyz_file) {
            (Some(_), Some(_)) => {
                return Err(parse_error(anyhow::anyhow!(
                    "`xyz` and `xyz-file` are mutually exclusive"
                )));
            }
            (Some(text), None) => Some(text),
            (None, Some(file)) => {
                let resolved = match origin.parent() {
                    Some(dir) if file.is_relative() => dir.join(&file),
                    _ => file,
                };
                let text = std::fs::read_to_string(&resolved)?;
                species.coord.file = Some(resolved);
                Some(text)
            }
            (None, None) => None,
        };

        if let Some(text) = xyz_text {
            let arc = parse_xyz_str(&text).map_err(|e| parse_error(e.into()))?;
            species.coord.xyz_str = Some(to_xyz_str(&arc).map_err(|e| parse_error(e.into()))?);
            species.coord.arc_xyz = Some(arc);
        }
        Ok(species)
    }
}
