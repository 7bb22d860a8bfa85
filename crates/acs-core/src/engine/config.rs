use super::selection::Selection;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Parameters for turning screening partitions into a post-screening job.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionConfig {
    pub selection: Selection,
    /// Overrides the project folder carried over from the screening job.
    pub project_folder_path: Option<PathBuf>,
    /// Overrides the comment carried over from the screening job.
    pub comment: Option<String>,
}

#[derive(Default)]
pub struct PromotionConfigBuilder {
    selection: Option<Selection>,
    project_folder_path: Option<PathBuf>,
    comment: Option<String>,
}

impl PromotionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }
    pub fn project_folder_path(mut self, path: PathBuf) -> Self {
        self.project_folder_path = Some(path);
        self
    }
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn build(self) -> Result<PromotionConfig, ConfigError> {
        let selection = self
            .selection
            .ok_or(ConfigError::MissingParameter("selection"))?;
        if let Some(path) = &self.project_folder_path {
            if !path.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    parameter: "project_folder_path",
                    reason: format!("'{}' is not an absolute path", path.display()),
                });
            }
        }
        Ok(PromotionConfig {
            selection,
            project_folder_path: self.project_folder_path,
            comment: self.comment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_a_selection() {
        let result = PromotionConfigBuilder::new().comment("x").build();
        assert_eq!(result, Err(ConfigError::MissingParameter("selection")));
    }

    #[test]
    fn builder_sets_all_fields() {
        let config = PromotionConfigBuilder::new()
            .selection(Selection::LowestEnergies { count: 5 })
            .project_folder_path(PathBuf::from("/data/ethanol"))
            .comment("round 2")
            .build()
            .unwrap();
        assert_eq!(config.selection, Selection::LowestEnergies { count: 5 });
        assert_eq!(config.project_folder_path, Some(PathBuf::from("/data/ethanol")));
        assert_eq!(config.comment.as_deref(), Some("round 2"));
    }

    #[test]
    fn relative_project_folder_is_rejected() {
        let result = PromotionConfigBuilder::new()
            .selection(Selection::All)
            .project_folder_path(PathBuf::from("relative/dir"))
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                parameter: "project_folder_path",
                ..
            })
        ));
    }
}
