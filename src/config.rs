//! Sorting configuration: ordered regex groups for imports and exports,
//! loadable from a JSON file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

/// Raw configuration as written by the user. Patterns are kept as strings
/// so the file stays trivially serializable; they are compiled once up
/// front via [`SortConfig::compile`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SortConfig {
    /// Import groups, outermost list separated by blank lines in the
    /// output. Each inner list is a set of regexes sharing one group.
    pub groups: Vec<Vec<String>>,
    /// Export groups. Exports rarely need grouping, so the default is a
    /// single match-everything group.
    pub export_groups: Vec<Vec<String>>,
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            // Side-effect imports (keyed with a control-character prefix),
            // then packages, then anything else, then relative paths.
            groups: vec![
                vec!["^\u{0}".to_string()],
                vec!["^@?\\w".to_string()],
                vec!["^".to_string()],
                vec!["^\\.".to_string()],
            ],
            export_groups: vec![vec!["^".to_string()]],
        }
    }
}

impl SortConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn compile(&self) -> Result<CompiledConfig> {
        Ok(CompiledConfig {
            import_groups: compile_groups(&self.groups)?,
            export_groups: compile_groups(&self.export_groups)?,
        })
    }
}

/// Compiled form used by the sorter.
#[derive(Debug)]
pub struct CompiledConfig {
    pub import_groups: Vec<Vec<Regex>>,
    pub export_groups: Vec<Vec<Regex>>,
}

fn compile_groups(groups: &[Vec<String>]) -> Result<Vec<Vec<Regex>>> {
    groups
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|pattern| {
                    Regex::new(pattern)
                        .with_context(|| format!("Invalid group pattern: {pattern}"))
                })
                .collect()
        })
        .collect()
}
