//! Line definitions and where they come from
//!
//! A line is an ordered list of stops with minute offsets in the outbound
//! direction plus a short description such as `"Centre > Airport"`.

use log::warn;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::error::RouteError;
use super::types::Stop;

/// A line as supplied by a route data source
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stops: Vec<Stop>,
}

impl LineDefinition {
    pub fn new(id: impl Into<String>, description: impl Into<String>, stops: Vec<Stop>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            stops,
        }
    }

    /// Split an `"A > B"` description into its two terminus names
    pub fn terminal_names(&self) -> Option<(&str, &str)> {
        let mut parts = self.description.split('>').map(str::trim);
        let first = parts.next()?;
        let second = parts.next()?;
        if parts.next().is_some() || first.is_empty() || second.is_empty() {
            return None;
        }
        Some((first, second))
    }
}

/// Short listing entry for a line picker
#[derive(Debug, Clone, PartialEq)]
pub struct LineSummary {
    pub id: String,
    pub description: String,
}

/// Supplies line definitions by id
pub trait LineSource {
    fn load(&self, line_id: &str) -> Result<LineDefinition, RouteError>;

    /// All lines this source knows about, sorted by id
    fn list(&self) -> Vec<LineSummary>;
}

/// Reads `<dir>/<line_id>.json` files
#[derive(Debug, Clone)]
pub struct JsonLineDirectory {
    dir: PathBuf,
}

impl JsonLineDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn parse_file(path: &Path, line_id: &str) -> Result<LineDefinition, RouteError> {
        let contents = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                RouteError::LineNotFound {
                    line_id: line_id.to_string(),
                }
            } else {
                RouteError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let mut line: LineDefinition =
            serde_json::from_str(&contents).map_err(|e| RouteError::Malformed {
                line_id: line_id.to_string(),
                reason: e.to_string(),
            })?;

        if line.id.is_empty() {
            line.id = line_id.to_string();
        }
        Ok(line)
    }
}

impl LineSource for JsonLineDirectory {
    fn load(&self, line_id: &str) -> Result<LineDefinition, RouteError> {
        // Ids name files directly, so refuse anything that walks out of the directory
        if line_id.is_empty() || line_id.contains(['/', '\\']) || line_id.contains("..") {
            return Err(RouteError::LineNotFound {
                line_id: line_id.to_string(),
            });
        }
        let path = self.dir.join(format!("{line_id}.json"));
        Self::parse_file(&path, line_id)
    }

    fn list(&self) -> Vec<LineSummary> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list lines in {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut lines: Vec<LineSummary> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                let stem = path.file_stem()?.to_string_lossy().into_owned();
                match Self::parse_file(&path, &stem) {
                    Ok(line) => Some(LineSummary {
                        id: line.id,
                        description: line.description,
                    }),
                    Err(e) => {
                        warn!("Skipping {}: {}", path.display(), e);
                        None
                    }
                }
            })
            .collect();

        lines.sort_by(|a, b| a.id.cmp(&b.id));
        lines
    }
}

/// In-memory line table
#[derive(Debug, Clone, Default)]
pub struct StaticLineSource {
    lines: HashMap<String, LineDefinition>,
}

impl StaticLineSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line(mut self, line: LineDefinition) -> Self {
        self.insert(line);
        self
    }

    pub fn insert(&mut self, line: LineDefinition) {
        self.lines.insert(line.id.clone(), line);
    }
}

impl LineSource for StaticLineSource {
    fn load(&self, line_id: &str) -> Result<LineDefinition, RouteError> {
        self.lines
            .get(line_id)
            .cloned()
            .ok_or_else(|| RouteError::LineNotFound {
                line_id: line_id.to_string(),
            })
    }

    fn list(&self) -> Vec<LineSummary> {
        let mut lines: Vec<LineSummary> = self
            .lines
            .values()
            .map(|line| LineSummary {
                id: line.id.clone(),
                description: line.description.clone(),
            })
            .collect();
        lines.sort_by(|a, b| a.id.cmp(&b.id));
        lines
    }
}
