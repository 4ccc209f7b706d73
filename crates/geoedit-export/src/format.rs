use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use geoedit_core::{serialize, FeatureCollection};

use crate::geojson_to_csv;

/// Download format for the current document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    GeoJson,
    Csv,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::GeoJson => "data.geojson",
            ExportFormat::Csv => "data.csv",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ExportFormat::GeoJson => "application/geo+json",
            ExportFormat::Csv => "text/csv",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::GeoJson => "geojson",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geojson" | "json" => Ok(ExportFormat::GeoJson),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// How an imported file's text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    GeoJson,
    Csv,
}

impl ImportFormat {
    /// `.csv` files (any case) are CSV, everything else is GeoJSON text
    pub fn detect(file_name: &str) -> Self {
        if file_name.to_ascii_lowercase().ends_with(".csv") {
            ImportFormat::Csv
        } else {
            ImportFormat::GeoJson
        }
    }
}

/// A rendered export ready to hand to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub content: String,
    pub file_name: &'static str,
    pub media_type: &'static str,
}

/// Render the document in the requested format
pub fn export(doc: &FeatureCollection, format: ExportFormat) -> Export {
    let content = match format {
        ExportFormat::GeoJson => serialize(doc),
        ExportFormat::Csv => geojson_to_csv(doc),
    };
    Export {
        content,
        file_name: format.file_name(),
        media_type: format.media_type(),
    }
}

/// Write an export into `dir` under its default file name
pub fn write_export(export: &Export, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let path = dir.join(export.file_name);
    fs::write(&path, &export.content).with_context(|| format!("Failed to save to {:?}", path))?;
    Ok(path)
}
