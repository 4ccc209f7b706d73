//! Toolbar commands: new, clear, import and export.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use geoedit_core::ValidationError;
use geoedit_export::{csv_to_geojson, export as render_export, write_export, Export, ExportFormat, ImportFormat};
use thiserror::Error;
use tracing::info;

use crate::storage::KeyValueStore;
use crate::store::DocumentStore;

/// Import failures are shown to the user; the document is left unchanged.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Import failed: {0}")]
    Invalid(#[from] ValidationError),
}

/// Outcome of a successful import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub format: ImportFormat,
    pub feature_count: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            ImportFormat::Csv => write!(f, "Imported {} features from CSV.", self.feature_count),
            ImportFormat::GeoJson => write!(f, "Imported {} features.", self.feature_count),
        }
    }
}

/// Start a fresh document
pub fn new_document<S: KeyValueStore>(store: &mut DocumentStore<S>) {
    store.reset();
    info!("started new document");
}

/// Clear everything; same as starting a new document
pub fn clear<S: KeyValueStore>(store: &mut DocumentStore<S>) {
    new_document(store);
}

/// Import file contents already read into memory.
///
/// Names ending in `.csv` are parsed as CSV (which never fails, it may
/// just yield nothing); anything else must validate as GeoJSON.
pub fn import<S: KeyValueStore>(
    store: &mut DocumentStore<S>,
    file_name: &str,
    text: &str,
) -> Result<ImportSummary, ImportError> {
    let format = ImportFormat::detect(file_name);
    let doc = match format {
        ImportFormat::Csv => csv_to_geojson(text),
        ImportFormat::GeoJson => geoedit_core::validate(text)?,
    };

    let summary = ImportSummary {
        format,
        feature_count: doc.len(),
    };
    store.replace_document(doc);
    info!(file_name, features = summary.feature_count, "imported");
    Ok(summary)
}

/// Read a file and import it
pub async fn import_file<S: KeyValueStore>(
    store: &mut DocumentStore<S>,
    path: &Path,
) -> Result<ImportSummary, ImportError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    import(store, &file_name, &text)
}

/// Render the current document for download
pub fn export<S: KeyValueStore>(store: &DocumentStore<S>, format: ExportFormat) -> Export {
    let out = render_export(store.document(), format);
    info!(%format, bytes = out.content.len(), "exported");
    out
}

/// Write the export for `format` into `dir`, returning the file written
pub fn export_to<S: KeyValueStore>(store: &DocumentStore<S>, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    write_export(&export(store, format), dir)
}
