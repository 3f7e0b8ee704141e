//! GeoJSON export and import through native file dialogs.
//!
//! The dialog and the file I/O run on the async compute pool. Finished tasks
//! are polled each frame and applied to the annotation engine on the main
//! schedule, so an import never interleaves with other edits.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use futures_lite::future;

use crate::annotation::{Annotations, ExportError, ImportError, ImportSummary};
use crate::config::{AppConfig, UpdateLastExportDirRequest, UpdateLastImportDirRequest};

/// Message to export all annotations as GeoJSON
#[derive(Message)]
pub struct ExportRequest;

/// Message to replace all annotations with a GeoJSON file
#[derive(Message)]
pub struct ImportRequest;

/// A finished export
pub struct ExportedFile {
    pub path: PathBuf,
    pub markers: usize,
    pub polygons: usize,
}

/// Result of the last export, shown until dismissed
#[derive(Resource, Default)]
pub struct ExportOutcome {
    pub result: Option<Result<ExportedFile, String>>,
}

/// A finished import
pub struct ImportedFile {
    pub path: PathBuf,
    pub summary: ImportSummary,
}

/// Result of the last import, shown until dismissed
#[derive(Resource, Default)]
pub struct ImportOutcome {
    pub result: Option<Result<ImportedFile, String>>,
}

/// Chosen export path and write result; `None` when the dialog was cancelled
type ExportTaskResult = Option<Result<PathBuf, ExportError>>;

/// Chosen import path and file contents; `None` when the dialog was cancelled
type ImportTaskResult = Option<(PathBuf, Result<String, ImportError>)>;

/// In-flight file dialogs
#[derive(Resource, Default)]
pub struct FileOperations {
    export: Option<PendingExport>,
    import: Option<Task<ImportTaskResult>>,
}

struct PendingExport {
    task: Task<ExportTaskResult>,
    markers: usize,
    polygons: usize,
}

impl FileOperations {
    pub fn is_busy(&self) -> bool {
        self.export.is_some() || self.import.is_some()
    }
}

fn dialog_start_dir(remembered: Option<&PathBuf>) -> Option<PathBuf> {
    remembered
        .filter(|dir| dir.is_dir())
        .cloned()
        .or_else(crate::paths::documents_dir)
}

fn write_export(path: &Path, contents: &str) -> Result<(), ExportError> {
    std::fs::write(path, contents).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders the export and asks where to save it.
pub fn start_export(
    mut events: MessageReader<ExportRequest>,
    annotations: Res<Annotations>,
    config: Res<AppConfig>,
    mut operations: ResMut<FileOperations>,
    mut outcome: ResMut<ExportOutcome>,
) {
    if events.read().count() == 0 || operations.is_busy() {
        return;
    }

    let artifact = match annotations.export() {
        Ok(artifact) => artifact,
        Err(e) => {
            error!("Export failed: {}", e);
            outcome.result = Some(Err(e.to_string()));
            return;
        }
    };

    let start_dir = dialog_start_dir(config.data.last_export_dir.as_ref());
    let file_name = artifact.file_name;
    let contents = artifact.contents;

    let task_pool = AsyncComputeTaskPool::get();
    let task = task_pool.spawn(async move {
        let mut dialog = rfd::AsyncFileDialog::new()
            .set_title("Export GeoJSON")
            .set_file_name(&file_name)
            .add_filter("GeoJSON", &["geojson", "json"]);
        if let Some(dir) = start_dir {
            dialog = dialog.set_directory(dir);
        }

        let handle = dialog.save_file().await?;
        let path = handle.path().to_path_buf();
        Some(write_export(&path, &contents).map(|()| path))
    });

    operations.export = Some(PendingExport {
        task,
        markers: artifact.marker_count,
        polygons: artifact.polygon_count,
    });
}

pub fn poll_export_task(
    mut operations: ResMut<FileOperations>,
    mut outcome: ResMut<ExportOutcome>,
    mut config_events: MessageWriter<UpdateLastExportDirRequest>,
) {
    let Some(pending) = operations.export.as_mut() else {
        return;
    };
    let Some(result) = future::block_on(future::poll_once(&mut pending.task)) else {
        return;
    };
    let (markers, polygons) = (pending.markers, pending.polygons);
    operations.export = None;

    match result {
        None => debug!("Export cancelled"),
        Some(Ok(path)) => {
            info!("Exported annotations to {:?}", path);
            if let Some(dir) = path.parent() {
                config_events.write(UpdateLastExportDirRequest {
                    path: dir.to_path_buf(),
                });
            }
            outcome.result = Some(Ok(ExportedFile {
                path,
                markers,
                polygons,
            }));
        }
        Some(Err(e)) => {
            error!("Export failed: {}", e);
            outcome.result = Some(Err(e.to_string()));
        }
    }
}

/// Asks for a GeoJSON file and reads it.
pub fn start_import(
    mut events: MessageReader<ImportRequest>,
    config: Res<AppConfig>,
    mut operations: ResMut<FileOperations>,
) {
    if events.read().count() == 0 || operations.is_busy() {
        return;
    }

    let start_dir = dialog_start_dir(config.data.last_import_dir.as_ref());

    let task_pool = AsyncComputeTaskPool::get();
    operations.import = Some(task_pool.spawn(async move {
        let mut dialog = rfd::AsyncFileDialog::new()
            .set_title("Import GeoJSON")
            .add_filter("GeoJSON", &["geojson", "json"]);
        if let Some(dir) = start_dir {
            dialog = dialog.set_directory(dir);
        }

        let handle = dialog.pick_file().await?;
        let path = handle.path().to_path_buf();
        let contents = std::fs::read_to_string(&path).map_err(ImportError::from);
        Some((path, contents))
    }));
}

/// Applies a finished import to the engine.
pub fn poll_import_task(
    mut operations: ResMut<FileOperations>,
    mut annotations: ResMut<Annotations>,
    mut outcome: ResMut<ImportOutcome>,
    mut config_events: MessageWriter<UpdateLastImportDirRequest>,
) {
    let Some(task) = operations.import.as_mut() else {
        return;
    };
    let Some(result) = future::block_on(future::poll_once(task)) else {
        return;
    };
    operations.import = None;

    let Some((path, contents)) = result else {
        debug!("Import cancelled");
        return;
    };

    if let Some(dir) = path.parent() {
        config_events.write(UpdateLastImportDirRequest {
            path: dir.to_path_buf(),
        });
    }

    match contents.and_then(|text| annotations.import(&text)) {
        Ok(summary) => {
            info!("Imported {:?}", path);
            outcome.result = Some(Ok(ImportedFile { path, summary }));
        }
        Err(e) => {
            warn!("Import of {:?} failed: {}", path, e);
            outcome.result = Some(Err(e.to_string()));
        }
    }
}
