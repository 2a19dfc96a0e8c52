use std::ffi::OsStr;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;
use zip::ZipArchive;

use crate::engine::ImportError;
use crate::models::ImportType;

/// Resolves the downloaded file into the import files relevant to the
/// requested type.
///
/// Archives are expanded into a fresh uniquely-named subdirectory of the
/// download's scratch directory; only entries whose filename carries the
/// import-type prefix are returned. A plain CSV stands for itself when
/// prefix-matched. Anything else is fatal for the invocation.
pub fn extract(download_path: &Path, import_type: ImportType) -> Result<Vec<PathBuf>, ImportError> {
    let extension = download_path.extension().and_then(OsStr::to_str).unwrap_or("");

    match extension {
        "zip" => extract_archive(download_path, import_type),
        "csv" => {
            let matched = download_path
                .file_name()
                .and_then(OsStr::to_str)
                .is_some_and(|name| name.starts_with(import_type.prefix()));

            Ok(if matched { vec![download_path.to_path_buf()] } else { Vec::new() })
        }
        other => Err(ImportError::UnsupportedFileType {
            path: download_path.display().to_string(),
            extension: other.to_string()
        })
    }
}

fn extract_archive(
    download_path: &Path,
    import_type: ImportType
) -> Result<Vec<PathBuf>, ImportError> {
    let scratch_dir = download_path.parent().unwrap_or_else(|| Path::new("."));
    let extract_dir = scratch_dir.join(Uuid::new_v4().simple().to_string());
    fs::create_dir_all(&extract_dir)?;

    info!("Extracting {} into {}", download_path.display(), extract_dir.display());

    let mut archive = ZipArchive::new(File::open(download_path)?)?;
    archive.extract(&extract_dir)?;

    let mut import_files = Vec::new();
    for entry in fs::read_dir(&extract_dir)? {
        let path = entry?.path();
        let matched = path.is_file()
            && path
                .file_name()
                .and_then(OsStr::to_str)
                .is_some_and(|name| name.starts_with(import_type.prefix()));

        if matched {
            import_files.push(path);
        }
    }

    // Directory listing order is platform-dependent; keep file order stable
    // so processed_files checkpoints line up across invocations.
    import_files.sort();

    Ok(import_files)
}
