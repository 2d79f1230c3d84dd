//! Tarball extraction.
//!
//! Extracts gzipped npm tarballs with path validation to prevent directory
//! traversal. npm tarballs only carry regular files and directories under a
//! `package/` prefix; other entry types are skipped.

use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;

use silo_core::error::SiloError;

use crate::CacheResult;

/// Extract a gzipped tarball to a destination directory
pub fn extract_tarball<R: Read>(reader: R, dest_dir: &Path) -> CacheResult<()> {
    let gz_decoder = GzDecoder::new(reader);
    let mut archive = Archive::new(gz_decoder);

    fs::create_dir_all(dest_dir)
        .map_err(|e| SiloError::io(format!("create {}", dest_dir.display()), e))?;

    let entries = archive
        .entries()
        .map_err(|e| SiloError::io("read tarball entries".to_string(), e))?;
    for entry_result in entries {
        let mut entry =
            entry_result.map_err(|e| SiloError::io("read tarball entry".to_string(), e))?;
        let entry_path = entry
            .path()
            .map_err(|e| SiloError::io("read tarball entry path".to_string(), e))?
            .into_owned();
        let safe_path = validate_extract_path(&entry_path, dest_dir)?;

        match entry.header().entry_type() {
            tar::EntryType::Regular => {
                if let Some(parent) = safe_path.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| SiloError::io(format!("create {}", parent.display()), e))?;
                }
                let mut file = fs::File::create(&safe_path)
                    .map_err(|e| SiloError::io(format!("create {}", safe_path.display()), e))?;
                std::io::copy(&mut entry, &mut file)
                    .map_err(|e| SiloError::io(format!("write {}", safe_path.display()), e))?;
            }
            tar::EntryType::Directory => {
                fs::create_dir_all(&safe_path)
                    .map_err(|e| SiloError::io(format!("create {}", safe_path.display()), e))?;
            }
            // char devices, symlinks and friends have no place in an npm tarball
            _ => continue,
        }
    }

    Ok(())
}

/// Validate an extraction path to prevent directory traversal
fn validate_extract_path(entry_path: &Path, dest_dir: &Path) -> CacheResult<PathBuf> {
    let mut safe_path = dest_dir.to_path_buf();

    for component in entry_path.components() {
        match component {
            std::path::Component::Normal(name) => safe_path.push(name),
            std::path::Component::ParentDir | std::path::Component::RootDir => {
                return Err(SiloError::TarballRecovery {
                    package: "tarball".to_string(),
                    message: format!("unsafe entry path: {}", entry_path.display()),
                });
            }
            _ => continue,
        }
    }

    if !safe_path.starts_with(dest_dir) {
        return Err(SiloError::TarballRecovery {
            package: "tarball".to_string(),
            message: format!("entry path escapes destination: {}", entry_path.display()),
        });
    }

    Ok(safe_path)
}
