use super::FeedError;
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    sync::Mutex,
};
use zip::ZipArchive;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// a GTFS feed on disk, either an unpacked directory or a zip archive. an
/// archive is opened and its central directory read once, when the source
/// is created.
#[derive(Debug)]
pub enum FeedSource {
    Directory(PathBuf),
    Archive {
        path: PathBuf,
        archive: Mutex<ZipArchive<File>>,
    },
}

impl FeedSource {
    pub fn new(path: &Path) -> Result<FeedSource, FeedError> {
        if path.is_dir() {
            Ok(FeedSource::Directory(path.to_path_buf()))
        } else if path.is_file() {
            let path_str = path.display().to_string();
            let file = File::open(path).map_err(|source| FeedError::OpenError {
                path: path_str.clone(),
                source,
            })?;
            let archive = ZipArchive::new(file).map_err(|source| FeedError::ArchiveError {
                path: path_str,
                source,
            })?;
            Ok(FeedSource::Archive {
                path: path.to_path_buf(),
                archive: Mutex::new(archive),
            })
        } else {
            Err(FeedError::OpenError {
                path: path.display().to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no GTFS directory or archive at this path",
                ),
            })
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FeedSource::Directory(path) => path,
            FeedSource::Archive { path, .. } => path,
        }
    }

    /// file stem of the feed, e.g. `rome` for `/data/rome.zip`.
    pub fn stem(&self) -> Option<String> {
        self.path()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
    }

    /// reads the contents of a GTFS table, or None when the feed has no
    /// such file. a leading byte order mark is removed.
    pub fn read_table(&self, filename: &str) -> Result<Option<Vec<u8>>, FeedError> {
        let bytes = match self {
            FeedSource::Directory(dir) => read_from_directory(dir, filename)?,
            FeedSource::Archive { path, archive } => {
                // a poisoned archive only failed a read, its index is intact
                let mut archive = archive.lock().unwrap_or_else(|e| e.into_inner());
                read_from_archive(path, &mut archive, filename)?
            }
        };
        Ok(bytes.map(|b| match b.strip_prefix(UTF8_BOM) {
            Some(stripped) => stripped.to_vec(),
            None => b,
        }))
    }
}

fn read_from_directory(dir: &Path, filename: &str) -> Result<Option<Vec<u8>>, FeedError> {
    let path = dir.join(filename);
    if !path.is_file() {
        return Ok(None);
    }
    std::fs::read(&path)
        .map(Some)
        .map_err(|source| FeedError::OpenError {
            path: path.display().to_string(),
            source,
        })
}

/// tables may sit at the archive root or inside a single nested folder.
fn read_from_archive(
    path: &Path,
    archive: &mut ZipArchive<File>,
    filename: &str,
) -> Result<Option<Vec<u8>>, FeedError> {
    let path_str = path.display().to_string();
    let nested_suffix = format!("/{filename}");
    let entry_name = match archive
        .file_names()
        .find(|name| *name == filename || name.ends_with(&nested_suffix))
    {
        Some(name) => name.to_string(),
        None => return Ok(None),
    };

    let mut entry = archive
        .by_name(&entry_name)
        .map_err(|source| FeedError::ArchiveError {
            path: path_str.clone(),
            source,
        })?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|source| FeedError::OpenError {
            path: format!("{path_str}/{entry_name}"),
            source,
        })?;
    Ok(Some(bytes))
}
