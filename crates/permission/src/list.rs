//! Newline-separated name lists backed by a file.

use crate::error::PermissionError;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A named-entry list persisted as one name per line.
///
/// Lookups and mutations happen in memory; [`flush`](Self::flush) writes the
/// file back when something changed since the last write.
#[derive(Debug)]
pub struct PermissionList {
    path: PathBuf,
    state: RwLock<ListState>,
}

#[derive(Debug, Default)]
struct ListState {
    names: Vec<String>,
    /// Bumped on every successful mutation
    revision: u64,
    /// Revision last written to disk
    flushed: u64,
}

impl PermissionList {
    /// Loads the list stored at `path`.
    ///
    /// Lines are trimmed; blank lines and repeated names are skipped. When the
    /// file does not exist it is created holding `defaults`.
    pub async fn load(path: impl AsRef<Path>, defaults: &[&str]) -> Result<Self, PermissionError> {
        let path = path.as_ref().to_path_buf();

        let names = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => parse_names(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("📄 Creating permission list {}", path.display());
                let names = parse_names(&defaults.join("\n"));
                write_atomically(&path, &render(&names)).await?;
                names
            }
            Err(source) => return Err(PermissionError::Read { path, source }),
        };

        debug!("Loaded {} name(s) from {}", names.len(), path.display());
        Ok(Self {
            path,
            state: RwLock::new(ListState {
                names,
                ..ListState::default()
            }),
        })
    }

    pub fn has(&self, name: &str) -> bool {
        self.state.read().names.iter().any(|n| n == name.trim())
    }

    /// Adds `name`. Returns `false` when it was already listed or is blank.
    pub fn add(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let mut state = self.state.write();
        if state.names.iter().any(|n| n == name) {
            return false;
        }
        state.names.push(name.to_string());
        state.revision += 1;
        true
    }

    /// Removes `name`. Returns `false` when it was not listed.
    pub fn remove(&self, name: &str) -> bool {
        let name = name.trim();
        let mut state = self.state.write();
        let Some(position) = state.names.iter().position(|n| n == name) else {
            return false;
        };
        state.names.remove(position);
        state.revision += 1;
        true
    }

    /// Names in file order.
    pub fn names(&self) -> Vec<String> {
        self.state.read().names.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().names.is_empty()
    }

    /// Whether the list has changes not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        let state = self.state.read();
        state.revision != state.flushed
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the list to disk if it changed. Returns whether a write happened.
    ///
    /// The file is replaced through a temporary sibling and a rename, so a
    /// crash mid-write leaves the previous contents in place.
    pub async fn flush(&self) -> Result<bool, PermissionError> {
        let (contents, revision) = {
            let state = self.state.read();
            if state.revision == state.flushed {
                return Ok(false);
            }
            (render(&state.names), state.revision)
        };

        write_atomically(&self.path, &contents).await?;

        let mut state = self.state.write();
        state.flushed = state.flushed.max(revision);
        debug!("💾 Flushed {}", self.path.display());
        Ok(true)
    }
}

fn parse_names(contents: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !names.iter().any(|n| n == line) {
            names.push(line.to_string());
        }
    }
    names
}

fn render(names: &[String]) -> String {
    let mut contents = names.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    contents
}

async fn write_atomically(path: &Path, contents: &str) -> Result<(), PermissionError> {
    let write_err = |source| PermissionError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    tokio::fs::write(&temp, contents).await.map_err(write_err)?;
    tokio::fs::rename(&temp, path).await.map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ops.txt");

        let list = PermissionList::load(&path, &["CONSOLE"]).await.unwrap();

        assert_eq!(list.names(), vec!["CONSOLE".to_string()]);
        assert!(!list.is_dirty());
        let on_disk = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(on_disk, "CONSOLE\n");
    }

    #[tokio::test]
    async fn test_parsing_skips_blanks_and_duplicates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("banned-players.txt");
        tokio::fs::write(&path, "  Steve \n\nAlex\nSteve\n\r\n").await.unwrap();

        let list = PermissionList::load(&path, &[]).await.unwrap();

        assert_eq!(list.names(), vec!["Steve".to_string(), "Alex".to_string()]);
        assert!(list.has("Steve"));
        assert!(!list.has("Herobrine"));
    }

    #[tokio::test]
    async fn test_mutations_mark_dirty_until_flushed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ops.txt");
        let list = PermissionList::load(&path, &["CONSOLE"]).await.unwrap();

        assert!(list.add("Steve"));
        assert!(!list.add("Steve"));
        assert!(!list.add("   "));
        assert!(list.is_dirty());

        assert!(list.flush().await.unwrap());
        assert!(!list.is_dirty());
        assert!(!list.flush().await.unwrap());

        assert!(list.remove("CONSOLE"));
        assert!(!list.remove("CONSOLE"));
        list.flush().await.unwrap();

        let reloaded = PermissionList::load(&path, &["CONSOLE"]).await.unwrap();
        assert_eq!(reloaded.names(), vec!["Steve".to_string()]);
    }

    #[tokio::test]
    async fn test_emptied_list_is_written_as_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("ops.txt");
        let list = PermissionList::load(&path, &["CONSOLE"]).await.unwrap();

        list.remove("CONSOLE");
        list.flush().await.unwrap();

        assert!(list.is_empty());
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "");
    }
}
