//! Directory-backed pasteboard store.
//!
//! One subdirectory per pasteboard under the store root; each item is a
//! payload file `N` plus a type-tag file `N.type`, with N counting from 1.
//! The root comes from `$PB_DIR`, falling back to `$XDG_RUNTIME_DIR/pb`,
//! `$HOME/.cache/pb`, and finally a `pb` directory under the system
//! temporary directory.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PbError, Result};

/// The pasteboard operated on when none is named.
pub const DEFAULT_PASTEBOARD: &str = "clipboard";

/// The type tag assumed for data that arrives untagged.
pub const DEFAULT_TYPE: &str = "public.utf8-plain-text";

pub struct Pasteboard {
    dir: PathBuf,
    name: String,
}

impl Pasteboard {
    /// Open (creating if necessary) the named pasteboard under the
    /// default store root.
    pub fn open(name: &str) -> Result<Pasteboard> {
        Self::open_at(&store_root(), name)
    }

    /// Open the named pasteboard under an explicit store root.
    pub fn open_at(root: &Path, name: &str) -> Result<Pasteboard> {
        if name.is_empty() || name.contains('/') {
            return Err(PbError::Usage(format!("invalid pasteboard name '{}'", name)));
        }
        let dir = root.join(name);
        fs::create_dir_all(&dir).map_err(|e| PbError::File {
            path: dir.display().to_string(),
            source: e,
        })?;
        Ok(Pasteboard {
            dir,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn payload_path(&self, index: usize) -> PathBuf {
        self.dir.join(index.to_string())
    }

    fn type_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.type", index))
    }

    fn no_such_item(&self, index: usize) -> PbError {
        PbError::Store(format!(
            "can't find item {} on pasteboard \"{}\"",
            index, self.name
        ))
    }

    /// Number of items currently on the pasteboard.
    pub fn item_count(&self) -> usize {
        let mut n = 0;
        while self.payload_path(n + 1).is_file() {
            n += 1;
        }
        n
    }

    /// Remove every item.
    pub fn clear(&self) -> Result<()> {
        for index in 1..=self.item_count() {
            fs::remove_file(self.payload_path(index))?;
            let type_path = self.type_path(index);
            if type_path.is_file() {
                fs::remove_file(type_path)?;
            }
        }
        Ok(())
    }

    /// Store one item with the given type tag. Returns its 1-based index.
    pub fn put(&self, data: &[u8], type_tag: &str) -> Result<usize> {
        let index = self.item_count() + 1;
        fs::write(self.type_path(index), type_tag)?;
        fs::write(self.payload_path(index), data)?;
        Ok(index)
    }

    /// Type tag of the item at `index` (1-based). Untagged items count as
    /// the default type.
    pub fn item_type(&self, index: usize) -> Result<String> {
        if !self.payload_path(index).is_file() {
            return Err(self.no_such_item(index));
        }
        match fs::read_to_string(self.type_path(index)) {
            Ok(tag) => Ok(tag),
            Err(_) => Ok(DEFAULT_TYPE.to_string()),
        }
    }

    /// Payload size in bytes of the item at `index`.
    pub fn item_len(&self, index: usize) -> Result<u64> {
        let meta = fs::metadata(self.payload_path(index)).map_err(|_| self.no_such_item(index))?;
        Ok(meta.len())
    }

    /// Payload of the item at `index`. With `want_type`, the item's tag
    /// must match it exactly.
    pub fn read_item(&self, index: usize, want_type: Option<&str>) -> Result<Vec<u8>> {
        let tag = self.item_type(index)?;
        if let Some(want) = want_type {
            if tag != want {
                return Err(PbError::Store(format!(
                    "item {} of pasteboard \"{}\" has no \"{}\" data (its type is \"{}\")",
                    index, self.name, want, tag
                )));
            }
        }
        fs::read(self.payload_path(index)).map_err(|_| self.no_such_item(index))
    }
}

/// Resolve the store root directory.
fn store_root() -> PathBuf {
    if let Ok(dir) = env::var("PB_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(dir) = env::var("XDG_RUNTIME_DIR") {
        return Path::new(&dir).join("pb");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home).join(".cache").join("pb");
    }
    env::temp_dir().join("pb")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn board(root: &TempDir) -> Pasteboard {
        Pasteboard::open_at(root.path(), DEFAULT_PASTEBOARD).unwrap()
    }

    #[test]
    fn new_pasteboard_is_empty() {
        let root = TempDir::new().unwrap();
        assert_eq!(board(&root).item_count(), 0);
    }

    #[test]
    fn put_and_read_back() {
        let root = TempDir::new().unwrap();
        let pb = board(&root);
        let index = pb.put(b"hello", DEFAULT_TYPE).unwrap();
        assert_eq!(index, 1);
        assert_eq!(pb.item_count(), 1);
        assert_eq!(pb.read_item(1, None).unwrap(), b"hello");
        assert_eq!(pb.item_type(1).unwrap(), DEFAULT_TYPE);
        assert_eq!(pb.item_len(1).unwrap(), 5);
    }

    #[test]
    fn items_are_appended_in_order() {
        let root = TempDir::new().unwrap();
        let pb = board(&root);
        pb.put(b"one", "text/plain").unwrap();
        pb.put(b"two", "public.png").unwrap();
        assert_eq!(pb.item_count(), 2);
        assert_eq!(pb.read_item(2, None).unwrap(), b"two");
        assert_eq!(pb.item_type(2).unwrap(), "public.png");
    }

    #[test]
    fn clear_removes_everything() {
        let root = TempDir::new().unwrap();
        let pb = board(&root);
        pb.put(b"one", DEFAULT_TYPE).unwrap();
        pb.put(b"two", DEFAULT_TYPE).unwrap();
        pb.clear().unwrap();
        assert_eq!(pb.item_count(), 0);
        assert!(pb.read_item(1, None).is_err());
    }

    #[test]
    fn type_filter_must_match_exactly() {
        let root = TempDir::new().unwrap();
        let pb = board(&root);
        pb.put(b"data", "text/plain").unwrap();
        assert_eq!(pb.read_item(1, Some("text/plain")).unwrap(), b"data");
        let err = pb.read_item(1, Some("public.png")).unwrap_err();
        assert!(err.to_string().contains("public.png"));
    }

    #[test]
    fn missing_item_is_an_error() {
        let root = TempDir::new().unwrap();
        let pb = board(&root);
        let err = pb.read_item(1, None).unwrap_err();
        assert!(err.to_string().contains("item 1"));
    }

    #[test]
    fn untagged_item_counts_as_default_type() {
        let root = TempDir::new().unwrap();
        let pb = board(&root);
        pb.put(b"data", DEFAULT_TYPE).unwrap();
        fs::remove_file(root.path().join(DEFAULT_PASTEBOARD).join("1.type")).unwrap();
        assert_eq!(pb.item_type(1).unwrap(), DEFAULT_TYPE);
    }

    #[test]
    fn pasteboards_are_independent() {
        let root = TempDir::new().unwrap();
        let a = Pasteboard::open_at(root.path(), "clipboard").unwrap();
        let b = Pasteboard::open_at(root.path(), "find").unwrap();
        a.put(b"data", DEFAULT_TYPE).unwrap();
        assert_eq!(a.item_count(), 1);
        assert_eq!(b.item_count(), 0);
    }

    #[test]
    fn slash_in_name_is_rejected() {
        let root = TempDir::new().unwrap();
        assert!(Pasteboard::open_at(root.path(), "../escape").is_err());
        assert!(Pasteboard::open_at(root.path(), "").is_err());
    }
}
