//! Filesystem-backed object store and catalog.
//!
//! Logical path `/zone/home/a.txt` maps to `<root>/zone/home/a.txt`.
//! Directories are collections, files are data objects. Catalog ids and
//! metadata live in the manifest (see [`crate::manifest`]).

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use indexing_types::{Avu, ByteStream, Catalog, ObjectIdentity, ObjectStore, PolicyError};

use crate::manifest::{Manifest, MANIFEST_FILE};

/// Object store rooted at a local directory.
pub struct FsStore {
    root: PathBuf,
    /// Serializes manifest read-modify-write cycles
    manifest_lock: Mutex<()>,
}

impl FsStore {
    /// Open the store at `root`, creating the directory if necessary.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, PolicyError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        info!(root = %root.display(), "Opened filesystem store");
        Ok(Self {
            root,
            manifest_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path for a logical path. Only absolute paths made of normal
    /// components are accepted, and none may name the catalog manifest.
    pub fn content_path(&self, logical_path: &str) -> Result<PathBuf, PolicyError> {
        let path = Path::new(logical_path);
        if !path.has_root() {
            return Err(PolicyError::InvalidInput(format!(
                "logical path [{}] is not absolute",
                logical_path
            )));
        }

        let mut local = self.root.clone();
        for component in path.components() {
            match component {
                Component::RootDir => {}
                Component::Normal(part)
                    if part
                        .to_str()
                        .is_some_and(|name| name.starts_with(MANIFEST_FILE)) =>
                {
                    return Err(PolicyError::InvalidInput(format!(
                        "logical path [{}] names the store catalog",
                        logical_path
                    )))
                }
                Component::Normal(part) => local.push(part),
                _ => {
                    return Err(PolicyError::InvalidInput(format!(
                        "logical path [{}] is not normalized",
                        logical_path
                    )))
                }
            }
        }
        Ok(local)
    }

    async fn load_manifest(&self) -> Result<Manifest, PolicyError> {
        match tokio::fs::read(self.root.join(MANIFEST_FILE)).await {
            Ok(bytes) => Ok(Manifest::from_bytes(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Manifest::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_manifest(&self, manifest: &Manifest) -> Result<(), PolicyError> {
        let path = self.root.join(MANIFEST_FILE);
        let tmp = self.root.join(format!("{}.tmp", MANIFEST_FILE));
        tokio::fs::write(&tmp, manifest.to_bytes()?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Register a logical path in the catalog, returning its id.
    ///
    /// The content must already exist. Registering twice keeps the id.
    pub async fn register(&self, logical_path: &str) -> Result<ObjectIdentity, PolicyError> {
        let local = self.content_path(logical_path)?;
        tokio::fs::metadata(&local)
            .await
            .map_err(|e| not_found_or_io(e, logical_path))?;

        let _guard = self.manifest_lock.lock().await;
        let mut manifest = self.load_manifest().await?;
        let id = manifest.register(logical_path).id.clone();
        self.save_manifest(&manifest).await?;

        debug!(logical_path, id = %id, "Registered catalog entry");
        ObjectIdentity::new(id)
    }

    /// Attach a triple to a registered path.
    pub async fn add_metadata(&self, logical_path: &str, avu: Avu) -> Result<(), PolicyError> {
        let _guard = self.manifest_lock.lock().await;
        let mut manifest = self.load_manifest().await?;
        let entry = manifest
            .entries
            .get_mut(logical_path)
            .ok_or_else(|| missing_entry(logical_path))?;
        if !entry.metadata.contains(&avu) {
            entry.metadata.push(avu);
        }
        self.save_manifest(&manifest).await
    }
}

fn missing_entry(logical_path: &str) -> PolicyError {
    PolicyError::NotFound(format!("failed to get id for [{}]", logical_path))
}

fn not_found_or_io(e: std::io::Error, logical_path: &str) -> PolicyError {
    if e.kind() == ErrorKind::NotFound {
        PolicyError::NotFound(format!("no object at [{}]", logical_path))
    } else {
        PolicyError::Io(e)
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn object_size(&self, logical_path: &str) -> Result<u64, PolicyError> {
        let local = self.content_path(logical_path)?;
        let meta = tokio::fs::metadata(&local)
            .await
            .map_err(|e| not_found_or_io(e, logical_path))?;
        if meta.is_dir() {
            return Err(PolicyError::InvalidInput(format!(
                "[{}] is a collection, not a data object",
                logical_path
            )));
        }
        Ok(meta.len())
    }

    async fn open_read(&self, logical_path: &str) -> Result<ByteStream, PolicyError> {
        let local = self.content_path(logical_path)?;
        let file = tokio::fs::File::open(&local)
            .await
            .map_err(|e| not_found_or_io(e, logical_path))?;
        Ok(Box::new(file))
    }

    async fn metadata(&self, logical_path: &str) -> Result<Vec<Avu>, PolicyError> {
        let manifest = self.load_manifest().await?;
        manifest
            .get(logical_path)
            .map(|entry| entry.metadata.clone())
            .ok_or_else(|| missing_entry(logical_path))
    }
}

#[async_trait]
impl Catalog for FsStore {
    async fn object_id(&self, logical_path: &str) -> Result<ObjectIdentity, PolicyError> {
        let manifest = self.load_manifest().await?;
        let entry = manifest
            .get(logical_path)
            .ok_or_else(|| missing_entry(logical_path))?;
        ObjectIdentity::new(entry.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    fn create_store() -> (FsStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FsStore::open(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn write_object(store: &FsStore, logical_path: &str, content: &[u8]) {
        let local = store.content_path(logical_path).unwrap();
        std::fs::create_dir_all(local.parent().unwrap()).unwrap();
        std::fs::write(local, content).unwrap();
    }

    #[test]
    fn test_content_path_mapping() {
        let (store, temp) = create_store();
        let local = store.content_path("/zone/home/a.txt").unwrap();
        assert_eq!(local, temp.path().join("zone").join("home").join("a.txt"));
    }

    #[test]
    fn test_content_path_rejects_escapes() {
        let (store, _temp) = create_store();
        assert!(store.content_path("/zone/../etc/passwd").is_err());
        assert!(store.content_path("relative/path").is_err());
    }

    #[tokio::test]
    async fn test_catalog_manifest_is_not_an_object() {
        let (store, _temp) = create_store();
        write_object(&store, "/zone/a.txt", b"hello");
        store.register("/zone/a.txt").await.unwrap();

        for path in ["/.catalog.json", "/.catalog.json.tmp", "/zone/.catalog.json"] {
            assert!(matches!(
                store.content_path(path),
                Err(PolicyError::InvalidInput(_))
            ));
        }
        assert!(store.register("/.catalog.json").await.is_err());
        assert!(store.object_size("/.catalog.json").await.is_err());
        assert!(store.object_id("/zone/a.txt").await.is_ok());
    }

    #[tokio::test]
    async fn test_unregistered_path_not_found() {
        let (store, _temp) = create_store();
        write_object(&store, "/zone/a.txt", b"hello");
        let err = store.object_id("/zone/a.txt").await.unwrap_err();
        assert!(matches!(err, PolicyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let (store, _temp) = create_store();
        write_object(&store, "/zone/a.txt", b"hello");

        let id = store.register("/zone/a.txt").await.unwrap();
        assert_eq!(store.object_id("/zone/a.txt").await.unwrap(), id);
        assert_eq!(store.register("/zone/a.txt").await.unwrap(), id);
    }

    #[tokio::test]
    async fn test_register_requires_content() {
        let (store, _temp) = create_store();
        let err = store.register("/zone/missing.txt").await.unwrap_err();
        assert!(matches!(err, PolicyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_size_and_read() {
        let (store, _temp) = create_store();
        write_object(&store, "/zone/a.txt", b"hello world");

        assert_eq!(store.object_size("/zone/a.txt").await.unwrap(), 11);

        let mut stream = store.open_read("/zone/a.txt").await.unwrap();
        let mut content = String::new();
        stream.read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "hello world");
    }

    #[tokio::test]
    async fn test_collection_has_no_size() {
        let (store, _temp) = create_store();
        write_object(&store, "/zone/coll/a.txt", b"x");
        let err = store.object_size("/zone/coll").await.unwrap_err();
        assert!(matches!(err, PolicyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_metadata_roundtrip() {
        let (store, _temp) = create_store();
        write_object(&store, "/zone/coll/a.txt", b"x");
        store.register("/zone/coll").await.unwrap();

        store
            .add_metadata("/zone/coll", Avu::new("author", "jane", ""))
            .await
            .unwrap();
        store
            .add_metadata("/zone/coll", Avu::new("author", "jane", ""))
            .await
            .unwrap();
        store
            .add_metadata("/zone/coll", Avu::new("year", "1999", "ad"))
            .await
            .unwrap();

        let avus = store.metadata("/zone/coll").await.unwrap();
        assert_eq!(
            avus,
            vec![Avu::new("author", "jane", ""), Avu::new("year", "1999", "ad")]
        );
    }
}
