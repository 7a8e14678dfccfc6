use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub(crate) async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Read a file to bytes.
pub(crate) async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Create a directory and any missing parents.
pub(crate) async fn make_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory {}", path.display()))
}

pub(crate) async fn canonicalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Unable to canonicalize {}", path.display()))
}

/// Returns `p` unchanged if it is absolute, otherwise joins it onto `root`.
pub(crate) fn resolve(root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        return p.to_path_buf();
    }
    root.join(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_read() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        make_dir(&nested).await.unwrap();
        let file = nested.join("x.txt");
        write(&file, "hello").await.unwrap();
        assert_eq!(read(&file).await.unwrap(), "hello");
        assert_eq!(read_bytes(&file).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_read_missing() {
        let dir = TempDir::new().unwrap();
        let err = read(&dir.path().join("nope")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_resolve() {
        let root = Path::new("/srv/statements");
        assert_eq!(
            resolve(root, Path::new("pdfs")),
            PathBuf::from("/srv/statements/pdfs")
        );
        assert_eq!(
            resolve(root, Path::new("/tmp/pdfs")),
            PathBuf::from("/tmp/pdfs")
        );
    }
}
