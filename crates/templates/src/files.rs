use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use std::path::Path;

/// Creates `path` holding an empty JSON array unless it already exists.
pub(crate) async fn ensure_list_file(path: &Path) -> io::Result<()> {
    if tokio::fs::try_exists(path).await? {
        return Ok(());
    }
    tracing::info!(path = %path.display(), "initializing data file");
    tokio::fs::write(path, "[]").await
}

/// Reads a JSON array. Missing, unreadable or corrupt files read as empty.
pub(crate) async fn read_list<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(path = %path.display(), "error reading data file: {}", e);
            return Vec::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(list) => list,
        Err(e) => {
            tracing::error!(path = %path.display(), "error parsing data file: {}", e);
            Vec::new()
        }
    }
}

/// Rewrites the whole file, pretty-printed with two-space indentation.
pub(crate) async fn write_list<T: Serialize>(path: &Path, list: &[T]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(list).map_err(io::Error::other)?;
    tokio::fs::write(path, json).await.inspect_err(|e| {
        tracing::error!(path = %path.display(), "error writing data file: {}", e);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.json");

        ensure_list_file(&path).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "[]");

        write_list(&path, &["Rent".to_string()]).await.unwrap();
        ensure_list_file(&path).await.unwrap();
        let names: Vec<String> = read_list(&path).await;
        assert_eq!(names, vec!["Rent"]);
    }

    #[tokio::test]
    async fn test_written_json_is_indented() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salaries.json");

        write_list(&path, &["Ana".to_string(), "Bo".to_string()]).await.unwrap();
        assert_eq!(
            tokio::fs::read_to_string(&path).await.unwrap(),
            "[\n  \"Ana\",\n  \"Bo\"\n]"
        );
    }

    #[tokio::test]
    async fn test_corrupt_or_missing_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("bank-expenses.json");
        tokio::fs::write(&corrupt, "{not json").await.unwrap();

        let names: Vec<String> = read_list(&corrupt).await;
        assert!(names.is_empty());

        let missing: Vec<String> = read_list(&dir.path().join("nope.json")).await;
        assert!(missing.is_empty());
    }
}
