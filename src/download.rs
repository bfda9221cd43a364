use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::info;

use crate::error::{Error, Result};

pub const WORKBOOK_URL: &str =
    "https://www.nti.org/wp-content/uploads/2021/10/north_korea_missile_test_database.xlsx";

pub const WORKBOOK_FILE: &str = "input.xlsx";
pub const DATABASE_FILE: &str = "output.db";

/// Start every run from an empty work directory.
pub fn reset_work_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Download the workbook at `url` into `dest_dir`. Returns the saved path.
pub fn fetch_workbook(url: &str, dest_dir: &Path, timeout: Duration) -> Result<PathBuf> {
    let dest_path = dest_dir.join(WORKBOOK_FILE);
    let unavailable = |e: reqwest::Error| Error::source_unavailable(format!("cannot download {}", url), e);

    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(unavailable)?;
    let resp = client
        .get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .map_err(unavailable)?;
    let bytes = resp.bytes().map_err(unavailable)?;

    fs::write(&dest_path, &bytes)
        .map_err(|e| Error::source_unavailable(format!("cannot save {}", dest_path.display()), e))?;

    info!(url, path = %dest_path.display(), bytes = bytes.len(), "downloaded workbook");
    Ok(dest_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_work_dir_clears_previous_run() {
        let root = tempfile::tempdir().unwrap();
        let work_dir = root.path().join("temp");
        fs::create_dir_all(&work_dir).unwrap();
        fs::write(work_dir.join(DATABASE_FILE), b"stale").unwrap();

        reset_work_dir(&work_dir).unwrap();

        assert!(work_dir.is_dir());
        assert_eq!(fs::read_dir(&work_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_reset_work_dir_creates_missing() {
        let root = tempfile::tempdir().unwrap();
        let work_dir = root.path().join("a").join("temp");

        reset_work_dir(&work_dir).unwrap();

        assert!(work_dir.is_dir());
    }

    #[test]
    fn test_bad_url_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();

        let err = fetch_workbook("not a url", dir.path(), Duration::from_secs(1)).unwrap_err();

        assert!(matches!(err, Error::SourceUnavailable { .. }));
        assert!(!dir.path().join(WORKBOOK_FILE).exists());
    }
}
