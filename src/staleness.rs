/*!
 * Staleness classification of a remote file against its local copy
 */

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

/// What a sync pass should do with one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Staleness {
    /// Nothing exists at the local path
    Absent,
    /// The remote copy is newer than the local one
    Stale,
    /// The local copy is at least as new as the remote one
    Current,
}

impl Staleness {
    /// Whether a transfer is needed
    pub fn needs_transfer(self) -> bool {
        matches!(self, Staleness::Absent | Staleness::Stale)
    }
}

/// Parse a remote RFC 3339 timestamp, `None` if missing or malformed
pub fn parse_remote_instant(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Classify `local_path` against the remote update time.
///
/// The local modification time stands in for the last successful sync. A
/// missing or unparseable remote time counts as newer than any local copy.
/// Anything other than a regular file at `local_path` is an error, since a
/// transfer could not replace it.
pub fn classify(remote_updated_at: Option<&str>, local_path: &Path) -> io::Result<Staleness> {
    let metadata = match fs::metadata(local_path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Staleness::Absent),
        Err(e) => return Err(e),
    };

    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("{} exists and is not a regular file", local_path.display()),
        ));
    }

    let Some(remote) = parse_remote_instant(remote_updated_at) else {
        return Ok(Staleness::Stale);
    };

    let local: DateTime<Utc> = metadata.modified()?.into();
    if remote > local {
        Ok(Staleness::Stale)
    } else {
        Ok(Staleness::Current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::str::FromStr;

    use filetime::FileTime;
    use tempfile::tempdir;

    fn touch_at(path: &Path, rfc3339: &str) -> io::Result<()> {
        File::create(path)?;
        let secs = DateTime::parse_from_rfc3339(rfc3339).unwrap().timestamp();
        filetime::set_file_mtime(path, FileTime::from_unix_time(secs, 0))
    }

    #[test]
    fn test_absent_when_missing() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.pdf");
        assert_eq!(
            classify(Some("2024-01-10T00:00:00Z"), &path)?,
            Staleness::Absent
        );
        Ok(())
    }

    #[test]
    fn test_current_when_local_newer() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.pdf");
        touch_at(&path, "2024-01-15T00:00:00Z")?;
        assert_eq!(
            classify(Some("2024-01-10T00:00:00Z"), &path)?,
            Staleness::Current
        );
        Ok(())
    }

    #[test]
    fn test_current_when_equal() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.pdf");
        touch_at(&path, "2024-01-10T00:00:00Z")?;
        assert_eq!(
            classify(Some("2024-01-10T00:00:00Z"), &path)?,
            Staleness::Current
        );
        Ok(())
    }

    #[test]
    fn test_stale_when_remote_newer() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.pdf");
        touch_at(&path, "2024-01-05T00:00:00Z")?;
        assert_eq!(
            classify(Some("2024-01-10T00:00:00Z"), &path)?,
            Staleness::Stale
        );
        Ok(())
    }

    #[test]
    fn test_offset_timestamps_compare_as_instants() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.pdf");
        touch_at(&path, "2024-01-10T00:00:00Z")?;
        // 2024-01-09T23:00:00Z
        assert_eq!(
            classify(Some("2024-01-10T01:00:00+02:00"), &path)?,
            Staleness::Current
        );
        Ok(())
    }

    #[test]
    fn test_missing_or_bad_timestamp_is_stale() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.pdf");
        touch_at(&path, "2099-01-01T00:00:00Z")?;
        assert_eq!(classify(None, &path)?, Staleness::Stale);
        assert_eq!(classify(Some("yesterday"), &path)?, Staleness::Stale);
        assert_eq!(classify(Some(""), &path)?, Staleness::Stale);
        Ok(())
    }

    #[test]
    fn test_directory_in_the_way_is_an_error() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.pdf");
        fs::create_dir(&path)?;

        // Even an old remote time must not report the directory as current
        let err = classify(Some("2000-01-01T00:00:00Z"), &path).unwrap_err();
        assert!(err.to_string().contains("not a regular file"));
        assert!(classify(None, &path).is_err());
        Ok(())
    }

    #[test]
    fn test_parse_remote_instant() {
        assert!(parse_remote_instant(Some("2024-01-10T00:00:00Z")).is_some());
        assert!(parse_remote_instant(Some("2024-01-10")).is_none());
        assert!(parse_remote_instant(None).is_none());
    }

    #[test]
    fn test_display_and_needs_transfer() {
        assert_eq!(Staleness::Stale.to_string(), "stale");
        assert_eq!(Staleness::from_str("current").unwrap(), Staleness::Current);
        assert!(Staleness::Absent.needs_transfer());
        assert!(Staleness::Stale.needs_transfer());
        assert!(!Staleness::Current.needs_transfer());
    }
}
