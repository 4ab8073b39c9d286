//! The filesystem operation set.
//!
//! Every operation takes the sandbox, the session's relative working
//! directory, and the path exactly as the user typed it. Resolution and
//! containment checks happen here, so a caller cannot forget them; the raw
//! path is what error messages and outcomes echo back. OS errors map onto
//! the domain taxonomy via [`ReefError::from_io`] with that raw path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use reef_core::error::{ReefError, Result};
use reef_core::outcome::{EntryInfo, OperationData, OperationOutcome};

use crate::sandbox::Sandbox;

/// Lists a directory, directories first, alphabetical within each group.
pub async fn list_dir(sandbox: &Sandbox, cwd: &Path, raw: &str) -> Result<OperationOutcome> {
    let path = sandbox.resolve(cwd, raw)?;
    sandbox.verify_containment(&path, raw)?;

    let mut read_dir = fs::read_dir(&path)
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;

    let mut entries = Vec::new();
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .map_err(|e| ReefError::from_io(e, raw))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry
            .file_type()
            .await
            .map_err(|e| ReefError::from_io(e, raw))?
            .is_dir();
        entries.push(EntryInfo { name, is_dir });
    }

    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    let message = if entries.is_empty() {
        "Directory is empty".to_string()
    } else {
        entries
            .iter()
            .map(EntryInfo::display_name)
            .collect::<Vec<_>>()
            .join("\n")
    };

    Ok(OperationOutcome::with_data(
        message,
        OperationData::Listing(entries),
    ))
}

/// Creates one directory. The parent must already exist.
pub async fn make_dir(sandbox: &Sandbox, cwd: &Path, raw: &str) -> Result<OperationOutcome> {
    let path = sandbox.resolve(cwd, raw)?;
    sandbox.verify_containment(&path, raw)?;

    fs::create_dir(&path)
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;

    Ok(OperationOutcome::with_data(
        format!("Directory created: {raw}"),
        OperationData::Path(raw.to_string()),
    ))
}

/// Removes a directory. Non-recursive removal of a non-empty directory is
/// `NotEmpty`; `recursive` removes the whole tree.
pub async fn remove_dir(
    sandbox: &Sandbox,
    cwd: &Path,
    raw: &str,
    recursive: bool,
) -> Result<OperationOutcome> {
    let path = sandbox.resolve(cwd, raw)?;
    sandbox.verify_containment(&path, raw)?;

    // The session root must outlive every command that runs inside it.
    if path == sandbox.root() {
        return Err(ReefError::operation_failed(
            "cannot remove the session root",
        ));
    }

    let metadata = fs::metadata(&path)
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;
    if !metadata.is_dir() {
        return Err(ReefError::not_a_directory(raw));
    }

    if recursive {
        fs::remove_dir_all(&path)
            .await
            .map_err(|e| ReefError::from_io(e, raw))?;
        Ok(OperationOutcome::with_data(
            format!("Directory and contents removed: {raw}"),
            OperationData::Path(raw.to_string()),
        ))
    } else {
        fs::remove_dir(&path)
            .await
            .map_err(|e| ReefError::from_io(e, raw))?;
        Ok(OperationOutcome::with_data(
            format!("Directory removed: {raw}"),
            OperationData::Path(raw.to_string()),
        ))
    }
}

/// Creates an empty file, or refreshes the mtime when it already exists.
pub async fn touch_file(sandbox: &Sandbox, cwd: &Path, raw: &str) -> Result<OperationOutcome> {
    let path = sandbox.resolve(cwd, raw)?;
    sandbox.verify_containment(&path, raw)?;

    let existed = match fs::metadata(&path).await {
        Ok(metadata) => {
            if metadata.is_dir() {
                return Err(ReefError::is_a_directory(raw));
            }
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => return Err(ReefError::from_io(e, raw)),
    };

    let file = fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;

    if existed {
        // Append-open alone does not update the mtime.
        let std_file = file.into_std().await;
        std_file
            .set_modified(std::time::SystemTime::now())
            .map_err(|e| ReefError::from_io(e, raw))?;
        Ok(OperationOutcome::with_data(
            format!("File timestamp updated: {raw}"),
            OperationData::Path(raw.to_string()),
        ))
    } else {
        Ok(OperationOutcome::with_data(
            format!("File created: {raw}"),
            OperationData::Path(raw.to_string()),
        ))
    }
}

/// Removes one file.
pub async fn remove_file(sandbox: &Sandbox, cwd: &Path, raw: &str) -> Result<OperationOutcome> {
    let path = sandbox.resolve(cwd, raw)?;
    sandbox.verify_containment(&path, raw)?;

    let metadata = fs::metadata(&path)
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;
    if metadata.is_dir() {
        return Err(ReefError::is_a_directory(raw));
    }

    fs::remove_file(&path)
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;

    Ok(OperationOutcome::with_data(
        format!("File removed: {raw}"),
        OperationData::Path(raw.to_string()),
    ))
}

/// Reads a whole file as UTF-8 text. Invalid bytes are a `Decode` error,
/// never a crash.
pub async fn read_file(sandbox: &Sandbox, cwd: &Path, raw: &str) -> Result<OperationOutcome> {
    let path = sandbox.resolve(cwd, raw)?;
    sandbox.verify_containment(&path, raw)?;

    let metadata = fs::metadata(&path)
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;
    if metadata.is_dir() {
        return Err(ReefError::is_a_directory(raw));
    }

    let bytes = fs::read(&path)
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;
    let content = String::from_utf8(bytes).map_err(|_| ReefError::decode(raw))?;

    let message = if content.is_empty() {
        "(empty file)".to_string()
    } else {
        content.trim_end_matches('\n').to_string()
    };

    Ok(OperationOutcome::with_data(
        message,
        OperationData::Text(content),
    ))
}

/// Writes text (plus a trailing newline) to a file, truncating or appending.
pub async fn write_file(
    sandbox: &Sandbox,
    cwd: &Path,
    raw: &str,
    text: &str,
    append: bool,
) -> Result<OperationOutcome> {
    let path = sandbox.resolve(cwd, raw)?;
    sandbox.verify_containment(&path, raw)?;

    match fs::metadata(&path).await {
        Ok(metadata) if metadata.is_dir() => return Err(ReefError::is_a_directory(raw)),
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(ReefError::from_io(e, raw)),
    }

    let content = format!("{text}\n");
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true);
    if append {
        options.append(true);
    } else {
        options.truncate(true);
    }

    let mut file = options
        .open(&path)
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;
    file.write_all(content.as_bytes())
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;
    file.flush()
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;

    let bytes = content.len() as u64;
    let verb = if append { "Appended" } else { "Wrote" };
    Ok(OperationOutcome::with_data(
        format!("{verb} {bytes} bytes to {raw}"),
        OperationData::BytesWritten(bytes),
    ))
}

/// Counts files and directories directly inside a directory.
pub async fn count_entries(sandbox: &Sandbox, cwd: &Path, raw: &str) -> Result<OperationOutcome> {
    let path = sandbox.resolve(cwd, raw)?;
    sandbox.verify_containment(&path, raw)?;

    let mut read_dir = fs::read_dir(&path)
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;

    let mut files = 0usize;
    let mut dirs = 0usize;
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .map_err(|e| ReefError::from_io(e, raw))?
    {
        if entry
            .file_type()
            .await
            .map_err(|e| ReefError::from_io(e, raw))?
            .is_dir()
        {
            dirs += 1;
        } else {
            files += 1;
        }
    }

    let total = files + dirs;
    Ok(OperationOutcome::with_data(
        format!("Files: {files}, Directories: {dirs}, Total: {total}"),
        OperationData::Counts { files, dirs },
    ))
}

/// Validates a directory change and returns the new root-relative cwd.
/// The caller commits it to the session.
pub async fn change_dir(sandbox: &Sandbox, cwd: &Path, raw: &str) -> Result<PathBuf> {
    let rel = sandbox.resolve_relative(cwd, raw)?;
    let path = sandbox.root().join(&rel);
    sandbox.verify_containment(&path, raw)?;

    let metadata = fs::metadata(&path)
        .await
        .map_err(|e| ReefError::from_io(e, raw))?;
    if !metadata.is_dir() {
        return Err(ReefError::not_a_directory(raw));
    }

    Ok(rel)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn sandbox() -> Sandbox {
        Sandbox::ephemeral().await.unwrap()
    }

    fn root_cwd() -> PathBuf {
        PathBuf::new()
    }

    #[tokio::test]
    async fn test_make_dir_then_list_shows_it() {
        let sb = sandbox().await;
        let outcome = make_dir(&sb, &root_cwd(), "project").await.unwrap();
        assert_eq!(outcome.message, "Directory created: project");

        let listing = list_dir(&sb, &root_cwd(), ".").await.unwrap();
        assert_eq!(listing.message, "project/");
    }

    #[tokio::test]
    async fn test_make_dir_twice_is_already_exists() {
        let sb = sandbox().await;
        make_dir(&sb, &root_cwd(), "project").await.unwrap();
        let err = make_dir(&sb, &root_cwd(), "project").await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_make_dir_missing_parent_is_not_found() {
        let sb = sandbox().await;
        let err = make_dir(&sb, &root_cwd(), "a/b/c").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_sorts_directories_first() {
        let sb = sandbox().await;
        make_dir(&sb, &root_cwd(), "zeta").await.unwrap();
        make_dir(&sb, &root_cwd(), "Alpha").await.unwrap();
        touch_file(&sb, &root_cwd(), "beta.txt").await.unwrap();
        touch_file(&sb, &root_cwd(), "aaa.txt").await.unwrap();

        let outcome = list_dir(&sb, &root_cwd(), ".").await.unwrap();
        assert_eq!(outcome.message, "Alpha/\nzeta/\naaa.txt\nbeta.txt");
    }

    #[tokio::test]
    async fn test_list_empty_directory() {
        let sb = sandbox().await;
        let outcome = list_dir(&sb, &root_cwd(), ".").await.unwrap();
        assert_eq!(outcome.message, "Directory is empty");
        assert_eq!(outcome.data, Some(OperationData::Listing(Vec::new())));
    }

    #[tokio::test]
    async fn test_list_missing_and_non_directory_targets() {
        let sb = sandbox().await;
        assert!(list_dir(&sb, &root_cwd(), "nope").await.unwrap_err().is_not_found());

        touch_file(&sb, &root_cwd(), "plain.txt").await.unwrap();
        let err = list_dir(&sb, &root_cwd(), "plain.txt").await.unwrap_err();
        assert_eq!(err.kind(), "not_a_directory");
    }

    #[tokio::test]
    async fn test_remove_dir_requires_empty_without_recursive() {
        let sb = sandbox().await;
        make_dir(&sb, &root_cwd(), "full").await.unwrap();
        touch_file(&sb, &root_cwd(), "full/keep.txt").await.unwrap();

        let err = remove_dir(&sb, &root_cwd(), "full", false).await.unwrap_err();
        assert!(err.is_not_empty());
        assert!(err.to_string().contains("rmdir -r"));

        // Recursive removal takes the whole tree
        let outcome = remove_dir(&sb, &root_cwd(), "full", true).await.unwrap();
        assert_eq!(outcome.message, "Directory and contents removed: full");
        assert!(list_dir(&sb, &root_cwd(), "full").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_remove_dir_on_file_is_not_a_directory() {
        let sb = sandbox().await;
        touch_file(&sb, &root_cwd(), "plain.txt").await.unwrap();
        let err = remove_dir(&sb, &root_cwd(), "plain.txt", false).await.unwrap_err();
        assert_eq!(err.kind(), "not_a_directory");
    }

    #[tokio::test]
    async fn test_remove_dir_refuses_the_session_root() {
        let sb = sandbox().await;
        let err = remove_dir(&sb, &root_cwd(), ".", true).await.unwrap_err();
        assert_eq!(err.kind(), "operation_failed");
        assert!(sb.root().exists());
    }

    #[tokio::test]
    async fn test_touch_reports_created_then_updated() {
        let sb = sandbox().await;
        let first = touch_file(&sb, &root_cwd(), "notes.txt").await.unwrap();
        assert_eq!(first.message, "File created: notes.txt");

        let second = touch_file(&sb, &root_cwd(), "notes.txt").await.unwrap();
        assert_eq!(second.message, "File timestamp updated: notes.txt");
    }

    #[tokio::test]
    async fn test_touch_on_directory_is_is_a_directory() {
        let sb = sandbox().await;
        make_dir(&sb, &root_cwd(), "project").await.unwrap();
        let err = touch_file(&sb, &root_cwd(), "project").await.unwrap_err();
        assert_eq!(err.kind(), "is_a_directory");
    }

    #[tokio::test]
    async fn test_remove_file_and_error_cases() {
        let sb = sandbox().await;
        touch_file(&sb, &root_cwd(), "doomed.txt").await.unwrap();
        let outcome = remove_file(&sb, &root_cwd(), "doomed.txt").await.unwrap();
        assert_eq!(outcome.message, "File removed: doomed.txt");

        assert!(remove_file(&sb, &root_cwd(), "doomed.txt").await.unwrap_err().is_not_found());

        make_dir(&sb, &root_cwd(), "project").await.unwrap();
        let err = remove_file(&sb, &root_cwd(), "project").await.unwrap_err();
        assert_eq!(err.kind(), "is_a_directory");
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let sb = sandbox().await;
        let outcome = write_file(&sb, &root_cwd(), "greeting.txt", "hello", false)
            .await
            .unwrap();
        assert_eq!(outcome.message, "Wrote 6 bytes to greeting.txt");
        assert_eq!(outcome.data, Some(OperationData::BytesWritten(6)));

        let read = read_file(&sb, &root_cwd(), "greeting.txt").await.unwrap();
        assert_eq!(read.message, "hello");
        assert_eq!(read.data, Some(OperationData::Text("hello\n".to_string())));
    }

    #[tokio::test]
    async fn test_write_append_keeps_existing_content() {
        let sb = sandbox().await;
        write_file(&sb, &root_cwd(), "log.txt", "one", false).await.unwrap();
        let outcome = write_file(&sb, &root_cwd(), "log.txt", "two", true).await.unwrap();
        assert_eq!(outcome.message, "Appended 4 bytes to log.txt");

        let read = read_file(&sb, &root_cwd(), "log.txt").await.unwrap();
        assert_eq!(read.message, "one\ntwo");
    }

    #[tokio::test]
    async fn test_write_truncates_by_default() {
        let sb = sandbox().await;
        write_file(&sb, &root_cwd(), "log.txt", "a much longer line", false)
            .await
            .unwrap();
        write_file(&sb, &root_cwd(), "log.txt", "short", false).await.unwrap();

        let read = read_file(&sb, &root_cwd(), "log.txt").await.unwrap();
        assert_eq!(read.message, "short");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_not_found() {
        let sb = sandbox().await;
        let err = read_file(&sb, &root_cwd(), "missing.txt").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_read_rejects_invalid_utf8() {
        let sb = sandbox().await;
        std::fs::write(sb.root().join("blob.bin"), [0xff, 0xfe, 0x00, 0x01]).unwrap();

        let err = read_file(&sb, &root_cwd(), "blob.bin").await.unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[tokio::test]
    async fn test_read_empty_file_message() {
        let sb = sandbox().await;
        touch_file(&sb, &root_cwd(), "empty.txt").await.unwrap();
        let outcome = read_file(&sb, &root_cwd(), "empty.txt").await.unwrap();
        assert_eq!(outcome.message, "(empty file)");
    }

    #[tokio::test]
    async fn test_count_entries() {
        let sb = sandbox().await;
        make_dir(&sb, &root_cwd(), "a").await.unwrap();
        make_dir(&sb, &root_cwd(), "b").await.unwrap();
        touch_file(&sb, &root_cwd(), "one.txt").await.unwrap();

        let outcome = count_entries(&sb, &root_cwd(), ".").await.unwrap();
        assert_eq!(outcome.message, "Files: 1, Directories: 2, Total: 3");
        assert_eq!(outcome.data, Some(OperationData::Counts { files: 1, dirs: 2 }));
    }

    #[tokio::test]
    async fn test_change_dir_validates_target() {
        let sb = sandbox().await;
        make_dir(&sb, &root_cwd(), "project").await.unwrap();

        let rel = change_dir(&sb, &root_cwd(), "project").await.unwrap();
        assert_eq!(rel, PathBuf::from("project"));

        // Back up to the root
        let rel = change_dir(&sb, &rel, "..").await.unwrap();
        assert_eq!(rel, PathBuf::new());

        assert!(change_dir(&sb, &root_cwd(), "missing").await.unwrap_err().is_not_found());

        touch_file(&sb, &root_cwd(), "plain.txt").await.unwrap();
        let err = change_dir(&sb, &root_cwd(), "plain.txt").await.unwrap_err();
        assert_eq!(err.kind(), "not_a_directory");
    }

    #[tokio::test]
    async fn test_operations_reject_traversal() {
        let sb = sandbox().await;
        let err = write_file(&sb, &root_cwd(), "../evil.txt", "x", false)
            .await
            .unwrap_err();
        assert!(err.is_path_escape());

        let err = read_file(&sb, &root_cwd(), "/etc/passwd").await.unwrap_err();
        assert!(err.is_path_escape());

        // The session stays usable after a rejected path
        make_dir(&sb, &root_cwd(), "still-works").await.unwrap();
    }
}
