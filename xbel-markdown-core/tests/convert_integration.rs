use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

use xbel_markdown_core::config::ConvertConfig;
use xbel_markdown_core::contract::{
    MockClock, MockMarkupParser, MockStorage, RawNode, Storage, SystemClock,
};
use xbel_markdown_core::convert::run;
use xbel_markdown_core::error::{ConversionError, ParseError, RotationError, StorageError};
use xbel_markdown_core::parse::XbelParser;
use xbel_markdown_core::storage::LocalStorage;

const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xbel version="1.0">
  <folder>
    <bookmark href="https://example.com"><title>Example</title></bookmark>
    <folder>
      <title>Sub</title>
      <bookmark href="https://nested.example"><title>Nested</title></bookmark>
    </folder>
  </folder>
</xbel>"#;

const EXPECTED: &str =
    "# Bookmarks\n[Example](https://example.com)\n\n## Sub\n[Nested](https://nested.example)";

fn config_in(tmp: &TempDir, retention_count: usize) -> ConvertConfig {
    ConvertConfig {
        input_folder_path: tmp.path().join("sync"),
        input_file_name: "bookmarks.xbel".into(),
        output_folder_path: tmp.path().join("vault/notes"),
        output_file_name: "bookmarks.md".into(),
        backup_folder_path: tmp.path().join("vault/backups"),
        retention_count,
    }
}

fn write_input(config: &ConvertConfig, text: &str) {
    fs::create_dir_all(&config.input_folder_path).unwrap();
    fs::write(config.input_path(), text).unwrap();
}

fn clock_at(h: u32, m: u32, s: u32) -> MockClock {
    let at = NaiveDate::from_ymd_opt(2024, 5, 6)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap();
    let mut clock = MockClock::new();
    clock.expect_now().returning(move || at);
    clock
}

fn denied(path: &Path) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    }
}

#[tokio::test]
async fn test_first_run_creates_output_folder_and_file() {
    let tmp = tempdir().unwrap();
    let config = config_in(&tmp, 5);
    write_input(&config, EXPORT);

    let report = run(&config, &LocalStorage::new(), &XbelParser::new(), &SystemClock)
        .await
        .expect("run should succeed");

    assert_eq!(fs::read_to_string(config.output_path()).unwrap(), EXPECTED);
    assert_eq!(report.output_path, config.output_path());
    assert_eq!(report.archived, None);
    assert!(report.pruned.is_empty());
    assert_eq!(report.folders, 2);
    assert_eq!(report.links, 2);
    assert_eq!(report.bytes, EXPECTED.len());
}

#[tokio::test]
async fn test_second_run_archives_previous_output() {
    let tmp = tempdir().unwrap();
    let config = config_in(&tmp, 5);
    write_input(&config, EXPORT);
    let storage = LocalStorage::new();
    let parser = XbelParser::new();

    run(&config, &storage, &parser, &clock_at(9, 0, 0)).await.unwrap();
    fs::write(
        config.input_path(),
        r#"<xbel><title>Renamed</title><bookmark href="https://new.example"/></xbel>"#,
    )
    .unwrap();
    let report = run(&config, &storage, &parser, &clock_at(9, 30, 15))
        .await
        .unwrap();

    let backup = config.backup_folder_path.join("bookmarks-20240506093015.md");
    assert_eq!(report.archived.as_deref(), Some(backup.as_path()));
    assert_eq!(fs::read_to_string(&backup).unwrap(), EXPECTED);
    assert_eq!(
        fs::read_to_string(config.output_path()).unwrap(),
        "# Renamed\n[https://new.example](https://new.example)"
    );
}

#[tokio::test]
async fn test_missing_input_is_reported_and_nothing_written() {
    let tmp = tempdir().unwrap();
    let config = config_in(&tmp, 5);

    let err = run(&config, &LocalStorage::new(), &XbelParser::new(), &SystemClock)
        .await
        .unwrap_err();

    match err {
        ConversionError::InputNotFound(path) => assert_eq!(path, config.input_path()),
        other => panic!("expected InputNotFound, got {other:?}"),
    }
    assert!(!config.output_path().exists());
}

#[tokio::test]
async fn test_unparsable_input_is_reported_and_nothing_written() {
    let tmp = tempdir().unwrap();
    let config = config_in(&tmp, 5);
    write_input(&config, "<xbel><folder></xbel>");

    let err = run(&config, &LocalStorage::new(), &XbelParser::new(), &SystemClock)
        .await
        .unwrap_err();

    assert!(matches!(err, ConversionError::Parse(_)), "got {err:?}");
    assert!(!config.output_path().exists());
}

#[tokio::test]
async fn test_pruned_backups_go_to_trash() {
    let tmp = tempdir().unwrap();
    let config = config_in(&tmp, 1);
    write_input(&config, EXPORT);
    let trash = tmp.path().join("vault/.trash");
    let storage = LocalStorage::with_trash(&trash);
    let parser = XbelParser::new();

    run(&config, &storage, &parser, &clock_at(10, 0, 0)).await.unwrap();
    let report = run(&config, &storage, &parser, &clock_at(10, 0, 1)).await.unwrap();

    assert_eq!(report.pruned.len(), 1);
    let trashed: Vec<_> = fs::read_dir(&trash).unwrap().flatten().collect();
    assert_eq!(trashed.len(), 1);
    assert!(trashed[0]
        .file_name()
        .to_string_lossy()
        .ends_with("-bookmarks-20240506100001.md"));
}

#[tokio::test]
async fn test_rotation_failure_prevents_read_and_write() {
    let mut storage = MockStorage::new();
    storage
        .expect_exists()
        .returning(|p: &Path| !p.ends_with("backups"));
    storage
        .expect_create_folder()
        .returning(|p: &Path| Err(denied(p)));
    storage.expect_read_text().never();
    storage.expect_write_new_file().never();

    let mut parser = MockMarkupParser::new();
    parser.expect_parse().never();

    let mut clock = MockClock::new();
    clock.expect_now().never();

    let config = ConvertConfig {
        output_folder_path: "/vault".into(),
        backup_folder_path: "/vault/backups".into(),
        ..ConvertConfig::default()
    };
    let err = run(&config, &storage, &parser, &clock).await.unwrap_err();

    assert!(
        matches!(
            err,
            ConversionError::Rotation(RotationError::CreateBackupFolder { .. })
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_failed_move_keeps_previous_output_in_place() {
    let tmp = tempdir().unwrap();
    let config = config_in(&tmp, 5);
    write_input(&config, EXPORT);
    fs::create_dir_all(&config.output_folder_path).unwrap();
    fs::write(config.output_path(), "previous").unwrap();

    let mut storage = MockStorage::new();
    storage
        .expect_exists()
        .returning(|p: &Path| !p.to_string_lossy().contains("bookmarks-"));
    storage
        .expect_move_entry()
        .returning(|from: &Path, _to: &Path| Err(denied(from)));
    storage.expect_read_text().never();
    storage.expect_write_new_file().never();

    let err = run(&config, &storage, &XbelParser::new(), &clock_at(8, 0, 0))
        .await
        .unwrap_err();

    assert!(
        matches!(err, ConversionError::Rotation(RotationError::Archive { .. })),
        "got {err:?}"
    );
    assert_eq!(fs::read_to_string(config.output_path()).unwrap(), "previous");
}

#[tokio::test]
async fn test_output_reappearing_before_write_is_already_exists() {
    let mut storage = MockStorage::new();
    // Folders exist, output does not, backup folder is empty.
    storage
        .expect_exists()
        .returning(|p: &Path| !p.ends_with("bookmarks.md"));
    storage.expect_list_children().returning(|_| Ok(vec![]));
    storage
        .expect_read_text()
        .returning(|_| Ok("<xbel/>".to_string()));
    storage
        .expect_write_new_file()
        .returning(|p: &Path, _text: &str| Err(StorageError::AlreadyExists(p.to_path_buf())));

    let mut parser = MockMarkupParser::new();
    parser.expect_parse().returning(|_| Ok(RawNode::default()));

    let config = ConvertConfig {
        output_folder_path: "/vault".into(),
        ..ConvertConfig::default()
    };
    let err = run(&config, &storage, &parser, &MockClock::new())
        .await
        .unwrap_err();

    match err {
        ConversionError::AlreadyExists(path) => assert_eq!(path, config.output_path()),
        other => panic!("expected AlreadyExists, got {other:?}"),
    }
}

#[tokio::test]
async fn test_output_folder_failure_aborts_before_rotation_and_read() {
    let mut storage = MockStorage::new();
    storage.expect_exists().returning(|_| false);
    storage
        .expect_create_folder()
        .times(1)
        .returning(|p: &Path| Err(denied(p)));
    storage.expect_move_entry().never();
    storage.expect_list_children().never();
    storage.expect_read_text().never();
    storage.expect_write_new_file().never();

    let mut parser = MockMarkupParser::new();
    parser.expect_parse().never();

    let mut clock = MockClock::new();
    clock.expect_now().never();

    let config = ConvertConfig {
        output_folder_path: "/vault/notes".into(),
        ..ConvertConfig::default()
    };
    let err = run(&config, &storage, &parser, &clock).await.unwrap_err();

    assert!(matches!(err, ConversionError::Io(_)), "got {err:?}");
}

#[tokio::test]
async fn test_non_utf8_input_is_a_parse_error() {
    let tmp = tempdir().unwrap();
    let config = config_in(&tmp, 5);
    fs::create_dir_all(&config.input_folder_path).unwrap();
    // ISO-8859-1 "Café" inside a title.
    let mut latin1 = b"<xbel><bookmark href=\"https://a\"><title>Caf".to_vec();
    latin1.push(0xE9);
    latin1.extend_from_slice(b"</title></bookmark></xbel>");
    fs::write(config.input_path(), &latin1).unwrap();

    let err = run(&config, &LocalStorage::new(), &XbelParser::new(), &SystemClock)
        .await
        .unwrap_err();

    match err {
        ConversionError::Parse(ParseError::Malformed { position, .. }) => {
            assert_eq!(position, (latin1.len() - 27).to_string())
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
    assert!(!config.output_path().exists());
}

#[tokio::test]
async fn test_local_storage_exists_is_false_when_the_check_fails() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("plain.txt");
    fs::write(&file, "x").unwrap();

    let storage = LocalStorage::new();
    assert!(storage.exists(&file).await);
    // A path below a regular file cannot be checked (ENOTDIR).
    assert!(!storage.exists(&file.join("child")).await);
}

#[tokio::test]
async fn test_local_storage_reports_invalid_utf8_position() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("latin1.xbel");
    fs::write(&file, [b'a', b'b', 0xFF]).unwrap();

    let err = LocalStorage::new().read_text(&file).await.unwrap_err();
    assert!(
        matches!(err, StorageError::InvalidUtf8 { valid_up_to: 2, .. }),
        "got {err:?}"
    );
}
