use std::path::Path;

use tempfile::TempDir;

use native_fs::{
    attributes, check_last_os, check_last_os_accepting, check_os_code, codes, create_dir, exists,
    full_path, Disposition, FsErrorKind, OpenOptions,
};

#[test]
fn code_translation_honors_the_accept_set() {
    assert!(check_os_code(codes::SUCCESS, &[], "native.call").is_ok());
    assert!(check_os_code(codes::SUCCESS, &[codes::NOT_FOUND], "native.call").is_ok());
    assert!(check_os_code(codes::NOT_FOUND, &[codes::NOT_FOUND], "native.call").is_ok());

    let err = check_os_code(codes::NOT_FOUND, &[codes::ALREADY_EXISTS], "native.call")
        .expect_err("code outside the accept set");
    assert_eq!(err.kind(), FsErrorKind::NotFound);
    assert_eq!(err.raw_os_code(), Some(codes::NOT_FOUND));
    assert_eq!(err.context(), "native.call");

    // An empty accept set tolerates nothing but success.
    assert!(check_os_code(codes::ALREADY_EXISTS, &[], "native.call").is_err());
}

#[test]
fn last_error_checks_see_the_preceding_native_failure() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("absent");
    assert!(std::fs::metadata(&missing).is_err());

    let err = check_last_os("native.stat").expect_err("stat just failed");
    assert_eq!(err.kind(), FsErrorKind::NotFound);
    assert_eq!(err.raw_os_code(), Some(codes::NOT_FOUND));

    assert!(std::fs::metadata(&missing).is_err());
    check_last_os_accepting("native.stat", &[codes::NOT_FOUND])
        .expect("caller tolerates a missing path");
}

#[test]
fn create_dir_accepts_listed_codes() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("made");

    create_dir(&dir, &[]).expect("first create");
    let err = create_dir(&dir, &[]).expect_err("directory already present");
    assert_eq!(err.kind(), FsErrorKind::AlreadyExists);
    assert_eq!(err.raw_os_code(), Some(codes::ALREADY_EXISTS));

    create_dir(&dir, &[codes::ALREADY_EXISTS]).expect("existing directory tolerated");
    assert!(exists(&dir));
}

#[test]
fn create_dir_under_a_missing_parent_fails() {
    let temp = TempDir::new().unwrap();
    let err = create_dir(temp.path().join("a").join("b"), &[]).expect_err("parent is missing");
    assert_eq!(err.kind(), FsErrorKind::NotFound);
}

#[test]
fn probes_classify_missing_and_misused_paths() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("plain.bin");
    std::fs::write(&file, b"data").unwrap();

    assert!(exists(&file));
    assert!(exists(temp.path()));
    assert!(!exists(temp.path().join("absent")));

    let attrs = attributes(&file).expect("attributes of a file");
    assert!(attrs.is_regular_file());
    assert!(!attrs.is_directory());

    let attrs = attributes(temp.path()).expect("attributes of a directory");
    assert!(attrs.is_directory());

    let err = attributes(temp.path().join("absent")).expect_err("nothing there");
    assert_eq!(err.kind(), FsErrorKind::NotFound);
    assert!(!err.os_description().expect("code attached").is_empty());

    // A file used as a directory component classifies like a missing path.
    let through_file = file.join("child");
    assert!(!exists(&through_file));
    let err = attributes(&through_file).expect_err("file is not a directory");
    assert_eq!(err.kind(), FsErrorKind::NotFound);
}

#[test]
fn nul_bytes_in_paths_are_rejected_up_front() {
    let poisoned = Path::new("with\0nul");
    assert!(!exists(poisoned));

    let mut options = OpenOptions::new();
    options.read(true).disposition(Disposition::OpenExisting);
    let err = options.open(poisoned).expect_err("path cannot reach the OS");
    assert_eq!(err.kind(), FsErrorKind::InvalidInput);
    assert_eq!(err.raw_os_code(), None);
}

#[test]
fn full_path_absolutizes_and_collapses() {
    let temp = TempDir::new().unwrap();
    let twisted = temp.path().join("x").join(".").join("y").join("..").join("z");
    let resolved = full_path(&twisted).expect("resolve");
    assert_eq!(resolved, temp.path().join("x").join("z"));

    let relative = full_path(Path::new("rel")).expect("resolve relative");
    assert!(relative.is_absolute());
    assert_eq!(
        relative,
        std::env::current_dir().unwrap().join("rel")
    );
}

#[test]
fn errors_render_their_context_and_code() {
    let temp = TempDir::new().unwrap();
    let err = attributes(temp.path().join("absent")).expect_err("nothing there");
    let text = err.to_string();
    assert!(text.starts_with("probe.attributes: entity not found"), "{text}");
    assert!(text.contains("os error"), "{text}");
}
