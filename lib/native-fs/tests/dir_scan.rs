use std::collections::BTreeMap;
use std::ffi::OsString;

use tempfile::TempDir;

use native_fs::{read_dir, DirEntry, FsErrorKind, FsResult};

fn collect_entries(path: &std::path::Path) -> Vec<DirEntry> {
    read_dir(path)
        .expect("open scan")
        .collect::<FsResult<Vec<_>>>()
        .expect("scan entries")
}

#[test]
fn scanning_a_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    let err = read_dir(temp.path().join("absent")).expect_err("no directory to scan");
    assert_eq!(err.kind(), FsErrorKind::NotFound);
}

#[test]
fn empty_directory_yields_no_entries() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("empty");
    std::fs::create_dir(&dir).unwrap();

    assert!(collect_entries(&dir).is_empty());
}

#[test]
fn scan_reports_each_entry_exactly_once() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("a.bin"), b"1").unwrap();
    std::fs::write(temp.path().join("b.bin"), b"22").unwrap();
    std::fs::write(temp.path().join("c.bin"), b"333").unwrap();
    std::fs::create_dir(temp.path().join("sub")).unwrap();
    std::fs::write(temp.path().join("sub").join("nested.bin"), b"hidden").unwrap();

    let entries = collect_entries(temp.path());
    assert_eq!(entries.len(), 4, "one entry per child, nothing recursed");

    let by_name: BTreeMap<String, &DirEntry> = entries
        .iter()
        .map(|e| (e.name.to_string_lossy().into_owned(), e))
        .collect();
    assert_eq!(by_name.len(), 4, "no duplicates");
    assert!(!by_name.contains_key("."));
    assert!(!by_name.contains_key(".."));

    let sizes = [("a.bin", 1u64), ("b.bin", 2), ("c.bin", 3)];
    for (name, len) in sizes {
        let entry = by_name[name];
        assert!(entry.is_regular_file(), "{name} is a file");
        assert!(!entry.is_directory());
        assert_eq!(entry.len, len, "{name} length");
        assert!(entry.modified > 0, "{name} has a modification stamp");
        assert!(entry.created > 0, "{name} has a creation stamp");
    }

    let sub = by_name["sub"];
    assert!(sub.is_directory());
    assert!(!sub.is_regular_file());
}

#[test]
fn repeated_scans_agree() {
    let temp = TempDir::new().unwrap();
    for name in ["x", "y", "z"] {
        std::fs::write(temp.path().join(name), name.as_bytes()).unwrap();
    }

    let mut first: Vec<OsString> = collect_entries(temp.path())
        .into_iter()
        .map(|e| e.name)
        .collect();
    let mut second: Vec<OsString> = collect_entries(temp.path())
        .into_iter()
        .map(|e| e.name)
        .collect();
    first.sort();
    second.sort();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn iterator_is_fused_after_exhaustion() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("only.bin"), b"x").unwrap();

    let mut scan = read_dir(temp.path()).expect("open scan");
    assert!(scan.next().is_some());
    assert!(scan.next().is_none(), "exhausted");
    for _ in 0..3 {
        assert!(scan.next().is_none(), "stays exhausted");
    }
}

#[test]
fn abandoned_scan_releases_the_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("scanned");
    std::fs::create_dir(&dir).unwrap();
    for name in ["one", "two", "three"] {
        std::fs::write(dir.join(name), name.as_bytes()).unwrap();
    }

    let mut scan = read_dir(&dir).expect("open scan");
    let first = scan.next().expect("at least one entry").expect("entry");
    assert!(!first.name.is_empty());
    drop(scan);

    // With the search handle released the directory can be removed.
    std::fs::remove_dir_all(&dir).expect("remove scanned directory");
    assert!(!native_fs::exists(&dir));
}

#[test]
fn scan_reports_the_scanned_path() {
    let temp = TempDir::new().unwrap();
    let scan = read_dir(temp.path()).expect("open scan");
    assert_eq!(scan.path(), temp.path());
}
