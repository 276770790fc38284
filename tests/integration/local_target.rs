//! Integration tests mirroring onto a real directory through LocalDirTransport

use super::test_utils::{local_snapshot, shape, write_tree};
use fsync::sync::{Action, Mirror, MirrorOptions};
use fsync::transport::LocalDirTransport;
use fsync::tree::LocalTree;
use std::fs;
use tempfile::TempDir;

fn mirror(source: &TempDir, target: &TempDir) -> Mirror {
    Mirror::new(
        LocalTree::open(source.path()).unwrap(),
        &target.path().to_string_lossy(),
        MirrorOptions::default(),
    )
}

#[test]
fn test_mirror_into_empty_directory() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    write_tree(
        source.path(),
        &[
            ("Artist/Album/01.mp3", "track one"),
            ("Artist/Album/02.mp3", "track two"),
            ("playlists/", ""),
            ("readme.txt", "hello"),
        ],
    );

    let mut transport = LocalDirTransport::new();
    let mirror = mirror(&source, &target);
    let report = mirror.run(&mut transport, |_| {}).unwrap();

    assert!(report.is_success());
    assert_eq!(shape(&local_snapshot(target.path())), shape(&local_snapshot(source.path())));
    assert_eq!(
        fs::read_to_string(target.path().join("Artist/Album/02.mp3")).unwrap(),
        "track two"
    );
    assert!(mirror.prepare(&mut transport).unwrap().plan.is_empty());
}

#[test]
fn test_kind_conflicts_are_replaced() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    write_tree(source.path(), &[("p", "now a file"), ("q/inner.txt", "now a dir")]);
    write_tree(
        target.path(),
        &[("p/deep/x.txt", "x"), ("p/y.txt", "y"), ("q", "was a file")],
    );

    let mut transport = LocalDirTransport::new();
    let mirror = mirror(&source, &target);
    let prepared = mirror.prepare(&mut transport).unwrap();
    assert!(prepared.plan.check_order().is_ok());
    assert_eq!(
        &prepared.plan.actions()[..5],
        &[
            Action::DeleteFile("p/deep/x.txt".into()),
            Action::RemoveDirectory("p/deep".into()),
            Action::DeleteFile("p/y.txt".into()),
            Action::RemoveDirectory("p".into()),
            Action::DeleteFile("q".into()),
        ]
    );

    let report = mirror.apply(&prepared, &mut transport, |_| {});
    assert!(report.is_success(), "failures: {:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(fs::read_to_string(target.path().join("p")).unwrap(), "now a file");
    assert!(target.path().join("q").is_dir());
}

#[cfg(unix)]
#[test]
fn test_target_symlink_is_replaced_not_followed() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    write_tree(source.path(), &[("song.mp3", "fresh content")]);
    write_tree(outside.path(), &[("victim.mp3", "keep me")]);
    std::os::unix::fs::symlink(
        outside.path().join("victim.mp3"),
        target.path().join("song.mp3"),
    )
    .unwrap();

    let mut transport = LocalDirTransport::new();
    let report = mirror(&source, &target).run(&mut transport, |_| {}).unwrap();
    assert!(report.is_success());

    let meta = fs::symlink_metadata(target.path().join("song.mp3")).unwrap();
    assert!(meta.file_type().is_file());
    assert_eq!(
        fs::read_to_string(outside.path().join("victim.mp3")).unwrap(),
        "keep me"
    );
}

#[test]
fn test_hidden_files_untouched_by_default() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    write_tree(source.path(), &[(".cache/blob", "x"), ("a.txt", "a")]);
    write_tree(target.path(), &[(".keep", "target-only hidden file")]);

    let mut transport = LocalDirTransport::new();
    let report = mirror(&source, &target).run(&mut transport, |_| {}).unwrap();
    assert!(report.is_success());
    assert!(target.path().join(".keep").exists());
    assert!(!target.path().join(".cache").exists());
    assert!(target.path().join("a.txt").exists());
}

#[test]
fn test_missing_source_root_is_rejected() {
    let source = TempDir::new().unwrap();
    assert!(LocalTree::open(&source.path().join("missing")).is_err());
}
