//! Integration tests for whole mirror runs against an in-memory target

use super::test_utils::{local_snapshot, remote_snapshot, shape, write_tree};
use fsync::error::ActionError;
use fsync::sync::{Action, Mirror, MirrorOptions, OutcomeStatus};
use fsync::transport::MemoryTransport;
use fsync::tree::LocalTree;
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

fn mirror_for(dir: &TempDir) -> Mirror {
    Mirror::new(
        LocalTree::open(dir.path()).unwrap(),
        "/target",
        MirrorOptions::default(),
    )
}

#[test]
fn test_changed_size_and_remote_only_file() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), &[("music/a.mp3", "0123456789")]);

    let mut transport = MemoryTransport::new("/target");
    transport.add_directory("/target/music");
    transport.add_file("/target/music/a.mp3", b"01234567", None);
    transport.add_file("/target/music/old.mp3", b"01234", None);

    let prepared = mirror_for(&dir).prepare(&mut transport).unwrap();
    assert_eq!(
        prepared.plan.actions(),
        &[
            Action::UploadFile("music/a.mp3".into()),
            Action::DeleteFile("music/old.mp3".into()),
        ]
    );
}

#[test]
fn test_empty_master_clears_target() {
    let dir = TempDir::new().unwrap();
    let mut transport = MemoryTransport::new("/target");
    transport.add_directory("/target/stale");
    transport.add_file("/target/stale/x.txt", b"x", None);

    let mirror = mirror_for(&dir);
    let report = mirror.run(&mut transport, |_| {}).unwrap();
    assert!(report.is_success());
    assert_eq!(
        transport.calls()[transport.calls().len() - 2..],
        ["delete /target/stale/x.txt".to_string(), "rmdir /target/stale".to_string()]
    );
    assert!(remote_snapshot(&mut transport, "/target").is_empty());
}

#[test]
fn test_convergence_and_idempotence() {
    let dir = TempDir::new().unwrap();
    write_tree(
        dir.path(),
        &[
            ("a/b/c.txt", "abc"),
            ("a/empty/", ""),
            ("top.txt", "top"),
            ("z/deep/er/file.bin", "0000"),
        ],
    );

    let mut transport = MemoryTransport::new("/target");
    transport.add_directory("/target/a");
    transport.add_file("/target/a/stale.txt", b"s", None);
    transport.add_directory("/target/gone");
    transport.add_directory("/target/gone/sub");
    transport.add_file("/target/gone/sub/f", b"f", None);

    let mirror = mirror_for(&dir);
    let report = mirror.run(&mut transport, |_| {}).unwrap();
    assert!(report.is_success());

    assert_eq!(
        shape(&remote_snapshot(&mut transport, "/target")),
        shape(&local_snapshot(dir.path()))
    );

    let second = mirror.prepare(&mut transport).unwrap();
    assert!(second.plan.is_empty(), "second plan: {:?}", second.plan);
}

#[cfg(unix)]
#[test]
fn test_local_symlinks_never_reach_the_plan() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), &[("real/f.txt", "f")]);
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link_dir")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("real/f.txt"), dir.path().join("link_file"))
        .unwrap();

    let mut transport = MemoryTransport::new("/target");
    let prepared = mirror_for(&dir).prepare(&mut transport).unwrap();

    assert!(prepared.local.get("link_dir").is_none());
    assert!(prepared.local.get("link_file").is_none());
    assert!(prepared
        .plan
        .iter()
        .all(|action| !action.path().starts_with("link")));
}

#[test]
fn test_failed_directory_creation_skips_its_subtree_only() {
    let dir = TempDir::new().unwrap();
    write_tree(
        dir.path(),
        &[("bad/inner/f.txt", "1"), ("bad/g.txt", "2"), ("good/h.txt", "3")],
    );

    let mut transport = MemoryTransport::new("/target");
    transport.fail_on("mkdir", "/target/bad");
    transport.add_file("/target/obsolete.txt", b"x", None);

    let mut lines = Vec::new();
    let report = mirror_for(&dir)
        .run(&mut transport, |outcome| lines.push(outcome.action.to_string()))
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.skipped_count(), 3);
    assert_eq!(lines.len(), report.outcomes.len());

    let failed = report.failures().next().unwrap();
    assert_eq!(failed.action, Action::CreateDirectory("bad".into()));
    assert!(matches!(
        failed.status,
        OutcomeStatus::Failed {
            error: ActionError::RemoteWrite(_)
        }
    ));

    assert_eq!(transport.file_content("/target/good/h.txt"), Some(&b"3"[..]));
    assert!(!transport.contains("/target/obsolete.txt"));
}

#[test]
fn test_failed_upload_is_retried_next_run() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), &[("a.mp3", "aaa"), ("b.mp3", "bbb")]);

    let mut transport = MemoryTransport::new("/target");
    transport.fail_on("write", "/target/a.mp3");

    let mirror = mirror_for(&dir);
    let report = mirror.run(&mut transport, |_| {}).unwrap();
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.bytes_transferred, 3);

    let again = mirror.prepare(&mut transport).unwrap();
    assert_eq!(again.plan.actions(), &[Action::UploadFile("a.mp3".into())]);
}

#[test]
fn test_target_changed_concurrently_is_tolerated() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), &[("new/", "")]);

    let mut transport = MemoryTransport::new("/target");
    transport.add_file("/target/old.txt", b"x", None);

    let mirror = mirror_for(&dir);
    let prepared = mirror.prepare(&mut transport).unwrap();

    // Someone else converges the target between planning and execution
    fsync::transport::RemoteTransport::make_directory(&mut transport, "/target/new").unwrap();
    fsync::transport::RemoteTransport::remove_file(&mut transport, "/target/old.txt").unwrap();

    let report = mirror.apply(&prepared, &mut transport, |_| {});
    assert!(report.is_success());
    assert_eq!(report.tolerated_count(), 2);
}

#[test]
fn test_excluded_names_are_left_alone_on_both_sides() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), &[("Thumbs.db", "t"), ("a.mp3", "a")]);

    let mut transport = MemoryTransport::new("/target");
    transport.add_file("/target/Thumbs.db", b"remote thumbs", None);

    let options = MirrorOptions {
        walker: fsync::tree::WalkerConfig {
            ignore_patterns: vec!["Thumbs.db".to_string()],
            ..Default::default()
        },
        ..MirrorOptions::default()
    };
    let mirror = Mirror::new(LocalTree::open(dir.path()).unwrap(), "/target", options);
    let prepared = mirror.prepare(&mut transport).unwrap();
    assert_eq!(prepared.plan.actions(), &[Action::UploadFile("a.mp3".into())]);
}

#[test]
fn test_restored_older_version_is_reuploaded_then_settles() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), &[("song.mp3", "restored!!")]);
    let restored_at = UNIX_EPOCH + Duration::from_secs(1_000_000);
    std::fs::File::options()
        .write(true)
        .open(dir.path().join("song.mp3"))
        .unwrap()
        .set_modified(restored_at)
        .unwrap();

    let mut transport = MemoryTransport::new("/target");
    transport.add_file(
        "/target/song.mp3",
        b"newer mix!",
        Some(UNIX_EPOCH + Duration::from_secs(5_000_000)),
    );

    let mirror = mirror_for(&dir);
    let prepared = mirror.prepare(&mut transport).unwrap();
    assert_eq!(prepared.plan.actions(), &[Action::UploadFile("song.mp3".into())]);

    let report = mirror.apply(&prepared, &mut transport, |_| {});
    assert!(report.is_success());
    assert_eq!(transport.file_content("/target/song.mp3"), Some(&b"restored!!"[..]));
    assert_eq!(transport.modified_time("/target/song.mp3"), Some(restored_at));
    assert!(mirror.prepare(&mut transport).unwrap().plan.is_empty());
}

#[cfg(unix)]
#[test]
fn test_local_fifo_is_never_uploaded() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), &[("a.mp3", "a")]);
    let status = std::process::Command::new("mkfifo")
        .arg(dir.path().join("feed"))
        .status()
        .unwrap();
    assert!(status.success());

    let mut transport = MemoryTransport::new("/target");
    let report = mirror_for(&dir).run(&mut transport, |_| {}).unwrap();
    assert!(report.is_success());
    assert!(!transport.contains("/target/feed"));
    assert_eq!(transport.file_content("/target/a.mp3"), Some(&b"a"[..]));
}
