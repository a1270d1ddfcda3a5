use chrono::{DateTime, Utc};
use onesync_core::domain::{
    ConflictBehavior, DriveItem, ItemReference, ItemStatus, RemoteId, SyncPath,
};
use onesync_tasks::localfs::{is_temp_name, temp_name};
use onesync_tasks::task::Task;
use onesync_tasks::tasks::SynchronizeDirTask;

use crate::common::{remote, ts, DriveCall, Harness, StoreOp, ROOT};

/// A drive item that exists only in the store
fn detached(name: &str, size: u64, modified: DateTime<Utc>, is_folder: bool) -> DriveItem {
    DriveItem {
        id: RemoteId::new(format!("GONE{}", name.len())).unwrap(),
        name: name.to_string(),
        size,
        parent_reference: ItemReference {
            id: None,
            path: remote(""),
        },
        modified_time: modified,
        is_folder,
        file_system_info: None,
    }
}

async fn sync(h: &Harness, dir: SyncPath) {
    let task = SynchronizeDirTask::new(h.child_context(), dir).unwrap();
    Box::new(task).handle().await.unwrap();
}

fn mutations(h: &Harness) -> Vec<DriveCall> {
    h.drive
        .calls()
        .into_iter()
        .filter(DriveCall::is_mutation)
        .collect()
}

// ============================================================================
// Remote folders
// ============================================================================

#[tokio::test]
async fn remote_folder_missing_locally_is_created_and_synced() {
    let mut h = Harness::new();
    h.drive.add_folder("Photos");
    h.drive
        .add_file("Photos/cat.jpg", b"meow", ts("2023-03-03T03:03:03Z"));

    sync(&h, h.root()).await;

    assert!(h.local("Photos").is_dir());
    assert_eq!(h.store.get("Photos").unwrap().status, ItemStatus::Ok);

    let summary = h.runner.run_until_idle(4).await;
    assert_eq!(summary.failed, 0);
    assert_eq!(std::fs::read(h.local("Photos/cat.jpg")).unwrap(), b"meow");
    assert_eq!(
        h.store.get("Photos/cat.jpg").unwrap().status,
        ItemStatus::Downloaded
    );
}

#[tokio::test]
async fn known_remote_folder_is_recursed_without_rewriting_record() {
    let mut h = Harness::new();
    let folder = h.drive.add_folder("Photos");
    h.store.seed(&folder, ItemStatus::Ok);
    std::fs::create_dir(h.local("Photos")).unwrap();

    sync(&h, h.root()).await;
    assert!(h.store.ops().is_empty());

    let summary = h.runner.run_until_idle(4).await;
    assert_eq!(summary.succeeded, 1);
    assert!(h
        .drive
        .calls()
        .contains(&DriveCall::ListChildren(format!("{ROOT}/Photos"))));
}

// ============================================================================
// Remote files
// ============================================================================

#[tokio::test]
async fn new_remote_file_is_downloaded() {
    let mut h = Harness::new();
    let modified = ts("2021-07-07T07:07:07Z");
    h.drive.add_file("a.txt", b"from the drive", modified);

    sync(&h, h.root()).await;
    assert!(h.store.ops().is_empty());

    let summary = h.runner.run_until_idle(4).await;
    assert_eq!(summary.succeeded, 1);
    assert_eq!(std::fs::read(h.local("a.txt")).unwrap(), b"from the drive");
    assert_eq!(h.local_mtime("a.txt"), modified);
}

#[tokio::test]
async fn file_deleted_locally_is_removed_remotely() {
    let mut h = Harness::new();
    let item = h
        .drive
        .add_file("a.txt", b"bye", ts("2021-07-07T07:07:07Z"));
    h.store.seed(&item, ItemStatus::Downloaded);

    sync(&h, h.root()).await;
    h.runner.run_until_idle(4).await;

    assert_eq!(mutations(&h), vec![DriveCall::Delete(format!("{ROOT}/a.txt"))]);
    assert!(h.drive.get("a.txt").is_none());
    assert!(h.store.get("a.txt").is_none());
}

#[tokio::test]
async fn matching_unknown_file_is_recorded_as_downloaded() {
    let mut h = Harness::new();
    let modified = ts("2021-07-07T07:07:07Z");
    h.drive.add_file("a.txt", b"same", modified);
    h.write_local("a.txt", b"same", modified).await;

    sync(&h, h.root()).await;

    assert_eq!(
        h.store.ops(),
        vec![StoreOp::Update {
            name: "a.txt".to_string(),
            status: ItemStatus::Downloaded,
        }]
    );
    let summary = h.runner.run_until_idle(4).await;
    assert_eq!(summary.total(), 0);
}

#[tokio::test]
async fn colliding_unknown_file_is_kept_as_conflict_copy() {
    let mut h = Harness::new();
    h.drive
        .add_file("a.txt", b"remote version", ts("2024-01-01T00:00:00Z"));
    h.write_local("a.txt", b"local", ts("2023-01-01T00:00:00Z"))
        .await;

    sync(&h, h.root()).await;
    h.runner.run_until_idle(4).await;

    let names = h.local_names("");
    assert_eq!(names.len(), 2, "{names:?}");
    assert_eq!(std::fs::read(h.local("a.txt")).unwrap(), b"remote version");
    let copy = names
        .iter()
        .find(|name| name.starts_with("a (conflicted copy "))
        .unwrap();
    assert!(copy.ends_with(").txt"));
    assert_eq!(std::fs::read(h.local(copy)).unwrap(), b"local");
}

#[tokio::test]
async fn locally_changed_file_is_uploaded_with_replace() {
    let mut h = Harness::new();
    let item = h
        .drive
        .add_file("a.txt", b"v1", ts("2021-01-01T00:00:00Z"));
    h.store.seed(&item, ItemStatus::Downloaded);
    h.write_local("a.txt", b"version two", ts("2022-01-01T00:00:00Z"))
        .await;

    sync(&h, h.root()).await;
    h.runner.run_until_idle(4).await;

    assert!(mutations(&h).contains(&DriveCall::Upload {
        name: "a.txt".to_string(),
        parent: ROOT.to_string(),
        size: 11,
        conflict_behavior: ConflictBehavior::Replace,
    }));
    assert_eq!(h.drive.content("a.txt").unwrap(), b"version two");
    assert_eq!(
        h.store.get("a.txt").unwrap().modified_time,
        ts("2022-01-01T00:00:00Z")
    );
}

#[tokio::test]
async fn remotely_changed_file_is_downloaded_again() {
    let mut h = Harness::new();
    let old = h
        .drive
        .add_file("a.txt", b"old", ts("2021-01-01T00:00:00Z"));
    h.store.seed(&old, ItemStatus::Downloaded);
    h.write_local("a.txt", b"old", ts("2021-01-01T00:00:00Z"))
        .await;
    h.drive
        .add_file("a.txt", b"brand new", ts("2022-01-01T00:00:00Z"));

    sync(&h, h.root()).await;
    h.runner.run_until_idle(4).await;

    assert!(mutations(&h).is_empty());
    assert_eq!(std::fs::read(h.local("a.txt")).unwrap(), b"brand new");
    assert_eq!(h.local_mtime("a.txt"), ts("2022-01-01T00:00:00Z"));
}

#[tokio::test]
async fn file_changed_on_both_sides_keeps_both_versions() {
    let mut h = Harness::new();
    let base = h
        .drive
        .add_file("a.txt", b"base", ts("2021-01-01T00:00:00Z"));
    h.store.seed(&base, ItemStatus::Downloaded);
    h.drive
        .add_file("a.txt", b"REMOTE EDIT!!", ts("2022-06-01T00:00:00Z"));
    h.write_local("a.txt", b"local edit", ts("2022-07-01T00:00:00Z"))
        .await;

    sync(&h, h.root()).await;
    h.runner.run_until_idle(4).await;

    assert!(mutations(&h).is_empty());
    assert_eq!(h.drive.content("a.txt").unwrap(), b"REMOTE EDIT!!");
    assert_eq!(std::fs::read(h.local("a.txt")).unwrap(), b"REMOTE EDIT!!");

    let names = h.local_names("");
    assert_eq!(names.len(), 2, "{names:?}");
    let copy = names
        .iter()
        .find(|name| name.starts_with("a (conflicted copy "))
        .unwrap();
    assert_eq!(std::fs::read(h.local(copy)).unwrap(), b"local edit");
}

#[tokio::test]
async fn unchanged_file_needs_nothing() {
    let mut h = Harness::new();
    let modified = ts("2021-01-01T00:00:00Z");
    let item = h.drive.add_file("a.txt", b"steady", modified);
    h.store.seed(&item, ItemStatus::Downloaded);
    h.write_local("a.txt", b"steady", modified).await;

    sync(&h, h.root()).await;

    assert_eq!(h.drive.calls(), vec![DriveCall::ListChildren(ROOT.to_string())]);
    assert!(h.store.ops().is_empty());
    assert_eq!(h.runner.run_until_idle(4).await.total(), 0);
}

// ============================================================================
// Local-only entries
// ============================================================================

#[tokio::test]
async fn file_deleted_remotely_is_removed_locally() {
    let h = Harness::new();
    let modified = ts("2021-01-01T00:00:00Z");
    h.store
        .seed(&detached("a.txt", 4, modified, false), ItemStatus::Downloaded);
    h.write_local("a.txt", b"gone", modified).await;

    sync(&h, h.root()).await;

    assert!(!h.local("a.txt").exists());
    assert_eq!(
        h.store.ops(),
        vec![StoreOp::Delete {
            parent: ROOT.to_string(),
            name: "a.txt".to_string(),
            is_folder: false,
        }]
    );
    assert!(mutations(&h).is_empty());
}

#[tokio::test]
async fn folder_deleted_remotely_is_removed_locally() {
    let h = Harness::new();
    h.store.seed(
        &detached("Old", 0, ts("2021-01-01T00:00:00Z"), true),
        ItemStatus::Ok,
    );
    h.write_local("Old/inner/file.txt", b"x", ts("2021-01-01T00:00:00Z"))
        .await;

    sync(&h, h.root()).await;

    assert!(!h.local("Old").exists());
    assert!(h.store.get("Old").is_none());
}

#[tokio::test]
async fn new_local_file_is_uploaded_with_rename() {
    let mut h = Harness::new();
    h.write_local("new.txt", b"fresh", ts("2024-04-04T04:04:04Z"))
        .await;

    sync(&h, h.root()).await;
    h.runner.run_until_idle(4).await;

    assert_eq!(
        mutations(&h)[0],
        DriveCall::Upload {
            name: "new.txt".to_string(),
            parent: ROOT.to_string(),
            size: 5,
            conflict_behavior: ConflictBehavior::Rename,
        }
    );
    assert_eq!(h.drive.content("new.txt").unwrap(), b"fresh");
    assert_eq!(h.store.get("new.txt").unwrap().status, ItemStatus::Ok);
}

#[tokio::test]
async fn new_local_entries_use_configured_conflict_behavior() {
    let mut h = Harness::with_conflict_behavior(ConflictBehavior::Fail);
    h.write_local("new.txt", b"fresh", ts("2024-04-04T04:04:04Z"))
        .await;
    std::fs::create_dir(h.local("Fresh")).unwrap();

    sync(&h, h.root()).await;
    h.runner.run_until_idle(4).await;

    let calls = mutations(&h);
    assert!(calls.contains(&DriveCall::Upload {
        name: "new.txt".to_string(),
        parent: ROOT.to_string(),
        size: 5,
        conflict_behavior: ConflictBehavior::Fail,
    }));
    assert!(calls.contains(&DriveCall::CreateDir {
        name: "Fresh".to_string(),
        parent: ROOT.to_string(),
        conflict_behavior: ConflictBehavior::Fail,
    }));
}

#[tokio::test]
async fn new_local_folder_is_created_with_its_contents() {
    let mut h = Harness::new();
    h.write_local("New/x.txt", b"inside", ts("2024-04-04T04:04:04Z"))
        .await;

    sync(&h, h.root()).await;
    let summary = h.runner.run_until_idle(4).await;

    assert_eq!(summary.failed, 0);
    assert!(mutations(&h).contains(&DriveCall::CreateDir {
        name: "New".to_string(),
        parent: ROOT.to_string(),
        conflict_behavior: ConflictBehavior::Rename,
    }));
    assert!(h.drive.get("New").unwrap().is_folder);
    assert_eq!(h.drive.content("New/x.txt").unwrap(), b"inside");
    assert!(h.store.get("New/x.txt").is_some());
}

// ============================================================================
// Skipped entries
// ============================================================================

#[tokio::test]
async fn folder_and_file_sharing_a_name_are_left_alone() {
    let mut h = Harness::new();
    h.drive.add_folder("thing");
    h.write_local("thing", b"a file", ts("2021-01-01T00:00:00Z"))
        .await;

    sync(&h, h.root()).await;

    assert!(h.local("thing").is_file());
    assert!(h.store.ops().is_empty());
    assert_eq!(h.runner.run_until_idle(4).await.total(), 0);
}

#[tokio::test]
async fn ignored_entries_are_skipped_on_both_sides() {
    let mut h = Harness::with_ignore_rules(&["*.tmp", "build/"]);
    h.write_local("scratch.tmp", b"x", ts("2021-01-01T00:00:00Z"))
        .await;
    h.write_local("build/out.o", b"x", ts("2021-01-01T00:00:00Z"))
        .await;
    h.drive
        .add_file("remote.tmp", b"x", ts("2021-01-01T00:00:00Z"));

    sync(&h, h.root()).await;

    assert!(h.store.ops().is_empty());
    assert_eq!(h.runner.run_until_idle(4).await.total(), 0);
    assert!(!h.local("remote.tmp").exists());
    assert!(mutations(&h).is_empty());
}

#[tokio::test]
async fn download_temp_files_are_not_uploaded() {
    let mut h = Harness::new();
    let stray = temp_name("a.txt");
    assert!(is_temp_name(&stray));
    h.write_local(&stray, b"partial", ts("2021-01-01T00:00:00Z"))
        .await;

    sync(&h, h.root()).await;

    assert_eq!(h.runner.run_until_idle(4).await.total(), 0);
    assert!(mutations(&h).is_empty());
}

#[tokio::test]
async fn stale_record_is_dropped() {
    let h = Harness::new();
    h.store.seed(
        &detached("ghost.txt", 1, ts("2021-01-01T00:00:00Z"), false),
        ItemStatus::Ok,
    );

    sync(&h, h.root()).await;

    assert!(h.store.get("ghost.txt").is_none());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn listing_failure_changes_nothing() {
    let mut h = Harness::new();
    h.drive.fail("list_children", 503);
    h.write_local("new.txt", b"fresh", ts("2024-04-04T04:04:04Z"))
        .await;

    let task = SynchronizeDirTask::new(h.child_context(), h.root()).unwrap();
    let err = Box::new(task).handle().await.unwrap_err();

    assert!(err.is_remote());
    assert!(h.store.ops().is_empty());
    assert_eq!(h.runner.run_until_idle(4).await.total(), 0);
}

#[tokio::test]
async fn store_read_failure_changes_nothing() {
    let mut h = Harness::new();
    h.store.fail("get_items");
    h.drive
        .add_file("a.txt", b"x", ts("2024-01-01T00:00:00Z"));

    let task = SynchronizeDirTask::new(h.child_context(), h.root()).unwrap();
    let err = Box::new(task).handle().await.unwrap_err();

    assert!(matches!(err, onesync_tasks::TaskError::Store(_)));
    assert_eq!(h.runner.run_until_idle(4).await.total(), 0);
    assert!(!h.local("a.txt").exists());
}

#[tokio::test]
async fn subdirectory_maps_to_nested_remote_path() {
    let h = Harness::new();
    std::fs::create_dir_all(h.local("a/b")).unwrap();

    let task = SynchronizeDirTask::new(h.child_context(), h.sync_path("a/b")).unwrap();
    assert_eq!(task.remote_dir(), &remote("a/b"));
}
