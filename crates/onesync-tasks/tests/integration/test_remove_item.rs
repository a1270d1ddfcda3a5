use onesync_core::domain::ItemStatus;
use onesync_tasks::task::Task;
use onesync_tasks::tasks::RemoveItemTask;

use crate::common::{ts, DriveCall, Harness, StoreOp, ROOT};

#[tokio::test]
async fn deletes_remote_item_and_record() {
    let h = Harness::new();
    let item = h
        .drive
        .add_file("old.txt", b"bye", ts("2024-01-01T00:00:00Z"));
    h.store.seed(&item, ItemStatus::Ok);

    let task = RemoveItemTask::new(h.child_context(), h.root(), "old.txt", false).unwrap();
    assert_eq!(task.item_path().as_str(), format!("{ROOT}/old.txt"));
    Box::new(task).handle().await.unwrap();

    assert!(h.drive.get("old.txt").is_none());
    assert!(h.store.get("old.txt").is_none());
    assert_eq!(
        h.store.ops(),
        vec![StoreOp::Delete {
            parent: ROOT.to_string(),
            name: "old.txt".to_string(),
            is_folder: false,
        }]
    );
}

#[tokio::test]
async fn missing_remote_item_counts_as_deleted() {
    let h = Harness::new();
    let item = h
        .drive
        .add_file("old.txt", b"bye", ts("2024-01-01T00:00:00Z"));
    h.store.seed(&item, ItemStatus::Ok);

    for _ in 0..2 {
        let task = RemoveItemTask::new(h.child_context(), h.root(), "old.txt", false).unwrap();
        Box::new(task).handle().await.unwrap();
    }

    assert_eq!(
        h.drive.calls(),
        vec![
            DriveCall::Delete(format!("{ROOT}/old.txt")),
            DriveCall::Delete(format!("{ROOT}/old.txt")),
        ]
    );
    assert_eq!(h.store.ops().len(), 2);
}

#[tokio::test]
async fn removing_folder_drops_records_below_it() {
    let h = Harness::new();
    let folder = h.drive.add_folder("Photos");
    let photo = h
        .drive
        .add_file("Photos/cat.jpg", b"meow", ts("2024-01-01T00:00:00Z"));
    h.store.seed(&folder, ItemStatus::Ok);
    h.store.seed(&photo, ItemStatus::Downloaded);

    let task = RemoveItemTask::new(h.child_context(), h.root(), "Photos", true).unwrap();
    Box::new(task).handle().await.unwrap();

    assert!(h.drive.get("Photos/cat.jpg").is_none());
    assert!(h.store.get("Photos").is_none());
    assert!(h.store.get("Photos/cat.jpg").is_none());
}

#[tokio::test]
async fn other_remote_failures_keep_the_record() {
    let h = Harness::new();
    let item = h
        .drive
        .add_file("old.txt", b"bye", ts("2024-01-01T00:00:00Z"));
    h.store.seed(&item, ItemStatus::Ok);
    h.drive.fail("delete_item", 401);

    let task = RemoveItemTask::new(h.child_context(), h.root(), "old.txt", false).unwrap();
    let err = Box::new(task).handle().await.unwrap_err();

    assert!(err.is_remote());
    assert!(h.store.get("old.txt").is_some());
    assert!(h.store.ops().is_empty());
}
