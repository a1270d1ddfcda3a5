use onesync_core::domain::ItemStatus;
use onesync_tasks::tasks::{MoveItemTask, SynchronizeDirTask};

use crate::common::{ts, DriveCall, Harness};

fn queue_root_sync(h: &Harness) {
    let task = SynchronizeDirTask::new(h.child_context(), h.root()).unwrap();
    h.context.task_pool().add_task(Box::new(task)).unwrap();
}

fn seed_tree(h: &Harness) {
    h.drive.add_folder("Docs");
    h.drive.add_folder("Docs/Deep");
    h.drive
        .add_file("top.txt", b"top", ts("2020-01-01T00:00:00Z"));
    h.drive
        .add_file("Docs/a.txt", b"alpha", ts("2021-02-03T04:05:06Z"));
    h.drive
        .add_file("Docs/Deep/b.txt", b"beta", ts("2022-03-04T05:06:07Z"));
}

#[tokio::test]
async fn full_tree_sync_into_empty_root() {
    let mut h = Harness::new();
    seed_tree(&h);

    queue_root_sync(&h);
    let summary = h.runner.run_until_idle(4).await;

    // 3 directory syncs + 3 downloads
    assert_eq!(summary.succeeded, 6);
    assert_eq!(summary.failed, 0);

    assert_eq!(std::fs::read(h.local("top.txt")).unwrap(), b"top");
    assert_eq!(std::fs::read(h.local("Docs/a.txt")).unwrap(), b"alpha");
    assert_eq!(std::fs::read(h.local("Docs/Deep/b.txt")).unwrap(), b"beta");
    assert_eq!(h.local_mtime("Docs/Deep/b.txt"), ts("2022-03-04T05:06:07Z"));

    assert_eq!(h.store.get("Docs").unwrap().status, ItemStatus::Ok);
    assert_eq!(h.store.get("Docs/Deep").unwrap().status, ItemStatus::Ok);
    assert_eq!(
        h.store.get("Docs/a.txt").unwrap().status,
        ItemStatus::Downloaded
    );
    assert!(h.drive.calls().iter().all(|call| !call.is_mutation()));
}

#[tokio::test]
async fn second_pass_is_quiet() {
    let mut h = Harness::new();
    seed_tree(&h);
    h.write_local("mine/notes.txt", b"local notes", ts("2023-05-06T07:08:09Z"))
        .await;

    queue_root_sync(&h);
    let first = h.runner.run_until_idle(2).await;
    assert_eq!(first.failed, 0);
    assert_eq!(h.drive.content("mine/notes.txt").unwrap(), b"local notes");

    h.drive.clear_calls();
    h.store.clear_ops();

    queue_root_sync(&h);
    let second = h.runner.run_until_idle(2).await;

    assert_eq!(second.failed, 0);
    assert!(h.drive.calls().iter().all(|call| matches!(call, DriveCall::ListChildren(_))));
    assert!(h.store.ops().is_empty());
}

#[tokio::test]
async fn unsupported_tasks_are_counted_separately() {
    let mut h = Harness::new();
    let task = MoveItemTask::new(h.child_context(), h.sync_path("a"), h.sync_path("b"));
    h.context.task_pool().add_task(Box::new(task)).unwrap();

    let summary = h.runner.run_until_idle(1).await;

    assert_eq!(summary.unsupported, 1);
    assert_eq!(summary.succeeded, 0);
    assert!(h.drive.calls().is_empty());
}
