//! Integration tests for onesync-tasks
//!
//! Runs the real tasks and `TaskQueue` against an in-memory drive and a
//! recording item store, with a temp directory as the local root.


mod test_remove_item;
mod test_synchronize_dir;
mod test_task_queue;
