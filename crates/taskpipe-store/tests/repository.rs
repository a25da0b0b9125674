//! Repository contract tests against real SQLite, including the
//! concurrent-writer property: same-task conflicts serialize at the
//! storage layer, never interleave.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use proptest::prelude::*;
use taskpipe_core::error::Error;
use taskpipe_core::model::{TaskDraft, TaskFilter, TaskPatch, UserId};
use taskpipe_core::ports::TaskRepository;
use taskpipe_store::SqliteRepository;

fn file_backed_repo(dir: &tempfile::TempDir) -> SqliteRepository {
    SqliteRepository::open(&dir.path().join("todos.sqlite3"), Duration::from_secs(5))
        .expect("open repo")
}

#[test]
fn persists_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let owner = UserId::generate();

    let task = {
        let repo = file_backed_repo(&dir);
        repo.add(owner, &TaskDraft::new("durable", None)).expect("add")
    };

    let repo = file_backed_repo(&dir);
    let fetched = repo.get(owner, task.id).expect("get after reopen");
    assert_eq!(fetched, task);
}

#[test]
fn filters_partition_the_owner_tasks() {
    let repo = SqliteRepository::in_memory().expect("open repo");
    let owner = UserId::generate();

    let open_task = repo.add(owner, &TaskDraft::new("open", None)).expect("add");
    let done_task = repo.add(owner, &TaskDraft::new("done", None)).expect("add");
    repo.set_completed(owner, done_task.id, true).expect("complete");

    let completed = repo.list(owner, TaskFilter::Completed).expect("list");
    let pending = repo.list(owner, TaskFilter::Pending).expect("list");
    let all = repo.list(owner, TaskFilter::All).expect("list");

    assert_eq!(completed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![done_task.id]);
    assert_eq!(pending.iter().map(|t| t.id).collect::<Vec<_>>(), vec![open_task.id]);
    assert_eq!(all.len(), 2);
}

#[test]
fn cross_owner_mutations_do_not_leak_existence() {
    let repo = SqliteRepository::in_memory().expect("open repo");
    let owner = UserId::generate();
    let other = UserId::generate();
    let task = repo.add(owner, &TaskDraft::new("secret", None)).expect("add");

    // Every cross-owner operation reports the same NotFound as a missing id.
    assert!(matches!(repo.get(other, task.id), Err(Error::NotFound)));
    assert!(matches!(
        repo.update(other, task.id, &TaskPatch::default()),
        Err(Error::NotFound)
    ));
    assert!(matches!(repo.set_completed(other, task.id, true), Err(Error::NotFound)));
    assert!(matches!(repo.delete(other, task.id), Err(Error::NotFound)));

    // And none of them touched the record.
    let untouched = repo.get(owner, task.id).expect("get");
    assert_eq!(untouched, task);
}

#[test]
fn concurrent_updates_one_title_wins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = Arc::new(file_backed_repo(&dir));
    let owner = UserId::generate();
    let task = repo.add(owner, &TaskDraft::new("contested", None)).expect("add");

    let titles = ["writer a wins", "writer b wins"];
    let handles: Vec<_> = titles
        .iter()
        .map(|title| {
            let repo = Arc::clone(&repo);
            let patch = TaskPatch {
                title: Some((*title).to_string()),
                description: None,
            };
            thread::spawn(move || repo.update(owner, task.id, &patch))
        })
        .collect();

    for handle in handles {
        handle.join().expect("join").expect("update");
    }

    let final_task = repo.get(owner, task.id).expect("get");
    assert!(
        titles.contains(&final_task.title.as_str()),
        "title must be one submitted value, got '{}'",
        final_task.title
    );
}

#[test]
fn concurrent_toggles_serialize() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = Arc::new(file_backed_repo(&dir));
    let owner = UserId::generate();
    let task = repo.add(owner, &TaskDraft::new("flappy", None)).expect("add");

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || repo.set_completed(owner, task.id, i % 2 == 0))
        })
        .collect();

    for handle in handles {
        let change = handle.join().expect("join").expect("set_completed");
        // Each writer saw a consistent snapshot pair.
        assert_eq!(change.before.id, change.after.id);
    }

    // Whatever the final flag, the row is intact and readable.
    let final_task = repo.get(owner, task.id).expect("get");
    assert_eq!(final_task.title, "flappy");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn add_then_get_is_field_faithful(
        title in "[a-zA-Z0-9][a-zA-Z0-9 ]{0,79}",
        description in proptest::option::of("[a-z ]{0,200}"),
    ) {
        let repo = SqliteRepository::in_memory().expect("open repo");
        let owner = UserId::generate();

        let draft = TaskDraft::new(title.clone(), description.clone());
        let task = repo.add(owner, &draft).expect("add");
        let fetched = repo.get(owner, task.id).expect("get");

        prop_assert_eq!(&fetched.title, &title);
        prop_assert_eq!(&fetched.description, &description);
        prop_assert!(!fetched.completed);
        prop_assert_eq!(fetched.created_at, fetched.updated_at);
    }
}
