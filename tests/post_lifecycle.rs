use postbook::config::PostbookConfig;
use postbook::controller::{Screen, ViewController};
use postbook::error::PostError;
use postbook::model::{make_excerpt, Draft, DraftFields};
use postbook::render::{sanitize, MarkupRenderer};
use postbook::repository::PostRepository;
use postbook::store::fs::FileStore;
use postbook::store::memory::InMemoryStore;
use postbook::store::PersistentStore;
use serde_json::json;

fn open_fs(dir: &std::path::Path) -> PostRepository<FileStore> {
    let opened = PostRepository::open(FileStore::new(dir), &PostbookConfig::default());
    assert!(opened.is_persisted());
    opened.value
}

#[test]
fn posts_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let mut repo = open_fs(dir.path());
        let saved = repo
            .save(Draft::new("Hello", "# Hi\nBody text.").with_tags(["go", "web"]))
            .unwrap();
        assert!(saved.is_persisted());
        saved.value.id
    };

    let repo = open_fs(dir.path());
    let post = repo.find(&id).unwrap();
    assert_eq!(post.title, "Hello");
    assert_eq!(post.excerpt, make_excerpt("# Hi\nBody text.", 150));
    assert_eq!(post.tags, vec!["go", "web"]);
}

#[test]
fn resave_keeps_created_at_and_position() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = open_fs(dir.path());
    let first = repo.save(Draft::new("One", "1")).unwrap().value;
    repo.save(Draft::new("Two", "2")).unwrap();

    let updated = repo
        .save(Draft::new("One!", "1 again").with_id(first.id.clone()))
        .unwrap()
        .value;

    assert_eq!(updated.created_at, first.created_at);
    assert!(updated.updated_at > first.updated_at);
    assert_eq!(repo.position(&first.id), Some(1));

    let reopened = open_fs(dir.path());
    assert_eq!(reopened.list()[1].title, "One!");
}

#[test]
fn delete_shrinks_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = open_fs(dir.path());
    let a = repo.save(Draft::new("A", "a")).unwrap().value;
    repo.save(Draft::new("B", "b")).unwrap();

    repo.delete(&a.id).unwrap();
    assert_eq!(repo.len(), 1);
    assert!(repo.find(&a.id).is_none());
    assert!(matches!(repo.delete(&a.id), Err(PostError::NotFound(_))));

    assert_eq!(open_fs(dir.path()).len(), 1);
}

#[test]
fn legacy_snapshot_loads_and_skips_bad_records() {
    let store = InMemoryStore::new().with_value(
        "posts",
        json!([
            {
                "id": "1700000000000",
                "title": "Legacy",
                "content": "Old body",
                "excerpt": "Old body",
                "tags": ["old"],
                "createdAt": "2023-11-14T22:13:20.000Z",
                "updatedAt": "2023-11-14T22:13:20.000Z"
            },
            { "id": 42, "title": "broken" }
        ]),
    );

    let opened = PostRepository::open(&store, &PostbookConfig::default());
    assert!(opened.is_persisted());
    let repo = opened.value;
    assert_eq!(repo.len(), 1);
    assert_eq!(repo.list()[0].id.as_str(), "1700000000000");
}

#[test]
fn failed_write_keeps_change_and_retries() {
    let store = InMemoryStore::new();
    let mut repo = PostRepository::open(&store, &PostbookConfig::default()).value;

    store.set_simulate_write_error(true);
    let saved = repo.save(Draft::new("Kept", "in memory")).unwrap();
    assert!(!saved.is_persisted());
    assert!(repo.is_dirty());
    assert_eq!(repo.len(), 1);
    assert!(store.read("posts").unwrap().is_none());

    store.set_simulate_write_error(false);
    repo.save(Draft::new("Next", "write")).unwrap();
    assert!(!repo.is_dirty());
    let snapshot = store.read("posts").unwrap().unwrap();
    assert_eq!(snapshot.as_array().unwrap().len(), 2);
}

#[test]
fn rendered_output_is_already_sanitized() {
    let renderer = MarkupRenderer::new();
    for input in [
        "# Title\n\nSome *text* with `code`.",
        "<script>alert(1)</script>",
        "[x](javascript:alert(1)) <a href=\"https://ok.test\" onclick=\"x()\">ok</a>",
        "<select><option>a<table>",
    ] {
        let html = renderer.render(input);
        assert_eq!(sanitize(html.as_str()), html);
        assert!(!html.as_str().contains("<script"));
    }
}

#[test]
fn controller_round_trip_over_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctl = ViewController::new(open_fs(dir.path()));

    ctl.new_post().unwrap();
    ctl.save_post(DraftFields::new("Hello", "# Hi\nBody text.", "go, go ,  , web "))
        .unwrap();
    let id = ctl.repository().list()[0].id.clone();
    assert_eq!(ctl.find(&id).unwrap().tags, vec!["go", "web"]);

    ctl.open_post(&id).unwrap();
    let html = ctl.render_current().unwrap();
    assert!(html.as_str().contains("<h1>Hi</h1>"));

    ctl.edit_current().unwrap();
    ctl.cancel_edit().unwrap();
    assert_eq!(ctl.screen(), Screen::List);
    assert_eq!(ctl.find(&id).unwrap().title, "Hello");

    let reopened = ViewController::new(open_fs(dir.path()));
    assert_eq!(reopened.repository().len(), 1);
}
