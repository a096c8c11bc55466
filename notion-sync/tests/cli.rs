use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::NamedTempFile;

/// Creates a settings file pointing at a database id but carrying no token.
fn create_minimal_config() -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        config.path(),
        b"default_database_id: db-default\ninclude_tags: false\nupdate_strategy: replace\n",
    )
    .expect("Writing temp config failed");
    config
}

#[test]
fn help_lists_sync_subcommand() {
    let mut cmd = Command::cargo_bin("notion-sync").expect("Binary exists");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"));
}

#[test]
fn sync_fails_when_config_file_is_missing() {
    let note = NamedTempFile::new().expect("temp note");
    let mut cmd = Command::cargo_bin("notion-sync").expect("Binary exists");
    cmd.arg("sync")
        .arg("--file")
        .arg(note.path())
        .arg("--config")
        .arg("/definitely/not/here/settings.yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn sync_fails_without_api_token() {
    let config = create_minimal_config();
    let note = NamedTempFile::new().expect("temp note");
    write(note.path(), "---\ntitle: hello\n---\nbody\n").expect("write note");

    let mut cmd = Command::cargo_bin("notion-sync").expect("Binary exists");
    cmd.arg("sync")
        .arg("--file")
        .arg(note.path())
        .arg("--config")
        .arg(config.path())
        .arg("--no-clipboard")
        .env_remove("NOTION_API_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API token"));

    // Nothing was written back.
    let text = std::fs::read_to_string(note.path()).expect("read note");
    assert_eq!(text, "---\ntitle: hello\n---\nbody\n");
}

#[test]
fn sync_requires_file_argument() {
    let config = create_minimal_config();
    let mut cmd = Command::cargo_bin("notion-sync").expect("Binary exists");
    cmd.arg("sync")
        .arg("--config")
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--file"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let msg = format!("{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use notion_sync::cli::{run, Cli, Commands};

    // A missing settings file makes the run fail after the first event.
    let cli = Cli {
        command: Commands::Sync {
            file: std::path::PathBuf::from("note.md"),
            config: std::path::PathBuf::from("dummy.yaml"),
            no_clipboard: true,
        },
    };

    let result = run(cli).await;
    assert!(result.is_err());

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
