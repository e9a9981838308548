use contactnote_core::{
    load_contacts, FetchRequest, MemoryStore, NoteRepository, RawContact, StaticContactSource,
    NOTES_STORE_KEY,
};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, Once};

/// Keeps every log line with the name of the thread that emitted it, so
/// tests running in parallel only look at their own lines.
struct CaptureLogger {
    lines: Mutex<Vec<(Option<String>, Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        let thread = std::thread::current().name().map(str::to_string);
        self.lines
            .lock()
            .unwrap()
            .push((thread, record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    lines: Mutex::new(Vec::new()),
};
static INSTALL: Once = Once::new();

fn captured_lines() -> Vec<(Level, String)> {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
    let thread = std::thread::current().name().map(str::to_string);
    LOGGER
        .lines
        .lock()
        .unwrap()
        .iter()
        .filter(|(owner, _, _)| *owner == thread)
        .map(|(_, level, line)| (*level, line.clone()))
        .collect()
}

fn has_line(lines: &[(Level, String)], level: Level, parts: &[&str]) -> bool {
    lines
        .iter()
        .any(|(lvl, line)| *lvl == level && parts.iter().all(|part| line.contains(part)))
}

#[test]
fn malformed_notes_fallback_logs_error_code() {
    captured_lines();
    let repo = NoteRepository::new(MemoryStore::with_value(NOTES_STORE_KEY, "{not json"));
    assert!(repo.load_or_empty().is_empty());

    let lines = captured_lines();
    assert!(has_line(
        &lines,
        Level::Error,
        &[
            "event=notes_load",
            "status=error",
            "error_code=deserialization_failed"
        ],
    ));
    assert!(has_line(
        &lines,
        Level::Warn,
        &["event=notes_load", "status=fallback", "count=0"],
    ));
}

#[test]
fn repeated_note_ids_log_dropped_count() {
    captured_lines();
    let raw = r#"[
        {"id":"a","contact":{"id":"c1","name":"Ana"},"note":"x"},
        {"id":"a","contact":{"id":"c2","name":"Ben"},"note":"y"},
        {"id":"a","contact":{"id":"c3","name":"Cy"},"note":"z"}
    ]"#;
    let repo = NoteRepository::new(MemoryStore::with_value(NOTES_STORE_KEY, raw));
    assert_eq!(repo.load_or_empty().len(), 1);

    let lines = captured_lines();
    assert!(has_line(
        &lines,
        Level::Warn,
        &["event=notes_load", "status=partial", "dropped_duplicates=2"],
    ));
}

#[test]
fn skipped_contact_records_log_their_error_code() {
    captured_lines();
    let source = StaticContactSource::new(vec![
        RawContact::new("1", "Ana"),
        RawContact::new("2", "   "),
        RawContact {
            id: None,
            ..RawContact::new("3", "Ghost")
        },
    ]);
    assert_eq!(load_contacts(&source, &FetchRequest::default()).len(), 1);

    let lines = captured_lines();
    assert!(has_line(
        &lines,
        Level::Debug,
        &["event=contacts_validate", "error_code=missing_name"],
    ));
    assert!(has_line(
        &lines,
        Level::Debug,
        &["event=contacts_validate", "error_code=missing_id"],
    ));
    assert!(has_line(
        &lines,
        Level::Warn,
        &["event=contacts_validate", "status=partial", "skipped=2"],
    ));
}
