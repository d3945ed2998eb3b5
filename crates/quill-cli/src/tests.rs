use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;

use quill_core::notify::{Toast, ToastKind};
use quill_core::speech::{SpeechError, SpeechInput, SpeechUnavailable};
use quill_core::Note;

use crate::cli::CompletionShell;
use crate::commands::common::{
    capture_speech, default_editor, format_note_lines, format_relative_time, normalize_content,
    note_preview, note_to_list_item, parse_note_id, toast_line,
};
use crate::commands::run_completions;
use crate::error::CliError;

fn timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap()
}

fn note(title: &str, content: &str, tags: &[&str]) -> Note {
    Note {
        id: "2d9f8f7a-4a5e-4f3c-9b1d-8a2c6e5d4b3a".parse().unwrap(),
        title: title.to_string(),
        content: content.to_string(),
        tags: tags.iter().map(ToString::to_string).collect(),
        created_at: timestamp("2024-05-01T10:00:00Z"),
        updated_at: timestamp("2024-05-02T09:30:00Z"),
    }
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn normalize_content_keeps_multiline_text() {
    assert_eq!(
        normalize_content("line 1\nline 2\n"),
        Some("line 1\nline 2".to_string())
    );
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn note_preview_prefers_title_and_truncates() {
    let long = note("", "This is a very long sentence that should be shortened", &[]);
    assert_eq!(note_preview(&long, 20), "This is a very lo...");

    let titled = note("Short title", "Completely different body", &[]);
    assert_eq!(note_preview(&titled, 40), "Short title");
}

#[test]
fn format_note_lines_includes_tags_when_present() {
    let tagged = note("Groceries", "Milk and eggs", &["shopping", "food"]);
    let lines = format_note_lines(std::slice::from_ref(&tagged));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("2d9f8f7a"));
    assert!(lines[0].contains("Groceries"));
    assert!(lines[0].contains("#shopping #food"));

    let untagged = note("Groceries", "Milk and eggs", &[]);
    let lines = format_note_lines(std::slice::from_ref(&untagged));
    assert!(!lines[0].contains('#'));
}

#[test]
fn note_to_list_item_keeps_tag_order() {
    let item = note_to_list_item(&note("T", "body", &["zeta", "alpha", "zeta"]));
    assert_eq!(item.tags, vec!["zeta", "alpha", "zeta"]);
    assert!(item.created_at.starts_with("2024-05-01T10:00:00"));
    assert!(item.relative_time.ends_with("ago"));
}

#[test]
fn parse_note_id_validates_input() {
    assert!(matches!(parse_note_id("  "), Err(CliError::EmptyNoteId)));
    assert!(matches!(
        parse_note_id("not-a-uuid"),
        Err(CliError::InvalidNoteId(_))
    ));

    let id = parse_note_id(" 2d9f8f7a-4a5e-4f3c-9b1d-8a2c6e5d4b3a ").unwrap();
    assert_eq!(id.as_str(), "2d9f8f7a-4a5e-4f3c-9b1d-8a2c6e5d4b3a");
}

#[test]
fn toast_line_leads_with_the_kind_glyph() {
    let toast = Toast {
        id: 0,
        message: "Note created successfully".to_string(),
        kind: ToastKind::Success,
    };
    assert_eq!(toast_line(&toast), "✓ Note created successfully");
}

#[test]
fn capture_speech_returns_none_when_unavailable() {
    let mut speech = SpeechUnavailable;
    assert_eq!(capture_speech(&mut speech).unwrap(), None);
}

#[test]
fn capture_speech_returns_normalized_transcript() {
    struct CannedSpeech;

    impl SpeechInput for CannedSpeech {
        fn is_available(&self) -> bool {
            true
        }

        fn start(
            &mut self,
            on_result: Box<dyn FnOnce(String) + Send>,
        ) -> Result<(), SpeechError> {
            on_result("  dictated note  ".to_string());
            Ok(())
        }

        fn stop(&mut self) {}
    }

    let mut speech = CannedSpeech;
    assert_eq!(
        capture_speech(&mut speech).unwrap(),
        Some("dictated note".to_string())
    );
}

#[test]
fn run_completions_writes_bash_script_file() {
    let output_path = std::env::temp_dir().join(format!(
        "quill-completions-test-{}.bash",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos())
    ));

    run_completions(CompletionShell::Bash, Some(&output_path)).unwrap();

    let script = std::fs::read_to_string(&output_path).unwrap();
    assert!(script.contains("_quill()"));
    assert!(script.contains("complete -F _quill"));

    let _ = std::fs::remove_file(output_path);
}
