use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use serde::Serialize;

use quill_core::api::{HttpNoteStore, TokenCell};
use quill_core::config::AppConfig;
use quill_core::controller::NoteController;
use quill_core::executor::ActionExecutor;
use quill_core::notify::{Notifier, Toast, ToastKind};
use quill_core::session::SessionGate;
use quill_core::speech::SpeechInput;
use quill_core::util::normalize_text_option;
use quill_core::{Note, NoteId};

use crate::auth::{auth_client_for_profile, CliAuthClient};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// Everything a note command needs: the authenticated controller plus the
/// notification channel it reports through.
pub struct AppContext {
    pub notifier: Notifier,
    pub controller: NoteController<HttpNoteStore>,
}

/// Resolve runtime configuration: environment overrides beat the profile.
pub fn resolve_app_config(profile_override: Option<&str>) -> Result<(String, AppConfig), CliError> {
    let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = profiles.resolve_profile_name(profile_override);
    let profile = profiles.profile(&profile_name).cloned().unwrap_or_default();

    let api_base_url = normalize_text_option(env::var("QUILL_API_BASE_URL").ok())
        .or_else(|| profile.api_base_url())
        .unwrap_or_else(|| quill_core::config::DEFAULT_API_BASE_URL.to_string());
    let auth_url =
        normalize_text_option(env::var("QUILL_AUTH_URL").ok()).or_else(|| profile.auth_url());
    let auth_api_key = normalize_text_option(env::var("QUILL_AUTH_API_KEY").ok())
        .or_else(|| profile.auth_api_key());

    let mut config =
        AppConfig::new(api_base_url, auth_url, auth_api_key).map_err(CliError::Config)?;
    if let Some(name) = normalize_text_option(env::var("QUILL_APP_NAME").ok()) {
        config = config.with_app_name(name);
    }

    tracing::debug!(
        "Resolved profile '{}' with API base {}",
        profile_name,
        config.api_base_url
    );
    Ok((profile_name, config))
}

/// Build the session gate for a profile. Fails when the profile has no
/// provider configuration.
pub fn build_gate(
    profile_override: Option<&str>,
) -> Result<(String, AppConfig, SessionGate<CliAuthClient>, Notifier), CliError> {
    let (profile_name, config) = resolve_app_config(profile_override)?;
    let client = auth_client_for_profile(&profile_name, &config)
        .map_err(|error| CliError::Auth(error.to_string()))?
        .ok_or_else(|| {
            CliError::Config(format!(
                "Profile '{profile_name}' is missing auth configuration. Run `quill config init --auth-url <URL> --auth-api-key <KEY>` first."
            ))
        })?;

    let notifier = Notifier::new();
    let gate = SessionGate::new(client, notifier.clone(), TokenCell::new());
    Ok((profile_name, config, gate, notifier))
}

impl AppContext {
    /// Restore the session and gate note access on authentication.
    pub async fn bootstrap(profile_override: Option<&str>) -> Result<Self, CliError> {
        let (_profile_name, config, mut gate, notifier) = build_gate(profile_override)?;

        gate.restore().await;
        if gate.require_authenticated().is_err() {
            return Err(CliError::NotSignedIn);
        }

        let store = HttpNoteStore::new(config.api_base_url, gate.token())
            .map_err(|error| CliError::Config(error.to_string()))?;
        let executor = ActionExecutor::new(notifier.clone());

        Ok(Self {
            notifier,
            controller: NoteController::new(store, executor),
        })
    }

    /// Render queued toasts, then settle the command's exit. A failure that
    /// already produced an error toast exits quietly; one that bypassed the
    /// notifier (a validation short-circuit) propagates so main prints it.
    pub fn finish(&self, result: Result<(), quill_core::Error>) -> Result<(), CliError> {
        let toasts = self.notifier.drain();
        let reported = toasts.iter().any(|toast| toast.kind == ToastKind::Error);
        render_toast_list(&toasts);

        match result {
            Ok(()) => Ok(()),
            Err(_) if reported => Err(CliError::Reported),
            Err(error) => Err(CliError::Core(error)),
        }
    }
}

/// Print queued toasts: errors and warnings to stderr, the rest to stdout.
pub fn render_toasts(notifier: &Notifier) {
    render_toast_list(&notifier.drain());
}

fn render_toast_list(toasts: &[Toast]) {
    for toast in toasts {
        match toast.kind {
            ToastKind::Error | ToastKind::Warning => eprintln!("{}", toast_line(toast)),
            ToastKind::Success | ToastKind::Info => println!("{}", toast_line(toast)),
        }
    }
}

pub fn toast_line(toast: &Toast) -> String {
    format!("{} {}", toast.kind.glyph(), toast.message)
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub relative_time: String,
}

pub fn print_notes(notes: &[Note], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let items = notes.iter().map(note_to_list_item).collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_note_lines(notes) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| {
            let id = note.id.to_string();
            let short_id = id.chars().take(8).collect::<String>();
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.updated_at.timestamp_millis(), now_ms);
            let tags = render_tags(note);

            if tags.is_empty() {
                format!("{short_id:<8}  {preview:<40}  {relative_time}")
            } else {
                format!("{short_id:<8}  {preview:<40}  {relative_time:<10}  {tags}")
            }
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();

    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        preview: note_preview(note, 80),
        content: note.content.clone(),
        tags: note.tags.clone(),
        created_at: note.created_at.to_rfc3339(),
        updated_at: note.updated_at.to_rfc3339(),
        relative_time: format_relative_time(note.updated_at.timestamp_millis(), now_ms),
    }
}

/// First line of the title (falling back to content), collapsed and capped.
pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let source = if note.title.trim().is_empty() {
        &note.content
    } else {
        &note.title
    };
    let first_line = source.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn render_tags(note: &Note) -> String {
    note.tags
        .iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Resolve note content from args, then piped stdin, then the editor.
pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if let Some(content) = capture_editor_input()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

/// Capture one dictated transcript, or `None` when no engine is available.
pub fn capture_speech(speech: &mut dyn SpeechInput) -> Result<Option<String>, CliError> {
    if !speech.is_available() {
        return Ok(None);
    }

    let (sender, receiver) = mpsc::channel();
    speech
        .start(Box::new(move |transcript| {
            let _ = sender.send(transcript);
        }))
        .map_err(|error| CliError::Config(error.to_string()))?;

    Ok(receiver.recv().ok().and_then(|raw| normalize_content(&raw)))
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn parse_note_id(id: &str) -> Result<NoteId, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyNoteId);
    }
    trimmed
        .parse::<NoteId>()
        .map_err(|_| CliError::InvalidNoteId(trimmed.to_string()))
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input() -> Result<Option<String>, CliError> {
    capture_editor_input_with_initial("")
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // Fallback for editor commands with args, e.g. "code --wait"
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("quill-note-{}-{now}.md", std::process::id()))
}
