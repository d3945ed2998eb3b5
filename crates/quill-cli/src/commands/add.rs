use quill_core::notify::ToastKind;
use quill_core::speech::SpeechUnavailable;
use quill_core::NoteDraft;

use crate::commands::common::{capture_speech, resolve_note_content, AppContext};
use crate::error::CliError;

pub async fn run_add(
    content_parts: &[String],
    tags: Vec<String>,
    dictate: bool,
    profile: Option<&str>,
) -> Result<(), CliError> {
    let mut app = AppContext::bootstrap(profile).await?;

    let content = if dictate {
        // No speech engine ships with the CLI today; the flag degrades to
        // the usual content sources when capture is unavailable.
        let mut speech = SpeechUnavailable;
        match capture_speech(&mut speech)? {
            Some(transcript) => transcript,
            None => {
                app.notifier.push(
                    "Speech input is not available on this platform",
                    ToastKind::Warning,
                );
                resolve_note_content(content_parts)?
            }
        }
    } else {
        resolve_note_content(content_parts)?
    };

    match app.controller.create(NoteDraft::new(content, tags)).await {
        Ok(note) => {
            println!("{}", note.id);
            app.finish(Ok(()))
        }
        Err(error) => app.finish(Err(error)),
    }
}
