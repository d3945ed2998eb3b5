use quill_core::NoteDraft;

use crate::commands::common::{capture_editor_input_with_initial, parse_note_id, AppContext};
use crate::error::CliError;

pub async fn run_edit(id: &str, tags: Vec<String>, profile: Option<&str>) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let mut app = AppContext::bootstrap(profile).await?;

    let note = match app.controller.fetch(&note_id).await {
        Ok(note) => note,
        Err(error) => return app.finish(Err(error)),
    };

    let Some(edited_content) = capture_editor_input_with_initial(&note.content)? else {
        return Err(CliError::EmptyEditedContent);
    };

    let new_tags = if tags.is_empty() { note.tags.clone() } else { tags };
    if edited_content == note.content && new_tags == note.tags {
        println!("{}", note.id);
        return Ok(());
    }

    match app
        .controller
        .update(&note_id, NoteDraft::new(edited_content, new_tags))
        .await
    {
        Ok(updated) => {
            println!("{}", updated.id);
            app.finish(Ok(()))
        }
        Err(error) => app.finish(Err(error)),
    }
}
