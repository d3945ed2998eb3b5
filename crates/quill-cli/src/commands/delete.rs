use crate::commands::common::{parse_note_id, AppContext};
use crate::error::CliError;

pub async fn run_delete(id: &str, profile: Option<&str>) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let mut app = AppContext::bootstrap(profile).await?;

    let result = app.controller.delete(&note_id).await;
    if result.is_ok() {
        println!("{note_id}");
    }
    app.finish(result)
}
