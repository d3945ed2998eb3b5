use crate::commands::common::{print_notes, AppContext};
use crate::error::CliError;

pub async fn run_search(query: &str, as_json: bool, profile: Option<&str>) -> Result<(), CliError> {
    let mut app = AppContext::bootstrap(profile).await?;

    // A blank query falls back to the full list, like clearing the search
    // box in a UI.
    let result = app.controller.search(query).await;
    if result.is_ok() {
        print_notes(app.controller.notes(), as_json)?;
    }
    app.finish(result)
}
