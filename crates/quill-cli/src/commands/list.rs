use crate::commands::common::{print_notes, AppContext};
use crate::error::CliError;

pub async fn run_list(
    page: usize,
    page_size: usize,
    as_json: bool,
    profile: Option<&str>,
) -> Result<(), CliError> {
    let mut app = AppContext::bootstrap(profile).await?;

    let result = app.controller.load_page(page, page_size).await;
    if result.is_ok() {
        print_notes(app.controller.notes(), as_json)?;
    }
    app.finish(result)
}
