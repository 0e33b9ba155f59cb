use anyhow::Result;
use skillcert_core::flow::{NextAction, ResultView, Route};
use uuid::Uuid;

use crate::cli::app::App;

pub async fn show(app: &mut App, token: Uuid) -> Result<Option<Route>> {
    let view = match app.results.resolve(token) {
        Ok(view) => view,
        Err(redirect) => return Ok(Some(redirect)),
    };
    print_view(app, &view);

    let actions = view.next_actions();
    if let [only] = actions.as_slice() {
        return Ok(Some(only.route()));
    }

    for (n, action) in actions.iter().enumerate() {
        println!("  {}) {}", n + 1, action.label());
    }
    loop {
        let label = format!("Choose 1-{}: ", actions.len());
        let Some(line) = app.prompt.ask(&label).await? else {
            return Ok(None);
        };
        let picked = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| actions.get(i));
        match picked {
            Some(action) => return Ok(Some(action.route())),
            None => app.ui.error(format!("Enter a number from 1 to {}.", actions.len())),
        }
    }
}

fn print_view(app: &App, view: &ResultView) {
    let ui = &app.ui;
    let result = &view.result;

    ui.heading(view.headline());
    ui.field(
        "Score",
        format!("{}/{} ({}%)", result.score, result.total, view.percentage()),
    );
    ui.field("Attempt", result.attempt_number);
    if !result.message.is_empty() {
        ui.muted(&result.message);
    }
    if result.passed {
        ui.success("Your certificate is ready.");
    } else if view.next_actions().contains(&NextAction::Retry) {
        ui.muted("You can try again.");
    }
}
