use anyhow::Result;

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub fn show(app: &App, format: &OutputFormat) -> Result<()> {
    let history = app.session.history();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "generationCount": history.generation_count(),
                "words": history.exclusions(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "{} words excluded after {} generation(s) since the last rollover",
                history.len(),
                history.generation_count()
            );
            for word in history.exclusions() {
                println!("  {}", word);
            }
        }
    }
    Ok(())
}

pub fn reset(app: &mut App, format: &OutputFormat, use_color: bool) -> Result<()> {
    app.session.reset_history();
    terminal::print_notifications(&app.session.take_notifications(), use_color);

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "reset": true })),
        OutputFormat::Plain => println!("Word history cleared"),
    }
    Ok(())
}
