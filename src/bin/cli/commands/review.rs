use anyhow::Result;

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &mut App, all: bool, format: &OutputFormat, use_color: bool) -> Result<()> {
    if all {
        app.session.toggle_mode();
    } else {
        app.session.review_random();
    }
    terminal::print_notifications(&app.session.take_notifications(), use_color);

    let words = app.session.review_words();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(words)?);
        }
        OutputFormat::Plain => {
            for (i, word) in words.iter().enumerate() {
                println!("{}", terminal::render_saved(i, word, use_color));
                println!();
            }
        }
    }
    Ok(())
}
