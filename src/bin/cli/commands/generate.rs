use anyhow::{bail, Result};

use vocabmaster_lib::client::NotificationKind;

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub async fn run(app: &mut App, format: &OutputFormat, use_color: bool) -> Result<()> {
    terminal::print_notifications(&app.session.take_notifications(), use_color);

    app.session.generate().await;
    let notifications = app.session.take_notifications();
    terminal::print_notifications(&notifications, use_color);

    // A failed generation leaves the previous batch in place
    if notifications.iter().any(|n| n.kind == NotificationKind::Error) {
        bail!("Generation failed");
    }

    show(app, format, use_color)
}

/// Print the current batch
pub fn show(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let words = app.session.generated_words();

    match format {
        OutputFormat::Json => {
            let output: Vec<_> = words
                .iter()
                .map(|w| {
                    serde_json::json!({
                        "id": w.id,
                        "word": w.word,
                        "pronunciation": w.pronunciation,
                        "definition": w.definition,
                        "sentence": w.sentence,
                        "level": w.level,
                        "saved": app.session.is_word_saved(&w.word),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if words.is_empty() {
                println!("No words yet. Run `vocabmaster-cli generate`.");
                return Ok(());
            }
            for (i, word) in words.iter().enumerate() {
                let saved = app.session.is_word_saved(&word.word);
                println!("{}", terminal::render_generated(i, word, saved, use_color));
                println!();
            }
        }
    }

    Ok(())
}
