use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

fn print_words(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let words = app.session.saved_words();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(words)?);
        }
        OutputFormat::Plain => {
            if words.is_empty() {
                println!("(no saved words)");
            }
            for (i, word) in words.iter().enumerate() {
                println!("{}", terminal::render_saved(i, word, use_color));
                println!();
            }
        }
    }
    Ok(())
}

pub fn list(app: &mut App, format: &OutputFormat, use_color: bool) -> Result<()> {
    terminal::print_notifications(&app.session.take_notifications(), use_color);
    print_words(app, format, use_color)
}

pub async fn save(app: &mut App, word: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let target = app
        .session
        .find_generated(word)
        .cloned()
        .with_context(|| {
            format!(
                "'{}' is not in the last generated batch. Run `vocabmaster-cli words` to see it.",
                word
            )
        })?;

    if app.session.is_word_saved(&target.word) {
        println!("'{}' is already saved", target.word);
    } else {
        app.session
            .toggle_save(&target)
            .await
            .context("Failed to save word")?;
    }

    terminal::print_notifications(&app.session.take_notifications(), use_color);
    if let OutputFormat::Json = format {
        print_words(app, format, use_color)?;
    }
    Ok(())
}

pub async fn remove(app: &mut App, word: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    if !app.session.is_word_saved(word) {
        // Matching is exact; removing something that is not saved does nothing
        println!("'{}' is not saved", word);
    } else {
        app.session
            .remove_from_review(word)
            .await
            .context("Failed to remove word")?;
    }

    terminal::print_notifications(&app.session.take_notifications(), use_color);
    if let OutputFormat::Json = format {
        print_words(app, format, use_color)?;
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    if !crate::stdin_is_tty() {
        return Ok(false);
    }
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub async fn clear(app: &mut App, yes: bool, format: &OutputFormat, use_color: bool) -> Result<()> {
    if !app.session.request_clear() {
        terminal::print_notifications(&app.session.take_notifications(), use_color);
        return Ok(());
    }

    let count = app.session.saved_words().len();
    let confirmed = yes || confirm(&format!("Remove all {} saved words?", count))?;
    if !confirmed {
        app.session.cancel_clear();
        println!("Cancelled");
        return Ok(());
    }

    app.session
        .confirm_clear()
        .await
        .context("Failed to clear saved words")?;
    terminal::print_notifications(&app.session.take_notifications(), use_color);
    if let OutputFormat::Json = format {
        print_words(app, format, use_color)?;
    }
    Ok(())
}

pub async fn sync(app: &mut App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let result = app.session.load().await;
    let pending = app.session.saved_store().pending().len();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "synced": result.is_ok(),
                "saved": app.session.saved_words().len(),
                "pending": pending,
                "error": result.as_ref().err().map(|e| e.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            terminal::print_notifications(&app.session.take_notifications(), use_color);
            println!("Server: {}", app.config.server_url);
            println!(
                "{} saved words, {} change(s) waiting for the server",
                app.session.saved_words().len(),
                pending
            );
        }
    }

    result.context("Could not reach the server")?;
    Ok(())
}
