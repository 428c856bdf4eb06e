use vocabmaster_lib::client::{Notification, NotificationKind, SavedWord};
use vocabmaster_lib::vocabulary::StoredVocabularyWord;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const ITALIC: &str = "\x1b[3m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

fn paint(text: &str, code: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", code, text, Color::RESET)
    } else {
        text.to_string()
    }
}

fn render_card(
    index: usize,
    word: &str,
    pronunciation: &str,
    definition: &str,
    sentence: &str,
    marker: &str,
    use_color: bool,
) -> String {
    let mut lines = Vec::new();
    let heading = format!("{:>2}. {}", index + 1, paint(word, Color::BOLD, use_color));
    let pronunciation = if pronunciation.is_empty() || pronunciation == "N/A" {
        String::new()
    } else {
        format!(" {}", paint(pronunciation, Color::GRAY, use_color))
    };
    lines.push(format!("{}{}{}", heading, pronunciation, marker));
    lines.push(format!("    {}", definition));
    lines.push(format!("    {}", paint(sentence, Color::ITALIC, use_color)));
    lines.join("\n")
}

/// Render a generated word, marking it when saved
pub fn render_generated(
    index: usize,
    word: &StoredVocabularyWord,
    saved: bool,
    use_color: bool,
) -> String {
    let marker = if saved {
        format!(" {}", paint("[saved]", Color::GREEN, use_color))
    } else {
        String::new()
    };
    render_card(
        index,
        &word.word,
        &word.pronunciation,
        &word.definition,
        &word.sentence,
        &marker,
        use_color,
    )
}

/// Render a saved word with the date it was saved
pub fn render_saved(index: usize, word: &SavedWord, use_color: bool) -> String {
    let mut marker = format!(
        " {}",
        paint(&word.saved_at.format("%Y-%m-%d").to_string(), Color::DIM, use_color)
    );
    if word.remote_id.is_none() {
        marker.push_str(&format!(" {}", paint("(local)", Color::YELLOW, use_color)));
    }
    render_card(
        index,
        &word.word,
        &word.pronunciation,
        &word.definition,
        &word.sentence,
        &marker,
        use_color,
    )
}

/// Print notifications to stderr so JSON output on stdout stays clean
pub fn print_notifications(notifications: &[Notification], use_color: bool) {
    for note in notifications {
        let color = match note.kind {
            NotificationKind::Info => Color::CYAN,
            NotificationKind::Success => Color::GREEN,
            NotificationKind::Error => Color::RED,
        };
        eprintln!(
            "{} {}",
            paint(&note.title, color, use_color),
            note.description
        );
    }
}
