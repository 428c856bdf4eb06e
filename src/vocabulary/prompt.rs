//! Prompt construction for vocabulary generation

use super::curated::CuratedEntry;

/// How many words of each kind a request for `num_words` should contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelDistribution {
    /// Curated words to seed the prompt with
    pub curated: usize,
    /// Minimum words at B1-B2
    pub b1_b2: usize,
    /// Minimum words at B2 or C1
    pub b2_c1: usize,
}

impl LevelDistribution {
    pub fn for_count(num_words: usize) -> Self {
        let curated = if num_words >= 10 {
            3
        } else if num_words >= 6 {
            2
        } else {
            1
        };
        let b1_b2 = if num_words >= 8 { 2 } else { 1 };
        let b2_c1 = if num_words >= 8 {
            3
        } else if num_words >= 6 {
            2
        } else {
            1
        };

        Self {
            curated,
            b1_b2,
            b2_c1,
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count > 1 {
        "s"
    } else {
        ""
    }
}

fn exclusion_clause(exclude_words: &[String]) -> String {
    if exclude_words.is_empty() {
        String::new()
    } else {
        format!(" Do not include these words: {}.", exclude_words.join(", "))
    }
}

fn curated_block(samples: &[CuratedEntry]) -> String {
    samples
        .iter()
        .map(|e| {
            format!(
                "- word: \"{}\", sentence: \"{}\"",
                e.word,
                e.sentence.replace('"', "\\\"")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the generation prompt
///
/// `samples` are curated entries already drawn for this request; they are
/// listed first and Gemini only fills in pronunciation and definition.
pub fn build_prompt(
    level: &str,
    num_words: usize,
    exclude_words: &[String],
    samples: &[CuratedEntry],
) -> String {
    let dist = LevelDistribution::for_count(num_words);
    let exclusions = exclusion_clause(exclude_words);
    let additional = num_words.saturating_sub(samples.len());

    if !samples.is_empty() && additional > 0 {
        format!(
            "You must output exactly {n} words in the \"words\" JSON array.\n\n\
Part 1 - From Lenny's Podcast (include these first, in order): For each item below, add \"pronunciation\" (KK Phonetic Symbol) and \"definition\" (English). Keep \"word\" and \"sentence\" exactly as given.\n\
{block}\n\n\
Part 2 - Generate {additional} more words: Each with word, pronunciation (KK), definition, and sentence. Level {level}. \
Include at least {b1b2} word(s) B1-B2 and at least {b2c1} word(s) B2 or C1. \
At least 2 words must be commonly used in annual performance reviews or appraisals (e.g. performance review, appraisal, KPI, OKR, promotion); \
use example sentences that sound like real manager-employee evaluation conversations.{exclusions}\n\n\
Output format: JSON object with single key \"words\", value an array of {n} objects each with keys: word, pronunciation, definition, sentence. No extra text or code block.",
            n = num_words,
            block = curated_block(samples),
            additional = additional,
            level = level,
            b1b2 = dist.b1_b2,
            b2c1 = dist.b2_c1,
            exclusions = exclusions,
        )
    } else if !samples.is_empty() {
        format!(
            "Output exactly {n} words in the \"words\" JSON array. For each item below, add \"pronunciation\" (KK Phonetic Symbol) and \"definition\" (English). Keep \"word\" and \"sentence\" exactly as given.\n\
{block}\n\n\
Output format: JSON object with single key \"words\", value an array of objects each with keys: word, pronunciation, definition, sentence. No extra text or code block.",
            n = num_words,
            block = curated_block(samples),
        )
    } else {
        format!(
            "Generate a list of {n} English vocabulary words with KK Phonetic Symbol, with their English definition, and with one example sentence each, suitable for {level} level. \
Format the output as a pure JSON array of objects. \
Please include at least {b1b2} word{b1b2s} in level B1-B2 and at least {b2c1} word{b2c1s} in level B2 or C1. \
Each object should have \"word\", \"pronunciation\", \"definition\", and \"sentence\" keys. \
Please consider at least {cur} word{curs} from Lenny's Podcast's transcript and sentences, so it's more tech related. \
Also, make sure at least 2 of the words are commonly used by employees when talking about annual performance reviews or appraisals (e.g. performance review, appraisal, KPI, OKR, promotion discussion). \
These performance-review-related words should have example sentences that sound like real conversations between employees and managers about yearly evaluations. \
Do not include any extra text, explanation, or code block. Only output the JSON array.{exclusions}",
            n = num_words,
            level = level,
            b1b2 = dist.b1_b2,
            b1b2s = plural(dist.b1_b2),
            b2c1 = dist.b2_c1,
            b2c1s = plural(dist.b2_c1),
            cur = dist.curated,
            curs = plural(dist.curated),
            exclusions = exclusions,
        )
    }
}
