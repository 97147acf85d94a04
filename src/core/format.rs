//! Outbound message text. Markdown flavoured: `*bold*` headings, plain blocks.

use crate::core::{VerseRecord, VerseReference};

pub fn broadcast_message(reference: &VerseReference, record: &VerseRecord) -> String {
    format!(
        "📖 *Verse of the day: {}*\n\n*Verse text:*\n{}\n\n*Translation ({}):*\n{}",
        reference,
        record.arabic_text,
        reference.translator().label(),
        record.translation_text
    )
}

pub fn lookup_message(reference: &VerseReference, record: &VerseRecord) -> String {
    let mut text = format!(
        "📖 *{}*\n\n*Verse text:*\n{}\n\n*Translation ({}):*\n{}\n\n*Commentary:*",
        reference,
        record.arabic_text,
        reference.translator().label(),
        record.translation_text
    );
    for commentary in &record.commentaries {
        text.push_str(&format!("\n\n_{}_\n{}", commentary.author, commentary.text));
    }
    text
}

pub fn not_found_message(reference: &VerseReference) -> String {
    format!(
        "😔 Verse {} ({}) could not be found. Check the reference and try again.",
        reference,
        reference.translator().slug()
    )
}
