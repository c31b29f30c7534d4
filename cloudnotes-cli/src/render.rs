use data::Note;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use crate::app_constants::{NO_MATCHING_NOTES, NO_NOTES};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn render_notes(notes: &[Note], search_query: &str) -> String {
    if notes.is_empty() {
        return if search_query.is_empty() {
            NO_NOTES
        } else {
            NO_MATCHING_NOTES
        }.to_owned();
    }
    notes.iter()
        .map(render_note)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_note(note: &Note) -> String {
    let date = note.created_at.format(DATE_FORMAT)
        .unwrap_or_else(|_| note.created_at.to_string());
    let mut out = format!("[{}] {}  ({date})\n", note.id, note.title);
    for line in note.content.lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
    out
}
