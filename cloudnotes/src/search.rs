use data::Note;

/// Case-insensitive substring match on title or content.
pub fn note_matches(note: &Note, query: &str) -> bool {
    matches_lowercase(note, &query.to_lowercase())
}

/// Notes matching `query`, in their original order. An empty query matches
/// everything.
pub fn filter_notes<'a>(
    notes: impl IntoIterator<Item=&'a Note>,
    query: &str,
) -> Vec<Note> {
    let query = query.to_lowercase();
    notes.into_iter()
        .filter(|note| matches_lowercase(note, &query))
        .cloned()
        .collect()
}

fn matches_lowercase(note: &Note, query: &str) -> bool {
    note.title.to_lowercase().contains(query)
        || note.content.to_lowercase().contains(query)
}
