use cloudnotes::backend::rest::RestIdentityProvider;
use cloudnotes::notes_view::NotesViewError;
use cloudnotes::session_holder::SessionHolder;
use cloudnotes::store::StoreError;
use cloudnotes::error_exit;
use data::NoteId;
use log::debug;
use rpassword::prompt_password;
use crate::app_constants::{AUTH_HINT, PASSWORD_PROMPT};
use crate::render::render_notes;
use crate::ProductionNotesView;

pub async fn login(provider: &RestIdentityProvider, email: &str) {
    let password = prompt_password(PASSWORD_PROMPT)
        .unwrap_or_else(|e| error_exit!("failed to read the password: {e}"));
    match provider.sign_in_with_password(email, &password).await {
        Ok(session) => println!(
            "Signed in as {}",
            session.email().unwrap_or(email),
        ),
        Err(e) => error_exit!("{e}"),
    }
}

pub async fn logout(holder: &SessionHolder<RestIdentityProvider>) {
    if !holder.is_authenticated() {
        println!("{AUTH_HINT}");
        return
    }
    if let Err(e) = holder.sign_out().await {
        error_exit!("failed to sign out: {e}");
    }
    println!("Signed out");
}

pub fn whoami(holder: &SessionHolder<RestIdentityProvider>) {
    match holder.current() {
        Some(session) => println!(
            "{} ({})",
            session.email().unwrap_or("no email"),
            session.user.id,
        ),
        None => error_exit!("{AUTH_HINT}"),
    }
}

pub async fn list(
    view: &ProductionNotesView,
    search: Option<String>,
) -> Result<(), NotesViewError> {
    view.list().await?;
    if let Some(query) = search {
        view.set_search_query(query).await;
    }
    println!(
        "{}",
        render_notes(&view.visible_notes().await, &view.search_query().await),
    );
    Ok(())
}

pub async fn add(
    view: &ProductionNotesView,
    title: String,
    content: String,
) -> Result<(), NotesViewError> {
    view.set_draft_title(title).await;
    view.set_draft_content(content).await;
    view.create().await
}

/// Opens the edit buffer on the note with `id` from the local list, changes
/// the given fields and saves.
pub async fn edit_note(
    view: &ProductionNotesView,
    id: &NoteId,
    title: Option<String>,
    content: Option<String>,
) -> Result<(), NotesViewError> {
    let Some(note) = view.find_note(id).await else {
        eprintln!("error: no note with id {id}");
        return Err(StoreError::NoteNotFound.into())
    };
    view.start_editing(&note).await;
    if let Some(title) = title {
        view.set_edit_title(title).await?;
    }
    if let Some(content) = content {
        view.set_edit_content(content).await?;
    }
    debug!("saving note {id}");
    view.save_edit().await
}

pub async fn edit(
    view: &ProductionNotesView,
    id: &NoteId,
    title: Option<String>,
    content: Option<String>,
) -> Result<(), NotesViewError> {
    if title.is_none() && content.is_none() {
        error_exit!("nothing to change, give --title and/or --content");
    }
    view.list().await?;
    edit_note(view, id, title, content).await
}
