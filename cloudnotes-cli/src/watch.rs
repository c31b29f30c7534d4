use cloudnotes::change_feed::ChangeHub;
use cloudnotes::notes_view::NotesViewError;
use data::NoteId;
use log::{debug, error};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::ctrl_c;
use crate::app_constants::WATCH_HELP;
use crate::commands::edit_note;
use crate::render::render_notes;
use crate::ProductionNotesView;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WatchCommand {
    Add {
        title: String,
        content: String,
    },
    Edit {
        id: NoteId,
        title: String,
        content: String,
    },
    Remove(NoteId),
    Search(String),
    Help,
    Quit,
}

pub fn parse_watch_command(line: &str) -> Result<WatchCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ')
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((line, ""));
    match verb {
        "add" => {
            let (title, content) = split_fields(rest)
                .ok_or("usage: add <title> | <content>")?;
            Ok(WatchCommand::Add { title, content })
        },
        "edit" => {
            let (id, fields) = rest.split_once(' ')
                .ok_or("usage: edit <id> <title> | <content>")?;
            let (title, content) = split_fields(fields)
                .ok_or("usage: edit <id> <title> | <content>")?;
            Ok(WatchCommand::Edit { id: parse_id(id)?, title, content })
        },
        "rm" => Ok(WatchCommand::Remove(parse_id(rest)?)),
        "search" => Ok(WatchCommand::Search(rest.to_owned())),
        "help" | "?" => Ok(WatchCommand::Help),
        "quit" | "exit" => Ok(WatchCommand::Quit),
        other => Err(format!("unknown command \"{other}\", try \"help\"")),
    }
}

fn split_fields(text: &str) -> Option<(String, String)> {
    let (title, content) = text.split_once('|')?;
    Some((title.trim().to_owned(), content.trim().to_owned()))
}

fn parse_id(text: &str) -> Result<NoteId, String> {
    text.trim().parse()
        .map_err(|_| "a note id is required".to_owned())
}

/// Keeps the list on screen until Ctrl-C, end of input or `quit`, running
/// commands typed in the meantime.
pub async fn watch_notes(
    view: &ProductionNotesView,
    hub: &ChangeHub,
    search: Option<String>,
) -> Result<(), NotesViewError> {
    if let Some(query) = search {
        view.set_search_query(query).await;
    }
    let mut revisions = view.revisions();
    let _mounted = view.mount(hub).await?;
    render(view).await;
    revisions.borrow_and_update();
    println!("{WATCH_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break
                }
                revisions.borrow_and_update();
                render(view).await;
            },
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => (),
                Ok(Some(line)) => match parse_watch_command(&line) {
                    Ok(WatchCommand::Quit) => break,
                    Ok(command) => run_command(view, command).await,
                    Err(message) => eprintln!("{message}"),
                },
                Ok(None) => break,
                Err(e) => {
                    error!("failed to read the input: {e}");
                    break
                },
            },
            _ = ctrl_c() => break,
        }
    }
    debug!("leaving watch mode");
    Ok(())
}

async fn run_command(view: &ProductionNotesView, command: WatchCommand) {
    let result = match command {
        WatchCommand::Add { title, content } => {
            view.set_draft_title(title).await;
            view.set_draft_content(content).await;
            view.create().await
        },
        WatchCommand::Edit { id, title, content } =>
            edit_note(view, &id, Some(title), Some(content)).await,
        WatchCommand::Remove(id) => view.delete(&id).await,
        WatchCommand::Search(query) => {
            view.set_search_query(query).await;
            view.list().await
        },
        WatchCommand::Help => {
            println!("{WATCH_HELP}");
            Ok(())
        },
        WatchCommand::Quit => Ok(()),
    };
    match result {
        // the notifier has already told the user
        Ok(()) | Err(NotesViewError::Store(_)) => (),
        Err(e) => eprintln!("error: {e}"),
    }
}

async fn render(view: &ProductionNotesView) {
    let notes = view.visible_notes().await;
    let query = view.search_query().await;
    println!("----");
    println!("{}", render_notes(&notes, &query));
}
