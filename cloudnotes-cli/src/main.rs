mod app_constants;
mod cli;
mod commands;
mod render;
mod terminal_notifier;
mod watch;

use std::process::exit;
use std::sync::Arc;
use clap::{crate_name, Parser};
use cloudnotes::backend::rest::{RestConfig, RestIdentityProvider, RestNoteStore};
use cloudnotes::change_feed::ChangeHub;
use cloudnotes::config::read_app_config;
use cloudnotes::error_exit;
use cloudnotes::logging::init_logging;
use cloudnotes::notes_view::{NotesView, NotesViewError};
use cloudnotes::session_holder::SessionHolder;
use log::debug;
use crate::app_constants::AUTH_HINT;
use crate::cli::{CliConfig, Command};
use crate::terminal_notifier::TerminalNotifier;

pub type ProductionNotesView = NotesView<RestNoteStore, TerminalNotifier>;

#[tokio::main]
async fn main() {
    init_logging();

    debug!("{} starting up", crate_name!());

    let cli_config = CliConfig::parse();
    let app_config = read_app_config(&cli_config.config_file)
        .unwrap_or_else(|e| {
            error_exit!("finishing due to a configuration error: {e}");
        });
    let rest_config = RestConfig::from_app_config(&app_config)
        .unwrap_or_else(|e| error_exit!("invalid backend url: {e}"));

    let client = reqwest::Client::new();
    let provider = RestIdentityProvider::open(
        client.clone(),
        rest_config.clone(),
        &app_config.session_file,
    ).await.unwrap_or_else(|e| error_exit!("failed to load the session: {e}"));

    if let Command::Login { email } = &cli_config.command {
        commands::login(&provider, email).await;
        return
    }

    let holder = SessionHolder::start(Arc::new(provider)).await
        .unwrap_or_else(|e| error_exit!("failed to get the session: {e}"));
    let result = match cli_config.command {
        Command::Login { .. } => Ok(()),
        Command::Logout => {
            commands::logout(&holder).await;
            Ok(())
        },
        Command::Whoami => {
            commands::whoami(&holder);
            Ok(())
        },
        command => {
            if !holder.is_authenticated() {
                eprintln!("{AUTH_HINT}");
                exit(1)
            }
            let hub = ChangeHub::new();
            let store = RestNoteStore::with_identity(
                client,
                rest_config,
                holder.provider().clone(),
            ).with_change_hub(hub.clone());
            let view = NotesView::new(store, TerminalNotifier);
            run_notes_command(&view, &hub, command).await
        },
    };

    match result {
        Ok(()) => (),
        // the notifier has already told the user
        Err(NotesViewError::Store(_)) => exit(1),
        Err(e) => error_exit!("{e}"),
    }
}

async fn run_notes_command(
    view: &ProductionNotesView,
    hub: &ChangeHub,
    command: Command,
) -> Result<(), NotesViewError> {
    match command {
        Command::List { search } => commands::list(view, search).await,
        Command::Add { title, content } =>
            commands::add(view, title, content).await,
        Command::Edit { id, title, content } =>
            commands::edit(view, &id, title, content).await,
        Command::Delete { id } => view.delete(&id).await,
        Command::Watch { search } =>
            watch::watch_notes(view, hub, search).await,
        Command::Login { .. } | Command::Logout | Command::Whoami => Ok(()),
    }
}
