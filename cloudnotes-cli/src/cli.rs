use std::path::PathBuf;
use clap::{Parser, Subcommand};
use cloudnotes::DEFAULT_CONFIG_FILE;
use data::NoteId;

#[derive(Clone, Debug, Eq, Parser, PartialEq)]
#[command(version, author, about)]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Eq, PartialEq, Subcommand)]
pub enum Command {
    /// Sign in with an email and a password (asked for interactively)
    Login {
        #[arg(long)]
        email: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Print who is signed in
    Whoami,

    /// List notes, newest first
    List {
        /// Only notes whose title or content contain this, ignoring case
        #[arg(long)]
        search: Option<String>,
    },

    /// Add a note
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,
    },

    /// Change the title and/or the content of a note
    Edit {
        id: NoteId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },

    /// Delete a note
    Delete {
        id: NoteId,
    },

    /// Keep the list on screen and edit it with commands read from stdin.
    ///
    /// The list is redrawn after every change made from this prompt; changes
    /// made elsewhere show up only after a `search`.
    Watch {
        #[arg(long)]
        search: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use super::*;

    #[test]
    fn cli_is_consistent() {
        CliConfig::command().debug_assert();
    }

    #[test]
    fn default_config_file() {
        let config = CliConfig::try_parse_from(["cloudnotes", "whoami"]).unwrap();
        assert_eq!(config.config_file, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(config.command, Command::Whoami);
    }

    #[test]
    fn edit_takes_optional_fields() {
        let config = CliConfig::try_parse_from(
            ["cloudnotes", "--config-file", "other.toml", "edit", "42", "--title", "New"],
        ).unwrap();
        assert_eq!(config.config_file, PathBuf::from("other.toml"));
        assert_eq!(
            config.command,
            Command::Edit {
                id: "42".parse().unwrap(),
                title: Some("New".into()),
                content: None,
            },
        );
    }

    #[test]
    fn watch_help_does_not_promise_remote_updates() {
        let help = CliConfig::command()
            .find_subcommand_mut("watch")
            .expect("watch subcommand")
            .render_long_help()
            .to_string();
        assert!(help.contains("made from this prompt"), "{help}");
    }

    #[test]
    fn empty_note_id_is_rejected() {
        assert!(CliConfig::try_parse_from(["cloudnotes", "delete", ""]).is_err());
    }
}
