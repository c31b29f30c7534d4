pub const DEFAULT_CONFIG_FILE: &str = "cloudnotes.toml";
pub const APP_CONFIG_ENV_PREFIX: &str = "CLOUDNOTES_";

pub const DEFAULT_SESSION_FILE: &str = ".cloudnotes-session.toml";
pub const DEFAULT_NOTES_TABLE: &str = "notes";

pub const NOTE_ADDED_MESSAGE: &str = "Note added successfully!";
pub const NOTE_UPDATED_MESSAGE: &str = "Note updated successfully!";
pub const NOTE_DELETED_MESSAGE: &str = "Note deleted successfully!";

// a subscriber further behind than this gets an overflow error instead
pub const CHANGE_FEED_CAPACITY: usize = 64;
pub const SESSION_CHANGES_CAPACITY: usize = 16;
