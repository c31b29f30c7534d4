pub const AUTH_HINT: &str = "Not signed in. Run `cloudnotes login --email <email>` first.";
pub const PASSWORD_PROMPT: &str = "Password: ";
pub const NO_NOTES: &str = "No notes.";
pub const NO_MATCHING_NOTES: &str = "No notes match the search.";
pub const WATCH_HELP: &str = "\
commands:
  add <title> | <content>
  edit <id> <title> | <content>
  rm <id>
  search [<query>]   (also refetches the list)
  quit";
