use std::fmt::{self, Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-assigned note identifier.
///
/// The backend decides the format (a UUID for the hosted backends, anything
/// for test fixtures), so it's kept opaque; the only thing rejected is an
/// empty string.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl FromStr for NoteId {
    type Err = NoteIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NoteIdParseError);
        }
        Ok(NoteId(s.to_owned()))
    }
}

impl Deref for NoteId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0[..]
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for NoteId {
    fn from(uuid: Uuid) -> Self {
        NoteId(uuid.hyphenated().to_string())
    }
}

#[derive(Debug, Eq, PartialEq)]
pub struct NoteIdParseError;

impl Display for NoteIdParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("note id must not be empty")
    }
}

impl std::error::Error for NoteIdParseError {}

/// Owner identifier, assigned by the identity provider.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl Deref for UserId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0[..]
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_rejected() {
        assert_eq!(NoteId::from_str(""), Err(NoteIdParseError));
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = NoteId::from_str("1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""1""#);
        let back: NoteId = serde_json::from_str(r#""1""#).unwrap();
        assert_eq!(back, id);
    }
}
