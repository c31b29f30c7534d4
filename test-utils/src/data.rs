use std::sync::LazyLock;
use data::{Note, NoteId, Session, User, UserId};
use time::macros::datetime;

pub static TEST_USER: LazyLock<User> = LazyLock::new(||
    User {
        id: UserId("7d3b0a4e-6c1f-4f7e-9a51-0c2e8f1d9b11".into()),
        email: Some("alice@example.com".into()),
    }
);

pub fn test_session() -> Session {
    Session {
        access_token: "test-access-token".into(),
        refresh_token: Some("test-refresh-token".into()),
        expires_at: None,
        user: TEST_USER.clone(),
    }
}

pub fn groceries() -> Note {
    Note {
        id: "1".parse::<NoteId>().expect("valid note id"),
        title: "Groceries".into(),
        content: "milk, eggs".into(),
        created_at: datetime!(2024-01-02 00:00 UTC),
        user_id: TEST_USER.id.clone(),
    }
}

pub fn todo() -> Note {
    Note {
        id: "2".parse::<NoteId>().expect("valid note id"),
        title: "Todo".into(),
        content: "ship release".into(),
        created_at: datetime!(2024-01-01 00:00 UTC),
        user_id: TEST_USER.id.clone(),
    }
}

/// Both scenario notes, newest first.
pub fn scenario_notes() -> Vec<Note> {
    vec![groceries(), todo()]
}
