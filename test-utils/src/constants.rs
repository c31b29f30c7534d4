use std::time::Duration;

pub const FAKE_ANON_KEY: &str = "fake-anon-key";
pub const FAKE_EMAIL: &str = "alice@example.com";
pub const FAKE_PASSWORD: &str = "correct horse battery staple";
pub const FAKE_TOKEN_LIFETIME_SECS: i64 = 3600;

pub const EVENT_WAIT: Duration = Duration::from_millis(5000);
