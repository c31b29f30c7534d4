pub mod data;
mod constants;
mod fake_backend;
mod mock_hierarchy;

pub use constants::*;
pub use fake_backend::{FakeBackend, FakeBackendState};
pub use mock_hierarchy::{setup_config, setup_config_with_session};
pub use mock_hierarchy::{CONFIG_FILE_NAME, SESSION_FILE_NAME};
