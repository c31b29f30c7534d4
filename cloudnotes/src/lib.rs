pub mod backend;
pub mod change_feed;
pub mod config;
pub mod identity;
mod lib_constants;
pub mod logging;
pub mod notes_view;
pub mod notifications;
pub mod rng;
pub mod search;
pub mod session_holder;
pub mod store;
pub mod util;

pub use lib_constants::*;
