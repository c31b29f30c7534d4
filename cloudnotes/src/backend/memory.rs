mod identity;
mod store;

pub use identity::MemoryIdentityProvider;
pub use store::MemoryNoteStore;
