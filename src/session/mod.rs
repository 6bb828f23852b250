pub mod store;
pub mod traits;

pub use store::{FileSessionStore, MemorySessionStore};
pub use traits::{LOGGED_IN_KEY, SessionStore};
