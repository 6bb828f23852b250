use crate::error::SessionError;

/// Key under which the login screen records an authenticated session.
pub const LOGGED_IN_KEY: &str = "loggedIn";

/// Read side of the auth collaborator: is a session currently authenticated?
///
/// The gate never validates credentials; it only consumes this flag.
pub trait SessionStore: Send + Sync {
    fn name(&self) -> &str;

    /// `true` when `loggedIn` is stored as `"true"`. Unreadable stores count
    /// as unauthenticated.
    fn is_authenticated(&self) -> bool;

    /// Write (or clear) the flag, as the login/logout flow does.
    fn set_logged_in(&self, logged_in: bool) -> Result<(), SessionError>;
}
