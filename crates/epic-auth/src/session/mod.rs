//! Login, logout and session restoration.

mod manager;
mod persisted;

pub use manager::{LoginResponse, LogoutResponse, SessionInfo, SessionManager};
pub use persisted::{PersistedSession, SessionFile};
