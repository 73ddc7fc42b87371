//! The authenticated session and the outbound pipeline built around it.
//!
//! [`SessionManager`] keeps the short-lived credential in memory, persists a
//! [`SessionMarker`] through a [`Store`](taskdesk_common::store::Store) so the
//! session can be renewed after a restart, and renews the credential on a timer
//! while the session is [`Active`](SessionState::Active).
pub mod events;
mod inner;
mod renewal;
mod session_manager;
mod state;

pub use self::inner::Client as SessionClient;
pub use self::session_manager::{
    Context, SessionManager, SessionMarker, SessionOptions, DEFAULT_RENEWAL_INTERVAL,
};
pub use self::state::SessionState;
