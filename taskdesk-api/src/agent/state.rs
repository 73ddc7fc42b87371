use std::fmt;

/// Lifecycle of the authentication session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticating,
    Active,
    Renewing,
}

impl SessionState {
    /// Whether the renewal timer runs in this state.
    ///
    /// `Authenticating` and `Renewing` keep whatever timer was running.
    pub(crate) fn arms_timer(self) -> Option<bool> {
        match self {
            Self::Active => Some(true),
            Self::Anonymous => Some(false),
            Self::Authenticating | Self::Renewing => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Active => "active",
            Self::Renewing => "renewing",
        })
    }
}
