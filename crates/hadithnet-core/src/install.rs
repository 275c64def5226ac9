//! Install/update lifecycle of the app as an explicit state machine.
//!
//! Platform events (an install prompt becoming available, the user's answer,
//! the platform reporting the app installed) drive the transitions. An event
//! that is not legal in the current state is rejected and the state is left
//! unchanged.

use std::fmt;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstallState {
    #[default]
    Idle,
    PromptAvailable,
    Installing,
    Installed,
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallState::Idle => "idle",
            InstallState::PromptAvailable => "promptAvailable",
            InstallState::Installing => "installing",
            InstallState::Installed => "installed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallEvent {
    /// The platform offered an install prompt.
    PromptAvailable,
    /// The user asked to install.
    InstallRequested,
    /// The user accepted the platform prompt.
    UserAccepted,
    /// The user dismissed the platform prompt.
    UserDismissed,
    /// The platform reported the app installed.
    AppInstalled,
    /// The app is running standalone, so it is already installed.
    StandaloneDetected,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Event {event:?} is not valid in state {state}")]
pub struct TransitionError {
    pub state: InstallState,
    pub event: InstallEvent,
}

#[derive(Debug, Default)]
pub struct InstallLifecycle {
    state: InstallState,
}

impl InstallLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    /// An install can be started from the current state.
    pub fn can_install(&self) -> bool {
        self.state == InstallState::PromptAvailable
    }

    pub fn handle(&mut self, event: InstallEvent) -> Result<InstallState, TransitionError> {
        use InstallEvent as E;
        use InstallState as S;

        let next = match (self.state, event) {
            (_, E::AppInstalled | E::StandaloneDetected) => S::Installed,
            (S::Idle | S::PromptAvailable, E::PromptAvailable) => S::PromptAvailable,
            (S::PromptAvailable, E::InstallRequested) => S::Installing,
            (S::Installing, E::UserAccepted) => S::Installed,
            (S::Installing, E::UserDismissed) => S::PromptAvailable,
            (state, event) => return Err(TransitionError { state, event }),
        };
        debug!(from = %self.state, to = %next, ?event, "Install lifecycle transition");
        self.state = next;
        Ok(next)
    }
}
