use crate::session::Phase;
use thiserror::Error;

/// Operations the session refuses to perform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: Phase, to: Phase },

    #[error("{0} must not be empty")]
    EmptyName(&'static str),

    #[error("the companion has already been named {0}")]
    AlreadyNamed(String),

    #[error("messages are only accepted while chatting or dreaming (current phase: {0})")]
    NotConversing(Phase),

    #[error("no calendar event with id {0}")]
    UnknownEvent(String),

    #[error("invalid calendar date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}
