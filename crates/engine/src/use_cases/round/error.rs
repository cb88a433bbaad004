//! Round coordination errors.

use chronicle_domain::PlayerId;

/// Errors returned by round operations. A rejected call never changes the
/// round.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoundError {
    #[error("A round is already in progress")]
    AlreadyActive,
    #[error("Player {0} has already submitted an action this round")]
    AlreadySubmitted(PlayerId),
    #[error("Player {0} is not a participant in this round")]
    NotAParticipant(PlayerId),
    #[error("No round is open")]
    RoundClosed,
    #[error("Player {0} may not do that in this round")]
    NotPermitted(PlayerId),
    #[error("Round is still waiting on {pending} player(s)")]
    NotReady { pending: usize },
    #[error("Action text cannot be empty")]
    EmptyAction,
    #[error("A round needs at least one participant")]
    NoParticipants,
}
