/// Notifications published after a chunk of log lines has been applied.
///
/// Neither carries a payload: subscribers read the shared game state at
/// notification time. A lagging subscriber may observe a newer state than the
/// one that triggered the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateEvent {
    /// The reconstructed state changed since the previous notification.
    StateChanged,
    /// The active turn moved to another player (or a new match began its first turn).
    TurnChanged,
}
