//! Playback state machine.

/// The closed set of player states.
///
/// Valid transitions:
/// `Stopped → CountingDown → Playing → Stopped`, plus the two abort
/// edges `CountingDown → Stopped` and `Playing → Stopped`. Everything
/// else is rejected by [`PlaybackState::can_transition_to`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    CountingDown,
    Playing,
}

impl PlaybackState {
    /// Whether moving to `next` is a legal transition.
    pub fn can_transition_to(self, next: PlaybackState) -> bool {
        use PlaybackState::*;
        matches!(
            (self, next),
            (Stopped, CountingDown)
                | (CountingDown, Playing)
                | (CountingDown, Stopped)
                | (Playing, Stopped)
        )
    }

    /// Encode for storage in an `AtomicU8` state snapshot.
    pub fn to_u8(self) -> u8 {
        match self {
            PlaybackState::Stopped => 0,
            PlaybackState::CountingDown => 1,
            PlaybackState::Playing => 2,
        }
    }

    /// Decode from an `AtomicU8`; unknown values read as Stopped.
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => PlaybackState::CountingDown,
            2 => PlaybackState::Playing,
            _ => PlaybackState::Stopped,
        }
    }
}
