use std::sync::atomic::{AtomicU8, Ordering};

/// Where a message stands in its response lifecycle.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    /// Delivered and not yet resolved. `touch` keeps a message here.
    Pending = 0,
    /// Finished or requeued. Terminal.
    Responded = 1,
}

impl ResponseState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ResponseState::Pending,
            _ => ResponseState::Responded,
        }
    }
}

/// [`ResponseState`] stored in an atomic so concurrent responders can race
/// on it safely.
#[derive(Debug)]
pub(crate) struct AtomicResponseState(AtomicU8);

impl AtomicResponseState {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(ResponseState::Pending as u8))
    }

    pub(crate) fn load(&self) -> ResponseState {
        ResponseState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `Pending` to `Responded`.
    ///
    /// Only the first caller succeeds; everyone else gets the state they
    /// found instead.
    pub(crate) fn respond(&self) -> Result<(), ResponseState> {
        self.0
            .compare_exchange(
                ResponseState::Pending as u8,
                ResponseState::Responded as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(ResponseState::from_u8)
    }
}
