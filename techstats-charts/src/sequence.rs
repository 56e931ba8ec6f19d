//! Request sequencing for stale-response discard.
//!
//! Every refresh of a surface takes a token. Only a response carrying the
//! most recently issued token may be applied; anything older is dropped.

/// Issued per refresh. Tokens from one sequencer are strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshToken {
    sequence: u64,
}

impl RefreshToken {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_newer_than(&self, other: &RefreshToken) -> bool {
        self.sequence > other.sequence
    }
}

/// Per-surface monotonic token source.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RefreshToken {
        self.latest += 1;
        RefreshToken {
            sequence: self.latest,
        }
    }

    /// Whether `token` is the most recently issued one.
    pub fn is_current(&self, token: RefreshToken) -> bool {
        token.sequence == self.latest
    }

    /// Most recently issued sequence number; zero before the first issue.
    pub fn latest(&self) -> u64 {
        self.latest
    }
}
