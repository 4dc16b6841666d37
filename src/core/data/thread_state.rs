use std::fmt;

/// Display state of one worker slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadState {
    Starting,
    Busy,
    Waiting,
    Restarted,
    Idle,
    Shared,
    Finishing,
    Disabled,
}

impl ThreadState {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Busy => 1,
            Self::Waiting => 2,
            Self::Restarted => 3,
            Self::Idle => 4,
            Self::Shared => 5,
            Self::Finishing => 6,
            Self::Disabled => 7,
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Busy => "busy",
            Self::Waiting => "waiting",
            Self::Restarted => "restarted",
            Self::Idle => "idle",
            Self::Shared => "shared",
            Self::Finishing => "finishing",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
