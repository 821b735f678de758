use clap::ValueEnum;
use std::fmt;

/// Relay outputs whose indicator shows which shutter is currently selected
pub const SHUTTER_PORTS: [RelayPort; 4] =
    [RelayPort(1), RelayPort(2), RelayPort(3), RelayPort(4)];

/// Upper bound on select presses before giving up on a selection
pub const MAX_SELECT_PRESSES: usize = SHUTTER_PORTS.len() * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelayPort(pub u8);

impl fmt::Display for RelayPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum Operation {
    Up,
    Down,
    Select,
    Stop,
}

impl Operation {
    /// Relay that acts as the button for this operation
    pub fn port(&self) -> RelayPort {
        match self {
            Operation::Up => RelayPort(1),
            Operation::Down => RelayPort(2),
            Operation::Select => RelayPort(3),
            Operation::Stop => RelayPort(4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutterId(u8);

impl ShutterId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(number: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&number)
            .then_some(Self(number))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Indicator relay lit while this shutter is selected
    pub fn port(&self) -> RelayPort {
        SHUTTER_PORTS[usize::from(self.0 - Self::MIN)]
    }
}

impl fmt::Display for ShutterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
