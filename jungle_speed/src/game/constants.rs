use std::time::Duration;

/// Seats at the table.
pub const MAX_PLAYERS: usize = 4;

/// Seats that must be filled before a round can be dealt.
pub const MIN_PLAYERS: usize = 2;

pub const DECK_SIZE: usize = 52;

/// How long draws stay blocked after any bottle grab.
pub const GRAB_COOLDOWN: Duration = Duration::from_millis(2000);

pub const MAX_NAME_LENGTH: usize = 16;
