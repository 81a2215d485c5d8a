use thiserror::Error;

/// Why a player action was rejected. The session is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ActionError {
    #[error("piece does not fit there")]
    InvalidPlacement,
    #[error("queue slot is empty")]
    EmptySlot,
    #[error("board is resolving a clear")]
    Busy,
    #[error("game is not playable")]
    NotPlayable,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("no undo charges left")]
    NoUndoCharges,
    #[error("no rerolls left")]
    NoRerollCharges,
    #[error("no hammers left")]
    NoHammers,
    #[error("no bombs left")]
    NoBombs,
    #[error("target cell is empty")]
    EmptyTarget,
    #[error("not enough coins")]
    InsufficientCoins,
    #[error("upgrade already at max level")]
    MaxUpgrade,
}

impl ActionError {
    pub fn code(self) -> &'static str {
        match self {
            ActionError::InvalidPlacement | ActionError::EmptySlot => "invalid_place",
            ActionError::Busy | ActionError::NotPlayable => "not_ready",
            ActionError::NothingToUndo => "nothing_to_undo",
            ActionError::NoUndoCharges
            | ActionError::NoRerollCharges
            | ActionError::NoHammers
            | ActionError::NoBombs
            | ActionError::InsufficientCoins => "exhausted",
            ActionError::EmptyTarget => "invalid_target",
            ActionError::MaxUpgrade => "max_upgrade",
        }
    }

    /// Toast text shown to the player
    pub fn message(self) -> &'static str {
        match self {
            ActionError::InvalidPlacement => "Invalid Move",
            ActionError::EmptySlot => "Pick a Piece",
            ActionError::Busy => "Hold On...",
            ActionError::NotPlayable => "Game Paused",
            ActionError::NothingToUndo => "Nothing to Undo!",
            ActionError::NoUndoCharges => "No Undos left!",
            ActionError::NoRerollCharges => "No Rerolls left!",
            ActionError::NoHammers => "No Hammers left!",
            ActionError::NoBombs => "No Bombs left!",
            ActionError::EmptyTarget => "Target a Block",
            ActionError::InsufficientCoins => "Not enough Coins!",
            ActionError::MaxUpgrade => "Max Level Reached",
        }
    }

    /// True for rejections caused by running out of a consumable
    pub fn is_exhaustion(self) -> bool {
        self.code() == "exhausted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_group_resource_exhaustion() {
        assert!(ActionError::NoUndoCharges.is_exhaustion());
        assert!(ActionError::InsufficientCoins.is_exhaustion());
        assert!(!ActionError::NothingToUndo.is_exhaustion());
        assert_eq!(ActionError::Busy.code(), "not_ready");
    }

    #[test]
    fn test_display_and_message_differ() {
        assert_eq!(ActionError::NoRerollCharges.to_string(), "no rerolls left");
        assert_eq!(ActionError::NoRerollCharges.message(), "No Rerolls left!");
    }
}
