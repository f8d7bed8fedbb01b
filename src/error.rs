use thiserror::Error;

/// Failures the host can run into.  The game logic itself has no error
/// paths: running out of lives is a state transition, not an error.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("terminal is {width}x{height}, need at least {min_width}x{min_height}")]
    TerminalTooSmall {
        width: u16,
        height: u16,
        min_width: u16,
        min_height: u16,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
