/// Structural problems found while building a [`MenuTree`](super::MenuTree).
///
/// `path` names the offending node by the keys leading to it from the root
/// (`root/1/101`), so a load failure can be traced back to the menu source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("{path}: key '{key}' is not a keypad sequence (0-9, *, #)")]
    InvalidKey { path: String, key: String },

    #[error("{path}: key '{key}' has more than one symbol but the node is not in extension mode")]
    MultiSymbolKey { path: String, key: String },

    #[error("{path}: back/home key '{key}' must be a single symbol")]
    MultiSymbolLink { path: String, key: String },

    #[error("{path}: duplicate transition key '{key}'")]
    DuplicateKey { path: String, key: String },

    #[error("{path}: extension mode needs a length of at least 1 or a terminator")]
    ExtensionWithoutTerminus { path: String },

    #[error("{path}: all option keys must be {expected} digits long, got '{key}'")]
    ExtensionLengthMismatch {
        path: String,
        key: String,
        expected: usize,
    },

    #[error("{path}: cannot mix single-digit and multi-digit options in extension mode")]
    MixedExtensionKeyLengths { path: String },

    #[error("{path}: extension terminator '{terminator}' must be '*' or '#'")]
    InvalidTerminator { path: String, terminator: char },

    #[error("{path}: extension terminator '{terminator}' cannot appear in option key '{key}'")]
    TerminatorInKey {
        path: String,
        key: String,
        terminator: char,
    },

    #[error("{path}: key '{key}' collides with extension digits or the terminator")]
    LinkCollidesWithExtension { path: String, key: String },

    #[error("{path}: timeout must be greater than zero")]
    ZeroTimeout { path: String },

    #[error("{path}: timeout must be at most {max_secs} seconds")]
    TimeoutTooLong { path: String, max_secs: u64 },
}
