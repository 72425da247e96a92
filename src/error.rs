//! Main Crate Error

#[derive(thiserror::Error, Debug)]
/// Pastry crate error enum.
pub enum Error {
    /// Indicates that an [Id](crate::Id) could not be built from raw bytes
    /// of the wrong width.
    #[error("Invalid Id size, expected 20 bytes, got {0}")]
    InvalidIdSize(usize),

    /// Indicates that an [Id](crate::Id) could not be parsed from a string
    /// that is not 40 hexadecimal characters.
    #[error("Invalid Id encoding, expected 40 hexadecimal characters")]
    InvalidIdEncoding,

    /// Indicates an attempt to insert the local node into its own leaf set.
    #[error("Cannot insert the local node into its own leaf set")]
    SelfEntry,

    /// The leaf set actor was shutdown, no further operations are possible.
    #[error("The leaf set was shutdown")]
    LeafSetShutdown,
}

pub type Result<T> = std::result::Result<T, Error>;
