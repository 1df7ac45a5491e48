use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("RAM region not found in process {pid}")]
    RegionNotFound { pid: u32 },

    #[error("Not attached to an emulator process")]
    NotAttached,

    #[error("Failed to read emulated memory at address {address:#010x}: {message}")]
    ReadFault { address: u32, message: String },

    #[error("Platform call failed: {0}")]
    Platform(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn read_fault(address: u32, message: impl Into<String>) -> Self {
        Error::ReadFault {
            address,
            message: message.into(),
        }
    }
}
