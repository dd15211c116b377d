use crate::locator::Locator;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to guarantee a file exists with the expected shape and permissions.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Unable to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Invalid file name: {name:?}")]
    InvalidName { name: String },

    #[error("Unable to create file {}: {source}", path.display())]
    CreateFile { path: PathBuf, source: io::Error },

    #[error("Not a regular file: {}", path.display())]
    NotAFile { path: PathBuf },

    #[error("Can't set read and/or write permission on {}: {source}", path.display())]
    Permissions { path: PathBuf, source: io::Error },
}

/// Failure while moving bytes between two locators.
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("Unresolvable locator: {0}")]
    Unresolvable(Locator),

    #[error("Unable to open {locator} for reading: {source}")]
    OpenSource { locator: Locator, source: io::Error },

    #[error("Unable to open {locator} for writing: {source}")]
    OpenDestination { locator: Locator, source: io::Error },

    #[error("Read failed after {copied} bytes: {source}")]
    Read { copied: u64, source: io::Error },

    #[error("Write failed after {copied} bytes: {source}")]
    Write { copied: u64, source: io::Error },

    #[error("Copy cancelled after {copied} bytes")]
    Cancelled { copied: u64 },

    #[error("Unable to start copy worker: {0}")]
    Spawn(#[source] io::Error),

    #[error("Copy worker exited without reporting")]
    WorkerLost,
}

#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("Malformed locator {input:?}: {reason}")]
    Parse { input: String, reason: String },

    #[error("{} is not inside any root of authority {authority}", path.display())]
    OutsideRoots { path: PathBuf, authority: String },

    #[error("Locator {0} was not issued by this authority")]
    UnknownAuthority(Locator),

    #[error("Locator {0} names an unknown root")]
    UnknownRoot(Locator),

    #[error("Locator {0} contains an invalid path segment")]
    InvalidSegment(Locator),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FlowError {
    #[error("Nothing staged yet: pick a file first")]
    NothingStaged,

    #[error("Nothing saved yet: save a staged file first")]
    NothingSaved,

    #[error("A copy is already in progress")]
    Busy,

    #[error("Received a pick result without a pending pick")]
    UnexpectedPickResult,
}

#[derive(Error, Debug)]
pub enum PicstashError {
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Copy(#[from] CopyError),

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, PicstashError>;
