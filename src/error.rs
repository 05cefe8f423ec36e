use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChurnError>;

#[derive(Error, Debug)]
pub enum ChurnError {
    #[error("Could not open repository at {}: {source}", path.display())]
    RepositoryOpen {
        path: PathBuf,
        #[source]
        source: Box<gix::open::Error>,
    },
    #[error("Diff computation failed: {0}")]
    DiffCompute(String),
    #[error("Malformed log record on line {line}: {reason}")]
    RecordParse { line: usize, reason: String },
    #[error("Cannot write log store {}: {source}", path.display())]
    OutputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Git error: {0}")]
    Git(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Other: {0}")]
    Other(String),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
}

impl ChurnError {
    /// Only a broken output sink stops a scan; everything else is per-item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ChurnError::OutputIo { .. })
    }
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::object::find::existing::Error> for ChurnError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        ChurnError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for ChurnError {
    fn from(err: gix::object::commit::Error) -> Self {
        ChurnError::Commit(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for ChurnError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        ChurnError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for ChurnError {
    fn from(err: gix::objs::decode::Error) -> Self {
        ChurnError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for ChurnError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        ChurnError::DiffTreeToTree(Box::new(err))
    }
}
