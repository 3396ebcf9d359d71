use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackfillError>;

#[derive(Error, Debug)]
pub enum BackfillError {
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Git query failed: {0}")]
    VcsQuery(String),
    #[error("Working tree has uncommitted changes:\n{0}")]
    DirtyWorkingTree(String),
    #[error("Expected to be on branch '{expected}', found '{found}'")]
    WrongBranch { expected: String, found: String },
    #[error("Failed to restore working tree: {0}")]
    Restore(String),
    #[error("Malformed timestamp: '{0}'")]
    MalformedTimestamp(String),
    #[error("Merge command failed: {0}")]
    MergeCommand(String),
    #[error("Config error in {path}: {message}")]
    Config { path: String, message: String },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid data: {0}")]
    Invalid(String),
}

// gix errors are large; they are boxed behind these conversions
impl From<gix::discover::Error> for BackfillError {
    fn from(err: gix::discover::Error) -> Self {
        BackfillError::GitDiscover(Box::new(err))
    }
}

impl From<gix::object::find::existing::Error> for BackfillError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        BackfillError::ObjectFind(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for BackfillError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        BackfillError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for BackfillError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        BackfillError::HeadPeel(Box::new(err))
    }
}
