use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a run before any docset is written.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error(
        "The API folder {0:?} does not contain any index files \
         (either an index-all.html file or an index-files folder) and is not valid."
    )]
    NoIndexFiles(PathBuf),
}
