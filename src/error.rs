use thiserror::Error;

use crate::NodeIndex;

pub type Result<T> = core::result::Result<T, RedwoodError>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedwoodError {
    #[error("key to be deleted not found")]
    NotFound,
    #[error("node {0} is not a live node of this tree")]
    DetachedNode(NodeIndex),
}
