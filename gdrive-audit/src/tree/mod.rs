mod clone;
mod descend;
mod lister;
pub mod model;
pub mod pagination;
#[cfg(test)]
pub(crate) mod test_support;
mod walker;

pub use model::{CloneOutcome, CloneSummary, Descent, FileRef, FolderNode, TreeSnapshot};
pub use walker::{TreeError, TreeWalker};
