pub mod queries;
pub mod reorder;
pub mod tree;
pub mod types;

pub use queries::*;
pub use reorder::{apply_reorder, reorder};
pub use tree::{MenuNode, build_tree, filter_for_role, flatten};
pub use types::*;
