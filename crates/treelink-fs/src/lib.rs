//! Filesystem layer for treelink
//!
//! Answers questions about on-disk link state without ever failing, and
//! provides the small set of mutating primitives (directory chains,
//! symbolic links, unlinking) that the reconciler is built from.

pub mod constants;
pub mod error;
pub mod io;
pub mod link;
pub mod path;
pub mod walk;

pub use constants::{CONFIG_FILE_NAME, SKIP_DIR_NAMES};
pub use error::{Error, FsOperation, Result};
pub use link::{
    LinkState, inspect, is_valid_link, link_destination, points_to, resolves_within, same_entry,
};
pub use path::{NormalizedPath, lexical_normalize, relative_link_text};
pub use walk::find_symlinks;
