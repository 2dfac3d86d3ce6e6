//! Offline mirror output
//!
//! Layout under the storage directory:
//! `pages/<stem>.html` for accepted pages and `assets/images/img<seq>_<hash>.<ext>`
//! for their images, referenced from pages as `../assets/images/...`.

pub mod link_check;
pub mod link_rewriter;
pub mod naming;
pub mod writer;

pub use link_check::{BrokenLink, check_mirror_links};
pub use link_rewriter::{LinkRewriter, RewriteStats};
pub use naming::{asset_filename, page_filename, page_stem};
pub use writer::{MirrorWriter, MirroredPage};
