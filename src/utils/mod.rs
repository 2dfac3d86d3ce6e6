pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{
    UrlNormalizer, is_directory_section, is_navigable_href, leaf_of, page_number_of, section_of,
};
