pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{collapse_duplicated_scheme, host_of, is_valid_url, sanitize_domain};
