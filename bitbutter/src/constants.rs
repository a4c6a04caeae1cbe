use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Env values used by the bitbutter client.
pub const BB_ENDPOINT: &str = "BB_ENDPOINT";
pub const BB_API_VERSION: &str = "BB_API_VERSION";
pub const BB_API_KEY: &str = "BB_API_KEY";
pub const BB_SECRET: &str = "BB_SECRET";
pub const BB_PARTNER_ID: &str = "BB_PARTNER_ID";
pub const BB_PARTNERSHIP_ID: &str = "BB_PARTNERSHIP_ID";
pub const BB_USER_ID: &str = "BB_USER_ID";

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000";
pub const DEFAULT_VERSION: &str = "1";

/// AsciiSet for ids placed in a single path segment.
///
/// Encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
pub static PATH_SEGMENT_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
