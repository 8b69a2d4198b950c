/// URL prefix under which stored uploads are served.
pub const STATIC_URL_PREFIX: &str = "/static";

/// Upper bound on name probes for one upload.
pub const MAX_NAME_ATTEMPTS: u32 = 10_000;
