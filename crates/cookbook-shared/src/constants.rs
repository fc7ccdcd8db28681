/// Permission level stored for ordinary accounts
pub const STANDARD_PERMISSION_LEVEL: i64 = 1;

/// Permission level that grants deleting any recipe
pub const ELEVATED_PERMISSION_LEVEL: i64 = 2;

/// Minimum password length, counted in characters
pub const MIN_PASSWORD_LEN: usize = 4;

/// Layout of `created_at` both in SQLite and on the wire
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default HTTP API port
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Maximum uploaded photo size in bytes (10 MiB)
pub const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

/// Photo extensions accepted by the upload endpoint
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// URL prefix under which uploaded photos are served
pub const UPLOADS_ROUTE: &str = "/uploads";
