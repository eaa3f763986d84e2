mod comment;
mod post;
mod tag;
mod user;

pub use comment::*;
pub use post::*;
pub use tag::*;
pub use user::*;

use chrono::{DateTime, Utc};

/// Storage format for every timestamp column. Fixed width, so text order is time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
