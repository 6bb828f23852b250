pub mod compare;
pub mod record;

pub use compare::{compare, is_newer, parse_segment};
pub use record::VersionRecord;
