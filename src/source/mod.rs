pub mod http_client;
pub mod memory;
pub mod postgrest;
pub mod realtime;
pub mod supabase;
pub mod traits;

pub use memory::MemoryVersionSource;
pub use postgrest::PostgrestVersionFetcher;
pub use realtime::RealtimeFeed;
pub use supabase::SupabaseVersionSource;
pub use traits::{
    InsertNotice, InsertReceiver, InsertSender, InsertSubscription, VersionSource, insert_bus,
};
