// Service exports
pub mod cache;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod supabase;

pub use cache::{CacheManager, CacheKey, CacheError, CacheStats};
pub use session::{SessionClaims, SessionError, SessionVerifier};
pub use snapshot::SnapshotLoader;
pub use store::{InMemoryStore, ProfileStore, StoreError};
pub use supabase::{SupabaseClient, SupabaseTables};
