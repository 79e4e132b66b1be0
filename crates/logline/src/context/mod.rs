//! Context module — ambient, request-scoped metadata attached to every event.

pub mod cache;
pub mod store;

pub use cache::CacheStats;
pub use store::{
    bind, bind_value, cache_stats, clear, context_tag, correlation_id, get, get_or, in_task_scope,
    is_writable, read, scope, sync_scope,
};
