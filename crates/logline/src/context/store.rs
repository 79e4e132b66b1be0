//! Store — ambient key/value context for the current unit of work.
//!
//! Outside any explicit scope and outside a tokio runtime the context is
//! thread-local. `scope` and `sync_scope` run work inside a task-local scope
//! seeded with a copy of the caller's context; every operation inside it
//! touches only that copy.
//!
//! Inside a tokio runtime, tasks share worker threads, so the thread-local
//! context is off limits there: code running in a runtime without a
//! `scope` reads an empty context and its binds are dropped with a warning.

use std::cell::RefCell;
use std::future::Future;

use serde_json::{Map, Value};

use super::cache::{CacheStats, LookupCache};
use crate::format::display_value;
use crate::model::keys;
use crate::{DEFAULT_CONTEXT, DEFAULT_CORRELATION_ID};

#[derive(Debug, Default)]
struct Scope {
    fields: Map<String, Value>,
    /// Bumped on every bind/clear; tags cache entries
    generation: u64,
    cache: LookupCache,
}

impl Scope {
    fn seeded(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    fn bind(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            self.fields.insert(key, value);
        }
        self.generation += 1;
    }

    fn clear(&mut self) {
        self.fields.clear();
        self.generation += 1;
    }

    fn get_or(&mut self, key: &str, default: &str) -> String {
        if let Some(cached) = self.cache.get(key, self.generation) {
            return cached;
        }
        match self.fields.get(key) {
            Some(value) => {
                let rendered = display_value(value);
                self.cache.insert(key, self.generation, rendered.clone());
                rendered
            }
            None => default.to_string(),
        }
    }
}

thread_local! {
    static THREAD_SCOPE: RefCell<Scope> = RefCell::new(Scope::default());
}

tokio::task_local! {
    static TASK_SCOPE: RefCell<Scope>;
}

fn with_scope<R>(f: impl FnOnce(&mut Scope) -> R) -> R {
    if in_task_scope() {
        TASK_SCOPE.with(|cell| f(&mut cell.borrow_mut()))
    } else if in_runtime() {
        // Unscoped task on a shared worker thread: sees nothing, keeps nothing
        f(&mut Scope::default())
    } else {
        THREAD_SCOPE.with(|cell| f(&mut cell.borrow_mut()))
    }
}

/// True when called from inside `scope` / `sync_scope`.
pub fn in_task_scope() -> bool {
    TASK_SCOPE.try_with(|_| ()).is_ok()
}

fn in_runtime() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}

/// True when `bind` / `clear` would take effect here.
///
/// False only inside a tokio runtime outside any `scope` / `sync_scope`.
pub fn is_writable() -> bool {
    in_task_scope() || !in_runtime()
}

fn check_writable(op: &'static str) -> bool {
    let writable = is_writable();
    if !writable {
        tracing::warn!(
            op,
            "Ambient context write outside context::scope inside a tokio runtime, ignored"
        );
    }
    writable
}

/// Merge `fields` into the current context. Existing keys are overwritten.
///
/// Inside a tokio runtime this must run within [`scope`] (or
/// [`sync_scope`]); otherwise the call is ignored and a warning is logged.
pub fn bind<I, K, V>(fields: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let fields: Map<String, Value> = fields
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    if check_writable("bind") {
        with_scope(|scope| scope.bind(fields));
    }
}

pub fn bind_value(key: impl Into<String>, value: impl Into<Value>) {
    let key: String = key.into();
    let value: Value = value.into();
    bind([(key, value)]);
}

/// Snapshot of the current context.
pub fn read() -> Map<String, Value> {
    with_scope(|scope| scope.fields.clone())
}

/// Remove every key from the current context. Idempotent.
pub fn clear() {
    if check_writable("clear") {
        with_scope(|scope| scope.clear());
    }
}

pub fn get(key: &str) -> Option<Value> {
    with_scope(|scope| scope.fields.get(key).cloned())
}

/// Stringified value for `key`, or `default` when unset.
pub fn get_or(key: &str, default: &str) -> String {
    with_scope(|scope| scope.get_or(key, default))
}

/// Bound correlation id, or `"unknown"`.
pub fn correlation_id() -> String {
    get_or(keys::CORRELATION_ID, DEFAULT_CORRELATION_ID)
}

/// Bound context tag, or `"default"`.
pub fn context_tag() -> String {
    get_or(keys::CONTEXT, DEFAULT_CONTEXT)
}

pub fn cache_stats() -> CacheStats {
    with_scope(|scope| scope.cache.stats())
}

/// Run `future` in its own scope, seeded with a copy of the current context.
///
/// Binds and clears inside the future never reach the caller, other tasks,
/// or the worker thread's own context.
pub fn scope<F>(future: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    let seed = read();
    TASK_SCOPE.scope(RefCell::new(Scope::seeded(seed)), future)
}

/// Synchronous counterpart of [`scope`].
pub fn sync_scope<R>(f: impl FnOnce() -> R) -> R {
    let seed = read();
    TASK_SCOPE.sync_scope(RefCell::new(Scope::seeded(seed)), f)
}
