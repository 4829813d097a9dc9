//! Run-scoped mutable state threaded explicitly into every traversal.
//!
//! The ExecutionContext is the only sanctioned channel for a rewrite rule to
//! communicate across cycles or across units within one run. It is created
//! by the engine at run start and discarded at run end; it is never a
//! process-wide singleton, so concurrent runs cannot interfere.

use crate::collections::ConcurrentMap;
use crate::diagnostics::Diagnostic;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Type-erased message payload. Values are shared, not copied, so a large
/// payload can be peeked cheaply across cycles.
#[derive(Clone)]
pub struct MessageValue {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl MessageValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn downcast<T: Any + Send + Sync>(self) -> Option<Arc<T>> {
        self.value.downcast::<T>().ok()
    }

    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl Debug for MessageValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MessageValue<{}>", self.type_name)
    }
}

pub struct ExecutionContext {
    cycle: AtomicUsize,
    messages: ConcurrentMap<String, MessageValue>,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            cycle: AtomicUsize::new(0),
            messages: ConcurrentMap::new(),
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    /// Number of completed cycles. Starts at 0; the engine increments it
    /// once per finished cycle.
    pub fn cycle(&self) -> usize {
        self.cycle.load(Ordering::Acquire)
    }

    /// Engine-driven; rules only read the counter.
    pub fn increment_cycle(&self) -> usize {
        self.cycle.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Store a message, overwriting any previous value under the key.
    pub fn put_message<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.messages.insert(key.into(), MessageValue::new(value));
    }

    /// Peeking read: the value stays in place.
    pub fn get_message<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.messages
            .get_cloned(&key.to_string())
            .and_then(MessageValue::downcast)
    }

    /// Consuming read: the value is removed, so a second poll with no
    /// intervening put returns `None`. A poll under the wrong type reads as
    /// absent and leaves the message in place.
    pub fn poll_message<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let key = key.to_string();
        let value = self.messages.get_cloned(&key)?.downcast::<T>()?;
        self.messages.remove(&key);
        Some(value)
    }

    pub fn has_message(&self, key: &str) -> bool {
        self.messages.contains_key(&key.to_string())
    }

    /// Keys of messages nobody consumed; reported in the RunResult for
    /// diagnostics and tests.
    pub fn message_keys(&self) -> Vec<String> {
        self.messages.keys()
    }

    pub fn add_diagnostic(&self, diagnostic: Diagnostic) {
        match self.diagnostics.lock() {
            Ok(mut diagnostics) => diagnostics.push(diagnostic),
            Err(poison) => poison.into_inner().push(diagnostic),
        }
    }

    pub fn drain_diagnostics(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(mut diagnostics) => std::mem::take(&mut *diagnostics),
            Err(poison) => std::mem::take(&mut *poison.into_inner()),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
