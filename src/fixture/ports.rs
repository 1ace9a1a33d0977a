use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::foundation::error::BuildError;
use crate::foundation::ids::PipeId;
use crate::stream::registry::StreamType;

/// Output point of the model where a render engine delivers its result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelPort {
    pub pipe: PipeId,
    pub label: Arc<str>,
    pub stream_type: StreamType,
}

type PortTable = BTreeMap<PipeId, ModelPort>;

#[derive(Debug, Default)]
struct Ports {
    published: Arc<PortTable>,
    transaction: PortTable,
}

/// Transactional registry of model ports.
///
/// A build defines ports into an open transaction; `commit` publishes it and opens the next
/// transaction as a copy of what was published, `rollback` discards it.
#[derive(Debug, Default)]
pub struct ModelPortRegistry {
    inner: Mutex<Ports>,
}

impl ModelPortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_port(
        &self,
        pipe: PipeId,
        label: &str,
        stream_type: StreamType,
    ) -> Result<ModelPort, BuildError> {
        let mut ports = self.inner.lock();
        if ports.transaction.contains_key(&pipe) {
            return Err(BuildError::DuplicatePort(pipe));
        }
        let port = ModelPort {
            pipe,
            label: Arc::from(label),
            stream_type,
        };
        ports.transaction.insert(pipe, port.clone());
        Ok(port)
    }

    pub fn remove(&self, pipe: PipeId) {
        self.inner.lock().transaction.remove(&pipe);
    }

    /// Empty the open transaction.
    pub fn clear(&self) {
        self.inner.lock().transaction.clear();
    }

    pub fn commit(&self) {
        let mut ports = self.inner.lock();
        let next = ports.transaction.clone();
        let committed = std::mem::replace(&mut ports.transaction, next);
        ports.published = Arc::new(committed);
        tracing::trace!(ports = ports.published.len(), "committed model ports");
    }

    pub fn rollback(&self) {
        let mut ports = self.inner.lock();
        ports.transaction = PortTable::clone(&ports.published);
        tracing::trace!("discarded model port transaction");
    }

    /// `true` if `pipe` is defined in the open transaction.
    pub fn contains(&self, pipe: PipeId) -> bool {
        self.inner.lock().transaction.contains_key(&pipe)
    }

    /// `true` if `pipe` is published.
    pub fn is_registered(&self, pipe: PipeId) -> bool {
        self.inner.lock().published.contains_key(&pipe)
    }

    pub fn get(&self, pipe: PipeId) -> Result<ModelPort, BuildError> {
        self.inner
            .lock()
            .published
            .get(&pipe)
            .cloned()
            .ok_or(BuildError::UnknownPort(pipe))
    }

    /// Snapshot of all published ports, ordered by pipe.
    pub fn published(&self) -> Arc<BTreeMap<PipeId, ModelPort>> {
        Arc::clone(&self.inner.lock().published)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fixture/ports.rs"]
mod tests;
