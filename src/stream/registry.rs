use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::foundation::ids::StreamTypeId;
use crate::stream::conversion::{Conversion, ConversionRule, StructuralConversions};
use crate::stream::descriptor::{MediaKind, StreamDescriptor};

/// Interned stream type handle.
///
/// Handles compare by value: two handles are equal iff their descriptors are equal. Within one
/// registry this is the same as comparing ids.
#[derive(Clone)]
pub struct StreamType {
    id: StreamTypeId,
    desc: Arc<StreamDescriptor>,
}

impl StreamType {
    pub fn id(&self) -> StreamTypeId {
        self.id
    }

    pub fn descriptor(&self) -> &StreamDescriptor {
        &self.desc
    }

    pub fn kind(&self) -> MediaKind {
        self.desc.kind()
    }
}

impl PartialEq for StreamType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.desc, &other.desc) || self.desc == other.desc
    }
}

impl Eq for StreamType {}

impl Hash for StreamType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.desc.hash(state);
    }
}

impl fmt::Debug for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamType(T{} {})", self.id.0, self.desc)
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.desc, f)
    }
}

#[derive(Debug, Default)]
struct Table {
    ids_by_desc: HashMap<Arc<StreamDescriptor>, StreamTypeId>,
    types: Vec<StreamType>,
    // conversions[from][to], square, grown on every insert.
    conversions: Vec<Vec<Option<Conversion>>>,
}

impl Table {
    fn slot(&self, ty: &StreamType) -> Option<usize> {
        let i = ty.id.0 as usize;
        self.types.get(i).filter(|t| *t == ty).map(|_| i)
    }
}

/// Append-only interning table for stream types with a precomputed conversion matrix.
///
/// Classification of an unseen descriptor computes its conversions against every type already
/// interned, so `compatible` and `conversion_cost` are plain table lookups afterwards. Entries are
/// never evicted.
#[derive(Debug)]
pub struct StreamTypeRegistry {
    table: RwLock<Table>,
    rules: Vec<Box<dyn ConversionRule>>,
}

impl Default for StreamTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamTypeRegistry {
    /// Registry with the built-in structural conversions only.
    pub fn new() -> Self {
        Self::with_rules(vec![Box::new(StructuralConversions)])
    }

    pub fn with_rules(rules: Vec<Box<dyn ConversionRule>>) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            rules,
        }
    }

    /// The process-wide registry.
    pub fn global() -> Arc<StreamTypeRegistry> {
        static GLOBAL: OnceLock<Arc<StreamTypeRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(StreamTypeRegistry::new()))
            .clone()
    }

    /// Return the interned handle for `desc`, interning it on first sight.
    pub fn classify(&self, desc: &StreamDescriptor) -> StreamType {
        if let Some(ty) = self.lookup(desc) {
            return ty;
        }

        let mut table = self.table.write();
        // Another thread may have interned it between the read and the write lock.
        if let Some(&id) = table.ids_by_desc.get(desc) {
            return table.types[id.0 as usize].clone();
        }

        let id = StreamTypeId(table.types.len() as u32);
        let desc = Arc::new(desc.clone());
        let ty = StreamType {
            id,
            desc: Arc::clone(&desc),
        };

        let mut row: Vec<Option<Conversion>> = table
            .types
            .iter()
            .map(|other| self.plan(&desc, other.descriptor()))
            .collect();
        row.push(Some(Conversion::identity()));
        let column: Vec<Option<Conversion>> = table
            .types
            .iter()
            .map(|other| self.plan(other.descriptor(), &desc))
            .collect();
        for (existing, c) in table.conversions.iter_mut().zip(column) {
            existing.push(c);
        }
        table.conversions.push(row);
        table.types.push(ty.clone());
        table.ids_by_desc.insert(desc, id);

        tracing::debug!(id = id.0, descriptor = %ty, "interned stream type");
        ty
    }

    /// Handle for an already interned descriptor, without interning.
    pub fn lookup(&self, desc: &StreamDescriptor) -> Option<StreamType> {
        let table = self.table.read();
        table
            .ids_by_desc
            .get(desc)
            .map(|id| table.types[id.0 as usize].clone())
    }

    pub fn get(&self, id: StreamTypeId) -> Option<StreamType> {
        self.table.read().types.get(id.0 as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.table.read().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if a conversion exists in either direction. Reflexive and symmetric.
    ///
    /// Handles not interned in this registry are never compatible.
    pub fn compatible(&self, a: &StreamType, b: &StreamType) -> bool {
        let table = self.table.read();
        let (Some(i), Some(j)) = (table.slot(a), table.slot(b)) else {
            return false;
        };
        table.conversions[i][j].is_some() || table.conversions[j][i].is_some()
    }

    /// Cheapest known conversion from `from` to `to`.
    pub fn conversion(&self, from: &StreamType, to: &StreamType) -> Option<Conversion> {
        let table = self.table.read();
        let (i, j) = (table.slot(from)?, table.slot(to)?);
        table.conversions[i][j].clone()
    }

    /// Cost of the cheapest conversion, `None` when unsupported.
    pub fn conversion_cost(&self, from: &StreamType, to: &StreamType) -> Option<u32> {
        let table = self.table.read();
        let (i, j) = (table.slot(from)?, table.slot(to)?);
        table.conversions[i][j].as_ref().map(Conversion::cost)
    }

    fn plan(&self, from: &StreamDescriptor, to: &StreamDescriptor) -> Option<Conversion> {
        if from == to {
            return Some(Conversion::identity());
        }
        self.rules
            .iter()
            .filter_map(|rule| rule.plan(from, to))
            .min_by_key(Conversion::cost)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stream/registry.rs"]
mod tests;
