//! Family name interning.
//!
//! Family names are mapped to dense sequential ids so they can be packed
//! into a [`FontKey`](crate::font::key::FontKey). The table is append-only.

use std::collections::HashMap;
use std::sync::Arc;

use crate::font::FontError;

/// Interned family name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FamilyId(u32);

impl FamilyId {
    /// Builds an id from its raw value. The id only means something to the
    /// interner that produced it.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Id for the `index`-th interned name; `None` past `u32::MAX`.
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }
}

/// Bidirectional `name <-> FamilyId` table.
#[derive(Debug, Default)]
pub struct FamilyInterner {
    names: Vec<Arc<str>>,
    lookup: HashMap<Arc<str>, FamilyId>,
}

impl FamilyInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, allocating the next one on first use.
    ///
    /// Fails once every `u32` id has been handed out.
    pub fn intern(&mut self, name: &str) -> Result<FamilyId, FontError> {
        if let Some(&id) = self.lookup.get(name) {
            return Ok(id);
        }

        let id = FamilyId::from_index(self.names.len())
            .ok_or(FontError::TooManyFamilies(self.names.len()))?;
        let name: Arc<str> = name.into();
        self.names.push(Arc::clone(&name));
        self.lookup.insert(name, id);
        Ok(id)
    }

    /// Looks a name up without interning it.
    pub fn get(&self, name: &str) -> Option<FamilyId> {
        self.lookup.get(name).copied()
    }

    pub fn name(&self, id: FamilyId) -> Option<&str> {
        self.names.get(id.0 as usize).map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Interned families in id order.
    pub fn iter(&self) -> impl Iterator<Item = (FamilyId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (FamilyId(i as u32), name.as_ref())) // bounded by `intern`
    }
}
