//! Pin groups

use core::ops::{Index, IndexMut};

use gpiomux_core::Indexing;
use heapless::Vec;

/// Most pins one request can open
pub const MAX_GROUP_PINS: usize = 40;

/// Handles opened by one multi-pin request
///
/// Indexed by position (`Indexing::Sequential`) or by header pin
/// (`Indexing::Pin`).
pub struct PinGroup<H> {
    indexing: Indexing,
    handles: Vec<(u8, H), MAX_GROUP_PINS>,
}

impl<H> PinGroup<H> {
    pub(crate) fn new(indexing: Indexing) -> Self {
        Self {
            indexing,
            handles: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, label: u8, handle: H) {
        // Capacity is checked before any pin is opened
        let _ = self.handles.push((label, handle));
    }

    /// Indexing scheme
    pub fn indexing(&self) -> Indexing {
        self.indexing
    }

    /// Number of handles
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if the group holds no handles
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handle with this index label
    pub fn get(&self, index: u8) -> Option<&H> {
        self.handles
            .iter()
            .find(|(label, _)| *label == index)
            .map(|(_, h)| h)
    }

    /// Mutable handle with this index label
    pub fn get_mut(&mut self, index: u8) -> Option<&mut H> {
        self.handles
            .iter_mut()
            .find(|(label, _)| *label == index)
            .map(|(_, h)| h)
    }

    /// Index labels in request order
    pub fn labels(&self) -> impl Iterator<Item = u8> + '_ {
        self.handles.iter().map(|(label, _)| *label)
    }

    /// `(label, handle)` pairs in request order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &H)> {
        self.handles.iter().map(|(label, h)| (*label, h))
    }

    /// Mutable `(label, handle)` pairs in request order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u8, &mut H)> {
        self.handles.iter_mut().map(|(label, h)| (*label, h))
    }

    /// Take the handles out of the group
    pub fn into_handles(self) -> impl Iterator<Item = H> {
        self.handles.into_iter().map(|(_, h)| h)
    }
}

impl<H> Index<u8> for PinGroup<H> {
    type Output = H;

    fn index(&self, index: u8) -> &H {
        match self.get(index) {
            Some(h) => h,
            None => panic!("no handle with index {}", index),
        }
    }
}

impl<H> IndexMut<u8> for PinGroup<H> {
    fn index_mut(&mut self, index: u8) -> &mut H {
        match self.get_mut(index) {
            Some(h) => h,
            None => panic!("no handle with index {}", index),
        }
    }
}
