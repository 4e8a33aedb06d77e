use crate::models::GenerationResponse;
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 6;

/// Session-only list of recent generations, newest first.
#[derive(Debug, Clone, Default)]
pub struct GenerationHistory {
    entries: VecDeque<GenerationResponse>,
}

impl GenerationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts at the front and evicts the oldest entry past capacity.
    pub fn push(&mut self, response: GenerationResponse) {
        self.entries.push_front(response);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn latest(&self) -> Option<&GenerationResponse> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GenerationResponse> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
