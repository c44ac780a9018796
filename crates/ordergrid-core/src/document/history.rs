use std::collections::VecDeque;

use super::sheet::Sheet;

/// Maximum number of undo entries to keep
pub const MAX_UNDO_STACK: usize = 20;

/// Both sheets of a workbook as they were before a mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub main: Sheet,
    pub truck: Sheet,
}

/// Bounded undo stack. The oldest snapshot is dropped on overflow.
#[derive(Clone, Debug)]
pub struct History {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(MAX_UNDO_STACK)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        History {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
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

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(name: &str) -> Snapshot {
        let mut main = Sheet::main();
        main.name = name.to_string();
        Snapshot {
            main,
            truck: Sheet::truck(),
        }
    }

    #[test]
    fn test_pop_is_lifo() {
        let mut history = History::new();
        history.push(snapshot("a"));
        history.push(snapshot("b"));
        assert_eq!(history.pop().map(|s| s.main.name), Some("b".to_string()));
        assert_eq!(history.pop().map(|s| s.main.name), Some("a".to_string()));
        assert!(history.pop().is_none());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::new();
        for i in 0..25 {
            history.push(snapshot(&i.to_string()));
        }
        assert_eq!(history.len(), MAX_UNDO_STACK);
        let mut last = None;
        while let Some(s) = history.pop() {
            last = Some(s.main.name);
        }
        assert_eq!(last, Some("5".to_string()));
    }
}
