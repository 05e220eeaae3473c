//! # Command History
//!
//! Linear undo/redo log. Entries before the cursor are applied; entries
//! after it are redoable. Executing a new command discards the redoable
//! tail, so there is never more than one future.

/// A reversible action on some target state.
///
/// `apply` and `inverse` are infallible. A command carries everything it
/// needs to move the target in both directions.
pub trait Command {
    type Target;

    fn apply(&self, target: &mut Self::Target);

    fn inverse(&self, target: &mut Self::Target);

    /// Human readable label for menus and logs.
    fn description(&self) -> String;
}

/// Undo/redo log with a single cursor.
#[derive(Debug, Clone)]
pub struct CommandHistory<C> {
    entries: Vec<C>,
    /// Index of the last applied entry; `None` when nothing is applied
    cursor: Option<usize>,
    /// 0 means unbounded
    max_depth: usize,
}

impl<C> Default for CommandHistory<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CommandHistory<C> {
    pub fn new() -> Self {
        Self::with_max_depth(0)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            max_depth,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        match self.cursor {
            Some(cursor) => cursor + 1 < self.entries.len(),
            None => !self.entries.is_empty(),
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[C] {
        &self.entries
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    fn next_index(&self) -> usize {
        self.cursor.map_or(0, |c| c + 1)
    }
}

impl<C: Command> CommandHistory<C> {
    /// Apply `command` and record it, discarding any redoable entries.
    pub fn execute(&mut self, command: C, target: &mut C::Target) {
        command.apply(target);
        tracing::debug!(command = %command.description(), "executed command");

        self.entries.truncate(self.next_index());
        self.entries.push(command);
        self.cursor = Some(self.entries.len() - 1);

        if self.max_depth > 0 && self.entries.len() > self.max_depth {
            let excess = self.entries.len() - self.max_depth;
            self.entries.drain(..excess);
            self.cursor = Some(self.entries.len() - 1);
        }
    }

    /// Revert the entry under the cursor. Returns false when nothing to undo.
    pub fn undo(&mut self, target: &mut C::Target) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        let command = &self.entries[cursor];
        command.inverse(target);
        tracing::debug!(command = %command.description(), "undid command");
        self.cursor = cursor.checked_sub(1);
        true
    }

    /// Re-apply the entry after the cursor. Returns false when nothing to redo.
    pub fn redo(&mut self, target: &mut C::Target) -> bool {
        if !self.can_redo() {
            return false;
        }
        let next = self.next_index();
        self.cursor = Some(next);
        let command = &self.entries[next];
        command.apply(target);
        tracing::debug!(command = %command.description(), "redid command");
        true
    }

    pub fn undo_description(&self) -> Option<String> {
        self.cursor.map(|c| self.entries[c].description())
    }

    pub fn redo_description(&self) -> Option<String> {
        if self.can_redo() {
            Some(self.entries[self.next_index()].description())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Set {
        before: i32,
        after: i32,
    }

    impl Command for Set {
        type Target = i32;

        fn apply(&self, target: &mut i32) {
            *target = self.after;
        }

        fn inverse(&self, target: &mut i32) {
            *target = self.before;
        }

        fn description(&self) -> String {
            format!("set {}", self.after)
        }
    }

    fn set(before: i32, after: i32) -> Set {
        Set { before, after }
    }

    #[test]
    fn test_empty_history() {
        let mut history = CommandHistory::<Set>::new();
        let mut value = 0;
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.undo(&mut value));
        assert!(!history.redo(&mut value));
        assert_eq!(history.cursor(), None);
        assert_eq!(history.undo_description(), None);
    }

    #[test]
    fn test_execute_undo_redo() {
        let mut history = CommandHistory::new();
        let mut value = 0;
        history.execute(set(0, 1), &mut value);
        history.execute(set(1, 2), &mut value);
        assert_eq!(value, 2);
        assert_eq!(history.undo_description().as_deref(), Some("set 2"));

        assert!(history.undo(&mut value));
        assert_eq!(value, 1);
        assert!(history.can_redo());
        assert_eq!(history.redo_description().as_deref(), Some("set 2"));

        assert!(history.undo(&mut value));
        assert_eq!(value, 0);
        assert!(!history.can_undo());

        assert!(history.redo(&mut value));
        assert!(history.redo(&mut value));
        assert_eq!(value, 2);
        assert!(!history.redo(&mut value));
    }

    #[test]
    fn test_execute_discards_redo_branch() {
        let mut history = CommandHistory::new();
        let mut value = 0;
        history.execute(set(0, 1), &mut value);
        history.execute(set(1, 2), &mut value);
        history.undo(&mut value);
        history.undo(&mut value);

        history.execute(set(0, 7), &mut value);
        assert_eq!(history.len(), 1);
        assert!(!history.can_redo());
        assert!(!history.redo(&mut value));
        assert_eq!(value, 7);
    }

    #[test]
    fn test_max_depth_drops_oldest() {
        let mut history = CommandHistory::with_max_depth(3);
        let mut value = 0;
        for i in 0..5 {
            history.execute(set(i, i + 1), &mut value);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), Some(2));
        while history.undo(&mut value) {}
        // The two oldest entries are gone, so only back to 2
        assert_eq!(value, 2);
    }

    #[test]
    fn test_clear() {
        let mut history = CommandHistory::new();
        let mut value = 0;
        history.execute(set(0, 1), &mut value);
        history.clear();
        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert_eq!(value, 1);
    }
}
