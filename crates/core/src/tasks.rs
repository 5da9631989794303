//! Keyed task list.
//!
//! Tasks are addressed by a [`TaskKey`] for the duration of an editing
//! session so that edits never depend on `order`, which is rewritten on every
//! mutation. After any mutation each task's `order` equals its index.

use crate::error::CoreError;
use crate::template::Task;
use crate::types::{order_at, TaskKey};

#[derive(Debug, Clone, PartialEq)]
pub struct KeyedTask {
    pub key: TaskKey,
    pub task: Task,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    entries: Vec<KeyedTask>,
}

impl TaskList {
    /// Build from persisted tasks, sorted by their stored `order`.
    pub fn from_tasks(mut tasks: Vec<Task>) -> Self {
        tasks.sort_by_key(|t| t.order);
        let mut list = Self {
            entries: tasks
                .into_iter()
                .map(|task| KeyedTask {
                    key: TaskKey::new(),
                    task,
                })
                .collect(),
        };
        list.reorder();
        list
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyedTask> {
        self.entries.iter()
    }

    pub fn get(&self, key: TaskKey) -> Option<&Task> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.task)
    }

    pub fn position(&self, key: TaskKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    /// The `order` a newly appended task will receive.
    pub fn next_order(&self) -> u32 {
        order_at(self.entries.len())
    }

    /// Append a task at the end of the list.
    pub fn push(&mut self, mut task: Task) -> TaskKey {
        task.order = self.next_order();
        let key = TaskKey::new();
        self.entries.push(KeyedTask { key, task });
        key
    }

    /// Replace the task identified by `key`, keeping its position.
    pub fn replace(&mut self, key: TaskKey, mut task: Task) -> Result<(), CoreError> {
        let index = self.position(key).ok_or_else(|| CoreError::NotFound {
            entity: "task",
            key: key.to_string(),
        })?;
        task.order = order_at(index);
        self.entries[index].task = task;
        Ok(())
    }

    /// Remove the task identified by `key` and close the gap.
    pub fn remove(&mut self, key: TaskKey) -> Option<Task> {
        let index = self.position(key)?;
        let removed = self.entries.remove(index);
        self.reorder();
        Some(removed.task)
    }

    /// Move the task at `from` so that it ends up at position `to`.
    pub fn move_task(&mut self, from: usize, to: usize) -> Result<(), CoreError> {
        let len = self.entries.len();
        if from >= len || to >= len {
            return Err(CoreError::Validation(format!(
                "Cannot move task from {from} to {to}: list has {len} entries"
            )));
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.reorder();
        Ok(())
    }

    /// Rewrite every task's `order` as its current index.
    pub fn reorder(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.task.order = order_at(index);
        }
    }

    /// The tasks in list order, as persisted.
    pub fn to_tasks(&self) -> Vec<Task> {
        self.entries.iter().map(|e| e.task.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;

    fn titles(list: &TaskList) -> Vec<String> {
        list.iter().map(|e| e.task.title.clone()).collect()
    }

    fn assert_contiguous(list: &TaskList) {
        for (index, entry) in list.iter().enumerate() {
            assert_eq!(entry.task.order, index as u32);
        }
    }

    #[test]
    fn from_tasks_sorts_and_normalizes() {
        let list = TaskList::from_tasks(vec![
            Task::titled("third", 7),
            Task::titled("first", 0),
            Task::titled("second", 3),
        ]);
        assert_eq!(titles(&list), ["first", "second", "third"]);
        assert_contiguous(&list);
    }

    #[test]
    fn push_appends_with_next_order() {
        let mut list = TaskList::default();
        assert_eq!(list.next_order(), 0);
        list.push(Task::titled("a", 99));
        list.push(Task::titled("b", 99));
        assert_eq!(titles(&list), ["a", "b"]);
        assert_contiguous(&list);
    }

    #[test]
    fn replace_targets_key_not_order() {
        let mut list = TaskList::default();
        let a = list.push(Task::titled("a", 0));
        list.push(Task::titled("b", 0));

        // The replacement claims order 1 but must land on `a`.
        list.replace(a, Task::titled("a2", 1)).unwrap();
        assert_eq!(titles(&list), ["a2", "b"]);
        assert_contiguous(&list);
    }

    #[test]
    fn replace_unknown_key_fails() {
        let mut list = TaskList::default();
        assert_matches!(
            list.replace(TaskKey::new(), Task::default()),
            Err(CoreError::NotFound { entity: "task", .. })
        );
    }

    #[test]
    fn remove_closes_gap() {
        let mut list = TaskList::default();
        list.push(Task::titled("a", 0));
        let b = list.push(Task::titled("b", 0));
        list.push(Task::titled("c", 0));

        let removed = list.remove(b).unwrap();
        assert_eq!(removed.title, "b");
        assert_eq!(titles(&list), ["a", "c"]);
        assert_contiguous(&list);
        assert!(list.remove(b).is_none());
    }

    #[test]
    fn move_task_out_of_range() {
        let mut list = TaskList::default();
        list.push(Task::titled("a", 0));
        assert_matches!(list.move_task(0, 1), Err(CoreError::Validation(_)));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        Remove(usize),
        Move(usize, usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Add),
            (0usize..8).prop_map(Op::Remove),
            (0usize..8, 0usize..8).prop_map(|(a, b)| Op::Move(a, b)),
        ]
    }

    proptest! {
        /// After any add/remove/move every task's order equals its index.
        #[test]
        fn orders_match_indices(ops in prop::collection::vec(op_strategy(), 0..50)) {
            let mut list = TaskList::default();
            for (n, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Add => { list.push(Task::titled(format!("t{n}"), 1000)); }
                    Op::Remove(i) => {
                        let key = list.iter().nth(i).map(|e| e.key);
                        if let Some(key) = key {
                            list.remove(key);
                        }
                    }
                    Op::Move(from, to) => { let _ = list.move_task(from, to); }
                }
                for (index, entry) in list.iter().enumerate() {
                    prop_assert_eq!(entry.task.order, index as u32);
                }
            }
        }
    }
}
