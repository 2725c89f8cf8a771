//! 表遍历
//!
//! Traversal follows the runtime's `next` cursor. The driver restores the
//! stack to exactly the key before each `next` call, so a visitor may push
//! freely; it must not remove the key or the value below its own pushes.

use super::State;
use crate::error::CoreError;
use crate::ffi;
use crate::value::Value;

impl State {
    /// Visit every key/value pair of the table at `table`.
    ///
    /// During a visit the key is at -2 and the value at -1. Returning `false`
    /// stops the traversal early. The top is back at its starting height when
    /// this returns, however the traversal ended.
    ///
    /// Mutating the table while it is traversed is unsupported, except for
    /// clearing fields that already exist.
    pub fn for_each_pair<F>(&mut self, table: i32, mut visit: F) -> Result<(), CoreError>
    where
        F: FnMut(&mut State) -> bool,
    {
        let t = self.table_at(table)?;
        self.ensure_stack(2)?;
        let base = self.top();
        self.push_nil();
        while unsafe { ffi::lua_next(self.raw, t) } != 0 {
            let keep_going = visit(self);
            // 只留下 key，供下一次 next 使用
            self.set_top(base + 1);
            if !keep_going {
                break;
            }
        }
        self.set_top(base);
        Ok(())
    }

    /// Snapshot of every pair, in traversal order
    pub fn collect_pairs(&mut self, table: i32) -> Result<Vec<(Value, Value)>, CoreError> {
        let mut pairs = Vec::new();
        self.for_each_pair(table, |s| {
            pairs.push((s.to_value(-2), s.to_value(-1)));
            true
        })?;
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_visits_each_key_once() {
        let mut s = State::new().unwrap();
        s.exec("t = { a = 1, b = 2, c = 3 }").unwrap();
        s.get_global("t").unwrap();
        let before = s.top();

        let mut seen = Vec::new();
        s.for_each_pair(-1, |s| {
            seen.push(s.to_string(-2).unwrap_or_default());
            true
        })
        .unwrap();

        assert_eq!(s.top(), before);
        let unique: HashSet<_> = seen.iter().cloned().collect();
        assert_eq!(seen.len(), 3);
        assert_eq!(unique, ["a", "b", "c"].iter().map(|k| k.to_string()).collect());
    }

    #[test]
    fn test_visitor_may_push() {
        let mut s = State::new().unwrap();
        s.exec("t = { 10, 20, 30 }").unwrap();
        s.get_global("t").unwrap();

        let mut sum = 0;
        s.for_each_pair(-1, |s| {
            // 额外压栈由驱动负责弹出
            s.push_value(-1);
            s.push_value(-1);
            sum += s.to_integer(-1).unwrap_or(0);
            true
        })
        .unwrap();
        assert_eq!(sum, 60);
        assert_eq!(s.top(), 1);
    }

    #[test]
    fn test_early_stop() {
        let mut s = State::new().unwrap();
        s.exec("t = { 1, 2, 3, 4 }").unwrap();
        s.get_global("t").unwrap();
        let mut visits = 0;
        s.for_each_pair(1, |_| {
            visits += 1;
            visits < 2
        })
        .unwrap();
        assert_eq!(visits, 2);
        assert_eq!(s.top(), 1);
    }

    #[test]
    fn test_empty_table() {
        let mut s = State::new().unwrap();
        s.new_table();
        let mut visits = 0;
        s.for_each_pair(-1, |_| {
            visits += 1;
            true
        })
        .unwrap();
        assert_eq!(visits, 0);
        assert_eq!(s.top(), 1);
    }

    #[test]
    fn test_numeric_keys_read_as_strings_stay_numbers() {
        let mut s = State::new().unwrap();
        s.exec("t = { 'x', 'y' }").unwrap();
        s.get_global("t").unwrap();
        let mut keys = Vec::new();
        s.for_each_pair(-1, |s| {
            keys.push(s.to_string(-2).unwrap_or_default());
            true
        })
        .unwrap();
        keys.sort();
        assert_eq!(keys, vec!["1", "2"]);
    }

    #[test]
    fn test_not_a_table() {
        let mut s = State::new().unwrap();
        s.push_string("t");
        assert!(matches!(
            s.for_each_pair(-1, |_| true),
            Err(CoreError::NotATable { .. })
        ));
        assert_eq!(s.top(), 1);
    }

    #[test]
    fn test_collect_pairs() {
        let mut s = State::new().unwrap();
        s.exec("t = { answer = 42 }").unwrap();
        s.get_global("t").unwrap();
        let pairs = s.collect_pairs(-1).unwrap();
        assert_eq!(
            pairs,
            vec![(Value::String("answer".to_string()), Value::Integer(42))]
        );
    }
}
