//! 表操作与遍历测试

mod common;
use common::{eval_one, fresh_state};
use moonlink_core::{CoreError, LuaType, Value};
use std::collections::HashMap;

#[test]
fn test_build_table_visible_to_script() {
    let mut s = fresh_state();
    s.new_table();
    s.push_string("name");
    s.push_string("moon");
    s.set_table_kv(1, 2, 3).unwrap();
    s.set_top(1);
    s.push_integer(3);
    s.set_field(1, "phase", -1).unwrap();
    s.set_top(1);
    s.set_global("cfg").unwrap();

    assert_eq!(eval_one(&mut s, "return cfg.name"), Value::from("moon"));
    assert_eq!(eval_one(&mut s, "return cfg.phase"), Value::Integer(3));
}

#[test]
fn test_read_script_table() {
    let mut s = fresh_state();
    s.exec("point = { x = 1, y = 2 }").unwrap();
    s.get_global("point").unwrap();

    assert_eq!(s.get_field(-1, "x").unwrap(), LuaType::Number);
    assert_eq!(s.to_integer(-1), Some(1));
    s.pop(1);

    s.push_string("y");
    assert_eq!(s.get_table_by_key(1, -1).unwrap(), LuaType::Number);
    assert_eq!(s.to_integer(-1), Some(2));
    assert_eq!(s.top(), 3);
}

#[test]
fn test_index_metamethod_runs() {
    let mut s = fresh_state();
    s.exec("proxy = setmetatable({}, { __index = function(_, k) return k .. '!' end })")
        .unwrap();
    s.get_global("proxy").unwrap();
    s.get_field(-1, "hey").unwrap();
    assert_eq!(s.to_string(-1).as_deref(), Some("hey!"));
}

#[test]
fn test_iteration_exhaustive_and_balanced() {
    let mut s = fresh_state();
    s.exec("t = { a = 1, b = 2, c = 3 }").unwrap();
    s.push_integer(99); // 栈底的无关值
    s.get_global("t").unwrap();
    let before = s.top();

    let mut seen: HashMap<String, i64> = HashMap::new();
    s.for_each_pair(-1, |s| {
        let key = s.to_string(-2).unwrap_or_default();
        let value = s.to_integer(-1).unwrap_or_default();
        *seen.entry(key).or_default() += value;
        true
    })
    .unwrap();

    assert_eq!(s.top(), before);
    assert_eq!(seen.len(), 3);
    assert_eq!(seen["a"], 1);
    assert_eq!(seen["b"], 2);
    assert_eq!(seen["c"], 3);
    assert_eq!(s.to_integer(1), Some(99));
}

#[test]
fn test_iteration_mixed_keys() {
    let mut s = fresh_state();
    s.exec("t = { 'first', 'second', label = 'l', [true] = 0 }")
        .unwrap();
    s.get_global("t").unwrap();
    let pairs = s.collect_pairs(-1).unwrap();
    assert_eq!(pairs.len(), 4);
    assert!(pairs.contains(&(Value::Integer(1), Value::from("first"))));
    assert!(pairs.contains(&(Value::Integer(2), Value::from("second"))));
    assert!(pairs.contains(&(Value::from("label"), Value::from("l"))));
    assert!(pairs.contains(&(Value::Boolean(true), Value::Integer(0))));
}

#[test]
fn test_iteration_may_clear_visited_fields() {
    let mut s = fresh_state();
    s.exec("t = { a = 1, b = 2, c = 3 }").unwrap();
    s.get_global("t").unwrap();
    s.for_each_pair(1, |s| {
        // t[k] = nil 是允许的修改
        s.push_value(-2);
        s.push_nil();
        let _ = s.set_table(1);
        true
    })
    .unwrap();
    assert_eq!(s.collect_pairs(1).unwrap(), vec![]);
}

#[test]
fn test_helpers_reject_non_tables() {
    let mut s = fresh_state();
    s.push_boolean(true);
    s.push_string("k");
    assert!(matches!(
        s.set_table_kv(1, 2, 2),
        Err(CoreError::NotATable {
            index: 1,
            found: LuaType::Boolean
        })
    ));
    assert!(s.get_table_by_key(1, 2).is_err());
    assert!(s.raw_get_index(2, 1).is_err());
    assert_eq!(s.top(), 2);
}
