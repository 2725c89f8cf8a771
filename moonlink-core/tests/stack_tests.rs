//! 栈原语与索引测试

mod common;
use common::fresh_state;
use moonlink_core::{normalize_index, LuaType, Value};

#[test]
fn test_push_read_roundtrip() {
    let mut s = fresh_state();

    s.push_string("héllo");
    assert_eq!(s.to_string(-1).as_deref(), Some("héllo"));

    s.push_number(-0.25);
    assert_eq!(s.to_number(-1), Some(-0.25));

    s.push_integer(i64::MAX);
    assert_eq!(s.to_integer(-1), Some(i64::MAX));

    s.push_boolean(true);
    assert!(s.to_boolean(-1));

    assert_eq!(s.top(), 4);
}

#[test]
fn test_absent_string_sentinel() {
    let mut s = fresh_state();
    s.push_opt_string(None);
    assert_eq!(s.to_string(-1), None);
    assert_eq!(s.to_bytes(-1), None);
    // 超出栈顶的位置同样是“缺失”
    assert_eq!(s.to_string(5), None);
    assert_eq!(s.to_integer(5), None);
}

#[test]
fn test_reads_do_not_mutate() {
    let mut s = fresh_state();
    s.push_integer(12);
    s.push_string("x");
    let before = s.dump_stack();
    let _ = s.to_string(1);
    let _ = s.to_number(2);
    let _ = s.to_value(1);
    assert_eq!(s.dump_stack(), before);
    assert_eq!(s.type_of(1), LuaType::Number);
}

#[test]
fn test_relative_index_tracks_top() {
    let mut s = fresh_state();
    for n in 1..=4 {
        s.push_integer(n);
        assert_eq!(s.abs_index(-1), s.top());
        assert_eq!(s.to_integer(-1), Some(n));
    }
    // -2 在每次压栈后指向不同的槽位
    assert_eq!(s.to_integer(-2), Some(3));
    s.pop(1);
    assert_eq!(s.to_integer(-2), Some(2));
    assert_eq!(normalize_index(-2, s.top()), 2);
}

#[test]
fn test_type_names() {
    let mut s = fresh_state();
    s.push_nil();
    s.push_boolean(false);
    s.push_number(1.0);
    s.push_string("");
    s.new_table();
    s.eval("return print").unwrap();
    let names: Vec<_> = (1..=s.top()).map(|i| s.type_name(i)).collect();
    assert_eq!(
        names,
        vec!["nil", "boolean", "number", "string", "table", "function"]
    );
    assert_eq!(s.type_name(s.top() + 1), "no value");
}

#[test]
fn test_value_snapshot_of_script_values() {
    let mut s = fresh_state();
    let values = common::eval_values(&mut s, "return 1, 2.5, 'three', true, nil");
    assert_eq!(
        values,
        vec![
            Value::Integer(1),
            Value::Number(2.5),
            Value::from("three"),
            Value::Boolean(true),
            Value::Nil,
        ]
    );
    assert_eq!(s.top(), 0);
}
