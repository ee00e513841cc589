//! Builtin functions written in Rust and exposed to programs.
//!
//! Identifier resolution tries the environment first, then this table, so a
//! `let` binding can shadow any builtin (hosts use that to stub `quit`).

use crate::object::{Builtin, BuiltinFn, NULL, Object};

/// Look a builtin up by name.
pub fn lookup(name: &str) -> Option<Object> {
    let (name, func): (&'static str, BuiltinFn) = match name {
        "len" => ("len", builtin_len),
        "first" => ("first", builtin_first),
        "last" => ("last", builtin_last),
        "rest" => ("rest", builtin_rest),
        "push" => ("push", builtin_push),
        "puts" => ("puts", builtin_puts),
        "quit" => ("quit", builtin_quit),
        _ => return None,
    };
    Some(Object::Builtin(Builtin { name, func }))
}

fn wrong_arity(got: usize, want: usize) -> Object {
    Object::Error(format!("wrong number of arguments. got={got}, want={want}"))
}

/// `len(x)`: byte length of a string, or element count of an array.
fn builtin_len(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Str(value) => Object::Integer(value.len() as i64),
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        other => Object::Error(format!("argument to `len` not supported. got {}", other.kind())),
    }
}

/// `first(arr)`: the first element, or `null` for an empty array.
fn builtin_first(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => elements.first().cloned().unwrap_or(NULL),
        other => Object::Error(format!(
            "argument to `first` not supported. got {}",
            other.kind()
        )),
    }
}

/// `last(arr)`: the last element, or `null` for an empty array.
fn builtin_last(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => elements.last().cloned().unwrap_or(NULL),
        other => Object::Error(format!(
            "argument to `last` not supported. got {}",
            other.kind()
        )),
    }
}

/// `rest(arr)`: a new array without the first element, or `null` for an
/// empty array.
fn builtin_rest(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => {
            if elements.is_empty() {
                NULL
            } else {
                Object::Array(elements[1..].to_vec())
            }
        }
        other => Object::Error(format!(
            "argument to `rest` not supported. got {}",
            other.kind()
        )),
    }
}

/// `push(arr, v...)`: a new array with the values appended.
fn builtin_push(mut args: Vec<Object>) -> Object {
    if args.len() < 2 {
        return wrong_arity(args.len(), 2);
    }
    let values = args.split_off(1);
    match args.into_iter().next() {
        Some(Object::Array(mut elements)) => {
            elements.extend(values);
            Object::Array(elements)
        }
        Some(other) => Object::Error(format!(
            "argument to `push` not supported. got {}",
            other.kind()
        )),
        None => unreachable!(),
    }
}

/// `puts(v...)`: print each argument's display form on its own line.
fn builtin_puts(args: Vec<Object>) -> Object {
    for arg in &args {
        println!("{arg}");
    }
    NULL
}

/// `quit()`: terminate the process.
fn builtin_quit(args: Vec<Object>) -> Object {
    if !args.is_empty() {
        return wrong_arity(args.len(), 0);
    }
    std::process::exit(0);
}
