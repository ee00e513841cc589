//! The runtime value universe shared by the evaluator, the VM, and the
//! macro facility.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{Block, Expression, Identifier};
use crate::environment::Env;

/// Signature of a builtin function written in Rust and exposed to programs.
pub type BuiltinFn = fn(Vec<Object>) -> Object;

/// A builtin function. Equality is by name: function pointers are not a
/// stable identity across registrations.
#[derive(Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// A user-defined function bundled with the environment live at its
/// literal's evaluation.
#[derive(Debug)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: Block,
    pub env: Env,
}

/// A macro definition. Like a function, but applied to quoted syntax during
/// macro expansion rather than to values.
#[derive(Debug)]
pub struct MacroObject {
    pub parameters: Vec<Identifier>,
    pub body: Block,
    pub env: Env,
}

/// A key derived from a hashable object: the object's kind tag plus a
/// 64-bit digest of its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: &'static str,
    pub value: u64,
}

/// The key/value pair stored in a hash. The original key object is retained
/// so hashes can display themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Null,
    Str(String),
    ReturnValue(Box<Object>),
    Error(String),
    Function(Rc<Function>),
    Builtin(Builtin),
    Array(Vec<Object>),
    /// Insertion-ordered so display and iteration are deterministic.
    Hash(IndexMap<HashKey, HashPair>),
    /// An unevaluated AST node.
    Quote(Expression),
    Macro(Rc<MacroObject>),
}

/// The boolean and null singletons. `Object` equality makes any `true`
/// produced by evaluation indistinguishable from `TRUE`, which is what the
/// identity-comparison semantics of `==`/`!=` rely on.
pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);
pub const NULL: Object = Object::Null;

/// The shared boolean singletons, selected by a native bool.
pub fn boolean(value: bool) -> Object {
    if value { TRUE } else { FALSE }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a 64-bit over a byte slice.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

impl Object {
    /// The historical type tag used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::Null => "NULL",
            Object::Str(_) => "STRING",
            Object::ReturnValue(_) => "RETURN",
            Object::Error(_) => "ERROR",
            Object::Function(_) => "FUNCTION",
            Object::Builtin(_) => "BUILTIN",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Quote(_) => "QUOTE",
            Object::Macro(_) => "MACRO",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// Truthiness: `false` and `null` are falsy; integers are truthy iff
    /// positive; strings, arrays and hashes are truthy iff non-empty;
    /// everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Boolean(value) => *value,
            Object::Null => false,
            Object::Integer(value) => *value > 0,
            Object::Str(value) => !value.is_empty(),
            Object::Array(elements) => !elements.is_empty(),
            Object::Hash(pairs) => !pairs.is_empty(),
            _ => true,
        }
    }

    /// Derive a hash key. Only integers, booleans and strings are hashable;
    /// everything else returns `None` and surfaces as a runtime error at the
    /// use site.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Integer(value) => *value as u64,
            Object::Boolean(value) => u64::from(*value),
            Object::Str(value) => fnv1a(value.as_bytes()),
            _ => return None,
        };
        Some(HashKey {
            kind: self.kind(),
            value,
        })
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::ReturnValue(a), Object::ReturnValue(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => a == b,
            (Object::Quote(a), Object::Quote(b)) => a == b,
            // Functions and macros are identities, not values
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Macro(a), Object::Macro(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{value}"),
            Object::Boolean(value) => write!(f, "{value}"),
            Object::Null => write!(f, "null"),
            Object::Str(value) => write!(f, "{value}"),
            Object::ReturnValue(inner) => write!(f, "{inner}"),
            Object::Error(message) => write!(f, "ERROR: {message}"),
            Object::Builtin(_) => write!(f, "builtin function"),
            Object::Array(elements) => {
                let rendered: Vec<String> =
                    elements.iter().map(|element| element.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Object::Hash(pairs) => {
                let rendered: Vec<String> = pairs
                    .values()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Object::Quote(node) => write!(f, "QUOTE({node})"),
            Object::Function(function) => {
                let params: Vec<String> = function
                    .parameters
                    .iter()
                    .map(|param| param.to_string())
                    .collect();
                write!(f, "fn({}) {}", params.join(", "), function.body)
            }
            Object::Macro(makro) => {
                let params: Vec<String> = makro
                    .parameters
                    .iter()
                    .map(|param| param.to_string())
                    .collect();
                write!(f, "macro({}) {}", params.join(", "), makro.body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_hash_keys() {
        let hello1 = Object::Str("Hello World".to_string());
        let hello2 = Object::Str("Hello World".to_string());
        let diff1 = Object::Str("My name is johnny".to_string());
        let diff2 = Object::Str("My name is johnny".to_string());

        assert_eq!(hello1.hash_key(), hello2.hash_key());
        assert_eq!(diff1.hash_key(), diff2.hash_key());
        assert_ne!(hello1.hash_key(), diff1.hash_key());
    }

    #[test]
    fn test_integer_and_boolean_hash_keys() {
        assert_eq!(
            Object::Integer(1).hash_key(),
            Some(HashKey {
                kind: "INTEGER",
                value: 1
            })
        );
        // Negative values reinterpret as u64; equal values share a key
        assert_eq!(
            Object::Integer(-1).hash_key(),
            Object::Integer(-1).hash_key()
        );
        assert_eq!(
            Object::Boolean(true).hash_key(),
            Some(HashKey {
                kind: "BOOLEAN",
                value: 1
            })
        );
        assert_eq!(
            Object::Boolean(false).hash_key(),
            Some(HashKey {
                kind: "BOOLEAN",
                value: 0
            })
        );
        // Same digest value, different kind tag: not equal
        assert_ne!(
            Object::Integer(1).hash_key(),
            Object::Boolean(true).hash_key()
        );
    }

    #[test]
    fn test_unhashable_kinds() {
        assert_eq!(Object::Array(vec![]).hash_key(), None);
        assert_eq!(Object::Null.hash_key(), None);
    }

    #[test]
    fn test_fnv1a_known_vectors() {
        // Published FNV-1a 64 test vectors
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_truthiness() {
        let cases = vec![
            (TRUE, true),
            (FALSE, false),
            (NULL, false),
            (Object::Integer(1), true),
            (Object::Integer(0), false),
            (Object::Integer(-5), false),
            (Object::Str("x".to_string()), true),
            (Object::Str(String::new()), false),
            (Object::Array(vec![Object::Integer(1)]), true),
            (Object::Array(vec![]), false),
            (Object::Hash(IndexMap::new()), false),
        ];

        for (object, expected) in cases {
            assert_eq!(object.is_truthy(), expected, "truthiness of {object:?}");
        }
    }

    #[test]
    fn test_singleton_equality() {
        assert_eq!(boolean(true), TRUE);
        assert_eq!(boolean(false), FALSE);
        assert_ne!(TRUE, FALSE);
        assert_ne!(Object::Integer(1), TRUE);
    }

    #[test]
    fn test_inspect_forms() {
        let cases = vec![
            (Object::Integer(5), "5"),
            (TRUE, "true"),
            (NULL, "null"),
            (Object::Str("hi".to_string()), "hi"),
            (Object::Error("boom".to_string()), "ERROR: boom"),
            (
                Object::Array(vec![Object::Integer(1), Object::Str("a".to_string())]),
                "[1, a]",
            ),
        ];

        for (object, expected) in cases {
            assert_eq!(object.to_string(), expected);
        }
    }
}
