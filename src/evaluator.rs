//! The tree-walking evaluator.
//!
//! Errors are first-class values: any operation that sees an `Error` operand
//! returns it unchanged, so a failure short-circuits the rest of the
//! expression. `ReturnValue` wrappers propagate the same way and are
//! unwrapped exactly once, at program and function-call boundaries.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::MAX_EVAL_DEPTH;
use crate::ast::{Block, Expression, Program, Statement};
use crate::builtins;
use crate::environment::{Env, Environment};
use crate::macros;
use crate::object::{FALSE, Function, HashPair, NULL, Object, TRUE, boolean};

/// Evaluate a whole program. A `ReturnValue` reaching the top level is
/// unwrapped; an error stops evaluation.
pub fn eval_program(program: &Program, env: &Env) -> Object {
    let mut result = NULL;

    for statement in &program.statements {
        result = eval_statement(statement, env, 0);
        match result {
            Object::ReturnValue(inner) => return *inner,
            Object::Error(_) => return result,
            _ => {}
        }
    }

    result
}

fn eval_statement(statement: &Statement, env: &Env, depth: usize) -> Object {
    match statement {
        Statement::Let { name, value, .. } => {
            let value = eval_expression(value, env, depth);
            if value.is_error() {
                return value;
            }
            env.borrow_mut().set(name.value.clone(), value);
            NULL
        }
        Statement::Return { value, .. } => {
            let value = eval_expression(value, env, depth);
            if value.is_error() {
                return value;
            }
            Object::ReturnValue(Box::new(value))
        }
        Statement::Expression { expression, .. } => eval_expression(expression, env, depth),
    }
}

/// Evaluate a block. Unlike a program, a `ReturnValue` is *not* unwrapped
/// here: it keeps propagating so the enclosing call boundary unwraps it
/// exactly once.
pub(crate) fn eval_block(block: &Block, env: &Env, depth: usize) -> Object {
    let mut result = NULL;

    for statement in &block.statements {
        result = eval_statement(statement, env, depth);
        if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
            return result;
        }
    }

    result
}

pub(crate) fn eval_expression(expression: &Expression, env: &Env, depth: usize) -> Object {
    if depth >= MAX_EVAL_DEPTH {
        return Object::Error(format!(
            "evaluation depth limit exceeded (max: {MAX_EVAL_DEPTH})"
        ));
    }

    match expression {
        Expression::IntegerLiteral { value, .. } => Object::Integer(*value),
        Expression::BooleanLiteral { value, .. } => boolean(*value),
        Expression::StringLiteral { value, .. } => Object::Str(value.clone()),
        Expression::Identifier(identifier) => eval_identifier(&identifier.value, env),

        Expression::Prefix {
            operator, right, ..
        } => {
            let right = eval_expression(right, env, depth + 1);
            if right.is_error() {
                return right;
            }
            eval_prefix_expression(operator, right)
        }

        Expression::Infix {
            operator,
            left,
            right,
            ..
        } => {
            let left = eval_expression(left, env, depth + 1);
            if left.is_error() {
                return left;
            }
            let right = eval_expression(right, env, depth + 1);
            if right.is_error() {
                return right;
            }
            eval_infix_expression(operator, left, right)
        }

        Expression::If {
            condition,
            consequence,
            alternative,
            ..
        } => {
            let condition = eval_expression(condition, env, depth + 1);
            if condition.is_error() {
                return condition;
            }
            if condition.is_truthy() {
                eval_block(consequence, env, depth + 1)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env, depth + 1)
            } else {
                NULL
            }
        }

        Expression::FunctionLiteral {
            parameters, body, ..
        } => Object::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        })),

        // Macro literals only have meaning to the expansion pass; one that
        // survives into evaluation produces nothing
        Expression::MacroLiteral { .. } => NULL,

        Expression::Call {
            function,
            arguments,
            ..
        } => {
            // `quote` is not a keyword: the rewrite triggers on the callee's
            // original token literal, and its arguments are not evaluated
            if function.token_literal() == "quote" {
                if arguments.len() != 1 {
                    return Object::Error(format!(
                        "wrong number of arguments. got={}, want=1",
                        arguments.len()
                    ));
                }
                return macros::quote(arguments[0].clone(), env);
            }

            let function = eval_expression(function, env, depth + 1);
            if function.is_error() {
                return function;
            }
            let args = eval_expressions(arguments, env, depth);
            if args.len() == 1 && args[0].is_error() {
                return args.into_iter().next().unwrap_or(NULL);
            }
            apply_function(function, args, depth)
        }

        Expression::ArrayLiteral { elements, .. } => {
            let elements = eval_expressions(elements, env, depth);
            if elements.len() == 1 && elements[0].is_error() {
                return elements.into_iter().next().unwrap_or(NULL);
            }
            Object::Array(elements)
        }

        Expression::HashLiteral { pairs, .. } => eval_hash_literal(pairs, env, depth),

        Expression::Index { left, index, .. } => {
            let left = eval_expression(left, env, depth + 1);
            if left.is_error() {
                return left;
            }
            let index = eval_expression(index, env, depth + 1);
            if index.is_error() {
                return index;
            }
            eval_index_expression(left, index)
        }
    }
}

fn eval_identifier(name: &str, env: &Env) -> Object {
    if let Some(value) = env.borrow().get(name) {
        return value;
    }
    if let Some(builtin) = builtins::lookup(name) {
        return builtin;
    }
    Object::Error(format!("identifier not found: {name}"))
}

/// Evaluate expressions left to right. An error aborts the walk and comes
/// back as a single-element list.
fn eval_expressions(expressions: &[Expression], env: &Env, depth: usize) -> Vec<Object> {
    let mut results = Vec::with_capacity(expressions.len());

    for expression in expressions {
        let evaluated = eval_expression(expression, env, depth + 1);
        if evaluated.is_error() {
            return vec![evaluated];
        }
        results.push(evaluated);
    }

    results
}

fn eval_prefix_expression(operator: &str, right: Object) -> Object {
    match operator {
        "!" => eval_bang_operator(right),
        "-" => match right {
            Object::Integer(value) => Object::Integer(value.wrapping_neg()),
            other => Object::Error(format!("unknown operator: -{}", other.kind())),
        },
        _ => Object::Error(format!("unknown operator: {operator}{}", right.kind())),
    }
}

/// `!` has its own table, distinct from truthiness: any value that is not a
/// boolean or null negates to `false`, integers included.
fn eval_bang_operator(right: Object) -> Object {
    match right {
        Object::Boolean(true) => FALSE,
        Object::Boolean(false) => TRUE,
        Object::Null => TRUE,
        _ => FALSE,
    }
}

fn eval_infix_expression(operator: &str, left: Object, right: Object) -> Object {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => {
            eval_integer_infix_expression(operator, *l, *r)
        }
        (Object::Str(l), Object::Str(r)) => eval_string_infix_expression(operator, l, r),
        _ => match operator {
            // Identity comparison against the interned singletons
            "==" => boolean(identity_eq(&left, &right)),
            "!=" => boolean(!identity_eq(&left, &right)),
            _ if left.kind() != right.kind() => Object::Error(format!(
                "type mismatch: {} {operator} {}",
                left.kind(),
                right.kind()
            )),
            _ => Object::Error(format!(
                "unknown operator: {} {operator} {}",
                left.kind(),
                right.kind()
            )),
        },
    }
}

/// Identity equality for the `==`/`!=` fallback: meaningful for the
/// boolean/null singletons and for reference values compared to themselves.
fn identity_eq(left: &Object, right: &Object) -> bool {
    match (left, right) {
        (Object::Boolean(l), Object::Boolean(r)) => l == r,
        (Object::Null, Object::Null) => true,
        (Object::Function(l), Object::Function(r)) => Rc::ptr_eq(l, r),
        (Object::Macro(l), Object::Macro(r)) => Rc::ptr_eq(l, r),
        (Object::Builtin(l), Object::Builtin(r)) => l.name == r.name,
        _ => false,
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Object {
    match operator {
        "+" => Object::Integer(left.wrapping_add(right)),
        "-" => Object::Integer(left.wrapping_sub(right)),
        "*" => Object::Integer(left.wrapping_mul(right)),
        "/" => {
            if right == 0 {
                Object::Error("division by zero".to_string())
            } else {
                Object::Integer(left.wrapping_div(right))
            }
        }
        "<" => boolean(left < right),
        ">" => boolean(left > right),
        "==" => boolean(left == right),
        "!=" => boolean(left != right),
        _ => Object::Error(format!("unknown operator: INTEGER {operator} INTEGER")),
    }
}

fn eval_string_infix_expression(operator: &str, left: &str, right: &str) -> Object {
    match operator {
        "+" => Object::Str(format!("{left}{right}")),
        "==" => boolean(left == right),
        "!=" => boolean(left != right),
        _ => Object::Error(format!("unknown operator: STRING {operator} STRING")),
    }
}

fn apply_function(function: Object, args: Vec<Object>, depth: usize) -> Object {
    match function {
        Object::Function(function) => {
            if function.parameters.len() != args.len() {
                return Object::Error(format!(
                    "wrong number of arguments. got={}, want={}",
                    args.len(),
                    function.parameters.len()
                ));
            }

            let extended = Environment::new_enclosed(&function.env);
            for (parameter, arg) in function.parameters.iter().zip(args) {
                extended.borrow_mut().set(parameter.value.clone(), arg);
            }

            let evaluated = eval_block(&function.body, &extended, depth + 1);
            match evaluated {
                Object::ReturnValue(inner) => *inner,
                other => other,
            }
        }
        Object::Builtin(builtin) => (builtin.func)(args),
        other => Object::Error(format!("not a function: {}", other.kind())),
    }
}

fn eval_hash_literal(
    pairs: &[(Expression, Expression)],
    env: &Env,
    depth: usize,
) -> Object {
    let mut hash = IndexMap::new();

    for (key_expression, value_expression) in pairs {
        let key = eval_expression(key_expression, env, depth + 1);
        if key.is_error() {
            return key;
        }

        let Some(hash_key) = key.hash_key() else {
            return Object::Error(format!("unusable as hash key: {}", key.kind()));
        };

        let value = eval_expression(value_expression, env, depth + 1);
        if value.is_error() {
            return value;
        }

        // Duplicate keys: last write wins, first position kept
        hash.insert(hash_key, HashPair { key, value });
    }

    Object::Hash(hash)
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (&left, &index) {
        (Object::Array(elements), Object::Integer(idx)) => {
            let idx = *idx;
            if idx < 0 || idx as usize >= elements.len() {
                return NULL;
            }
            elements[idx as usize].clone()
        }
        (Object::Hash(pairs), _) => {
            let Some(hash_key) = index.hash_key() else {
                return Object::Error(format!("unusable as hash key: {}", index.kind()));
            };
            pairs
                .get(&hash_key)
                .map(|pair| pair.value.clone())
                .unwrap_or(NULL)
        }
        _ => Object::Error(format!("index operator not supported: {}", left.kind())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run(input: &str) -> Object {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        assert!(
            parser.errors().is_empty(),
            "parser errors for {input:?}: {:?}",
            parser.errors()
        );
        let env = Environment::new();
        eval_program(&program, &env)
    }

    fn assert_integer_cases(cases: Vec<(&str, i64)>) {
        for (input, expected) in cases {
            assert_eq!(run(input), Object::Integer(expected), "input: {input:?}");
        }
    }

    fn assert_error_cases(cases: Vec<(&str, &str)>) {
        for (input, expected) in cases {
            assert_eq!(
                run(input),
                Object::Error(expected.to_string()),
                "input: {input:?}"
            );
        }
    }

    #[test]
    fn test_integer_expressions() {
        assert_integer_cases(vec![
            ("5", 5),
            ("10", 10),
            ("-5", -5),
            ("-10", -10),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("5 + 2 * 10", 25),
            ("20 + 2 * -10", 0),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("3 * (3 * 3) + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
            ("7 / 2", 3),
            ("-7 / 2", -3),
        ]);
    }

    #[test]
    fn test_integer_overflow_wraps() {
        assert_integer_cases(vec![
            ("9223372036854775807 + 1", i64::MIN),
            ("-9223372036854775807 - 2", i64::MAX),
            ("-(0 - 9223372036854775807 - 1)", i64::MIN),
        ]);
    }

    #[test]
    fn test_boolean_expressions() {
        let cases = vec![
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 < 1", false),
            ("1 > 1", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("1 == 2", false),
            ("1 != 2", true),
            ("true == true", true),
            ("false == false", true),
            ("true == false", false),
            ("true != false", true),
            ("false != true", true),
            ("(1 < 2) == true", true),
            ("(1 < 2) == false", false),
            ("(1 > 2) == true", false),
            ("(1 > 2) == false", true),
            // Mixed kinds fall back to singleton identity
            ("5 == true", false),
            ("5 != true", true),
            ("\"a\" == \"a\"", true),
            ("\"a\" != \"a\"", false),
            ("\"a\" == \"b\"", false),
        ];

        for (input, expected) in cases {
            assert_eq!(run(input), boolean(expected), "input: {input:?}");
        }
    }

    #[test]
    fn test_bang_operator() {
        // `!` on any non-boolean, non-null value is false, 0 included
        let cases = vec![
            ("!true", false),
            ("!false", true),
            ("!5", false),
            ("!0", false),
            ("!-3", false),
            ("!\"\"", false),
            ("!!true", true),
            ("!!false", false),
            ("!!5", true),
        ];

        for (input, expected) in cases {
            assert_eq!(run(input), boolean(expected), "input: {input:?}");
        }
    }

    #[test]
    fn test_if_else_expressions() {
        let cases = vec![
            ("if (true) { 10 }", Object::Integer(10)),
            ("if (false) { 10 }", NULL),
            ("if (1) { 10 }", Object::Integer(10)),
            // Integer truthiness is n > 0: zero and negatives are falsy
            ("if (0) { 10 }", NULL),
            ("if (-1) { 10 }", NULL),
            ("if (1 < 2) { 10 }", Object::Integer(10)),
            ("if (1 > 2) { 10 }", NULL),
            ("if (1 > 2) { 10 } else { 20 }", Object::Integer(20)),
            ("if (1 < 2) { 10 } else { 20 }", Object::Integer(10)),
            // Strings and arrays are truthy iff non-empty
            ("if (\"\") { 10 } else { 20 }", Object::Integer(20)),
            ("if (\"x\") { 10 } else { 20 }", Object::Integer(10)),
            ("if ([]) { 10 } else { 20 }", Object::Integer(20)),
            ("if ([0]) { 10 } else { 20 }", Object::Integer(10)),
        ];

        for (input, expected) in cases {
            assert_eq!(run(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_return_statements() {
        assert_integer_cases(vec![
            ("return 10;", 10),
            ("return 10; 9;", 10),
            ("return 2 * 5; 9;", 10),
            ("9; return 2 * 5; 9;", 10),
            // Blocks propagate the wrapper; only the outermost boundary unwraps
            ("if (10 > 1) { if (10 > 1) { return 10; } return 1; }", 10),
        ]);
    }

    #[test]
    fn test_error_handling() {
        assert_error_cases(vec![
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "if (10 > 1) { true + false; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            (
                "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "identifier not found: foobar"),
            ("\"Hello\" - \"World\"", "unknown operator: STRING - STRING"),
            ("\"Hello\" < \"World\"", "unknown operator: STRING < STRING"),
            ("999 / 0", "division by zero"),
            (
                "{\"name\": \"Ibex\"}[fn(x) { x }];",
                "unusable as hash key: FUNCTION",
            ),
            ("{[1]: 2}", "unusable as hash key: ARRAY"),
            ("5[0]", "index operator not supported: INTEGER"),
            ("[1][\"x\"]", "index operator not supported: ARRAY"),
            ("5(1)", "not a function: INTEGER"),
            // An error operand short-circuits the rest of the expression
            ("(5 + true) + nope", "type mismatch: INTEGER + BOOLEAN"),
        ]);
    }

    #[test]
    fn test_let_statements() {
        assert_integer_cases(vec![
            ("let a = 5; a;", 5),
            ("let a = 5 * 5; a;", 25),
            ("let a = 5; let b = a; b;", 5),
            ("let a = 5; let b = a; let c = a + b + 5; c;", 15),
        ]);
    }

    #[test]
    fn test_function_object() {
        match run("fn(x) { x + 2; };") {
            Object::Function(function) => {
                assert_eq!(function.parameters.len(), 1);
                assert_eq!(function.parameters[0].value, "x");
                assert_eq!(function.body.to_string(), "{ (x + 2) }");
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_function_application() {
        assert_integer_cases(vec![
            ("let identity = fn(x) { x; }; identity(5);", 5),
            ("let identity = fn(x) { return x; }; identity(5);", 5),
            ("let double = fn(x) { x * 2; }; double(5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
            ("fn(x) { x; }(5)", 5),
        ]);
    }

    #[test]
    fn test_closures() {
        assert_integer_cases(vec![
            (
                "let newAdder = fn(x) { fn(y) { x + y } };
                 let addTwo = newAdder(2);
                 addTwo(3);",
                5,
            ),
            // Several closures can share one captured frame
            (
                "let counterPair = fn(x) { [fn() { x }, fn() { x * 2 }] };
                 let pair = counterPair(21);
                 pair[0]() + pair[1]();",
                63,
            ),
        ]);
    }

    #[test]
    fn test_recursion() {
        assert_integer_cases(vec![
            (
                "let fact = fn(n) { if (n < 2) { 1 } else { n * fact(n - 1) } }; fact(5);",
                120,
            ),
            (
                "let fib = fn(n) { if (n < 2) { n } else { fib(n - 1) + fib(n - 2) } }; fib(10);",
                55,
            ),
        ]);
    }

    #[test]
    fn test_function_arity_errors() {
        assert_error_cases(vec![
            ("fn(x) { x; }(1, 2)", "wrong number of arguments. got=2, want=1"),
            ("fn(x, y) { x; }(1)", "wrong number of arguments. got=1, want=2"),
        ]);
    }

    #[test]
    fn test_string_operations() {
        assert_eq!(
            run("\"Hello\" + \" \" + \"World!\""),
            Object::Str("Hello World!".to_string())
        );
        assert_eq!(run("len(\"Hello\" + \"World\")"), Object::Integer(10));
    }

    #[test]
    fn test_builtin_functions() {
        let cases = vec![
            ("len(\"\")", Object::Integer(0)),
            ("len(\"four\")", Object::Integer(4)),
            ("len(\"hello world\")", Object::Integer(11)),
            ("len([1, 2, 3])", Object::Integer(3)),
            ("first([1, 2, 3])", Object::Integer(1)),
            ("first([])", NULL),
            ("last([1, 2, 3])", Object::Integer(3)),
            ("last([])", NULL),
            (
                "rest([1, 2, 3])",
                Object::Array(vec![Object::Integer(2), Object::Integer(3)]),
            ),
            ("rest([])", NULL),
            (
                "push([], 1)",
                Object::Array(vec![Object::Integer(1)]),
            ),
            (
                "push([1], 2, 3)",
                Object::Array(vec![
                    Object::Integer(1),
                    Object::Integer(2),
                    Object::Integer(3),
                ]),
            ),
            (
                "len(1)",
                Object::Error("argument to `len` not supported. got INTEGER".to_string()),
            ),
            (
                "len(\"one\", \"two\")",
                Object::Error("wrong number of arguments. got=2, want=1".to_string()),
            ),
            ("puts(\"out\")", NULL),
        ];

        for (input, expected) in cases {
            assert_eq!(run(input), expected, "input: {input:?}");
        }

        // Built-ins resolve only after the environment, so they can be shadowed
        assert_eq!(run("let len = fn(x) { 0 }; len(\"four\")"), Object::Integer(0));
    }

    #[test]
    fn test_array_literals_and_indexing() {
        assert_eq!(
            run("[1, 2 * 2, 3 + 3]"),
            Object::Array(vec![
                Object::Integer(1),
                Object::Integer(4),
                Object::Integer(6),
            ])
        );

        let cases = vec![
            ("[1, 2, 3][0]", Object::Integer(1)),
            ("[1, 2, 3][1]", Object::Integer(2)),
            ("[1, 2, 3][2]", Object::Integer(3)),
            ("let i = 0; [1][i];", Object::Integer(1)),
            ("[1, 2, 3][1 + 1];", Object::Integer(3)),
            ("let myArray = [1, 2, 3]; myArray[2];", Object::Integer(3)),
            (
                "let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];",
                Object::Integer(6),
            ),
            // Out of range is null, not an error
            ("[1, 2, 3][3]", NULL),
            ("[1, 2, 3][-1]", NULL),
        ];

        for (input, expected) in cases {
            assert_eq!(run(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_rest_push_pipeline() {
        assert_eq!(
            run("let a = [1, 2, 3]; push(rest(a), last(a));"),
            Object::Array(vec![
                Object::Integer(2),
                Object::Integer(3),
                Object::Integer(3),
            ])
        );
    }

    #[test]
    fn test_hash_literals() {
        let result = run(r#"let two = "two";
            {
                "one": 10 - 9,
                two: 1 + 1,
                "thr" + "ee": 6 / 2,
                4: 4,
                true: 5,
                false: 6
            }"#);

        let Object::Hash(pairs) = result else {
            panic!("expected hash, got {result:?}");
        };

        let expected = vec![
            (Object::Str("one".to_string()), 1),
            (Object::Str("two".to_string()), 2),
            (Object::Str("three".to_string()), 3),
            (Object::Integer(4), 4),
            (TRUE, 5),
            (FALSE, 6),
        ];
        assert_eq!(pairs.len(), expected.len());

        // Pairs come back in insertion order
        for ((hash_key, pair), (expected_key, expected_value)) in pairs.iter().zip(&expected) {
            assert_eq!(Some(hash_key.clone()), expected_key.hash_key());
            assert_eq!(pair.key, *expected_key);
            assert_eq!(pair.value, Object::Integer(*expected_value));
        }
    }

    #[test]
    fn test_hash_indexing() {
        let cases = vec![
            ("{\"foo\": 5}[\"foo\"]", Object::Integer(5)),
            ("{\"foo\": 5}[\"bar\"]", NULL),
            ("let key = \"foo\"; {\"foo\": 5}[key]", Object::Integer(5)),
            ("{}[\"foo\"]", NULL),
            ("{5: 5}[5]", Object::Integer(5)),
            ("{true: 5}[true]", Object::Integer(5)),
            ("{false: 5}[false]", Object::Integer(5)),
            // Duplicate keys: last write wins
            ("{1: \"a\", 1: \"b\"}[1]", Object::Str("b".to_string())),
        ];

        for (input, expected) in cases {
            assert_eq!(run(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_let_evaluates_to_null() {
        assert_eq!(run("let a = 5;"), NULL);
    }

    #[test]
    fn test_runaway_recursion_is_an_error() {
        match run("let f = fn(x) { f(x) }; f(1);") {
            Object::Error(message) => {
                assert!(
                    message.contains("depth limit exceeded"),
                    "unexpected message: {message}"
                );
            }
            other => panic!("expected depth error, got {other:?}"),
        }
    }
}
