//! The macro facility: `quote`/`unquote` and the two expansion passes.
//!
//! Both passes run over the parsed AST before evaluation. `define_macros`
//! collects top-level macro definitions into an environment and removes
//! them from the program; `expand_macros` then rewrites every call to a
//! defined macro with the AST its body produces.
//!
//! `quote` and `unquote` are not keywords. They are matched by the callee's
//! original token literal, so re-binding the names with `let` changes
//! nothing about the rewrite's trigger.

use std::rc::Rc;

use crate::ast::{self, Expression, Program, Statement};
use crate::environment::{Env, Environment};
use crate::evaluator;
use crate::object::{MacroObject, Object};
use crate::token::{Token, TokenKind};

/// Build a `Quote` from an expression, evaluating any `unquote` calls
/// inside it first.
pub(crate) fn quote(expression: Expression, env: &Env) -> Object {
    Object::Quote(eval_unquote_calls(expression, env))
}

fn eval_unquote_calls(expression: Expression, env: &Env) -> Expression {
    let env = Rc::clone(env);
    ast::modify_expression(expression, &mut |node| {
        if !is_unquote_call(&node) {
            return node;
        }

        let Expression::Call { arguments, .. } = &node else {
            return node;
        };
        // Only a single-argument unquote is rewritten
        if arguments.len() != 1 {
            return node;
        }

        let evaluated = evaluator::eval_expression(&arguments[0], &env, 0);
        match object_to_node(evaluated) {
            Some(replacement) => replacement,
            // Not convertible back to syntax: leave the call untouched
            None => node,
        }
    })
}

fn is_unquote_call(node: &Expression) -> bool {
    match node {
        Expression::Call { function, .. } => function.token_literal() == "unquote",
        _ => false,
    }
}

/// Convert an evaluation result back into syntax. Integers, booleans and
/// quotes convert; everything else has no syntactic form.
fn object_to_node(object: Object) -> Option<Expression> {
    match object {
        Object::Integer(value) => Some(Expression::IntegerLiteral {
            token: Token::new(TokenKind::Int, value.to_string()),
            value,
        }),
        Object::Boolean(value) => {
            let token = if value {
                Token::new(TokenKind::True, "true")
            } else {
                Token::new(TokenKind::False, "false")
            };
            Some(Expression::BooleanLiteral { token, value })
        }
        Object::Quote(node) => Some(node),
        _ => None,
    }
}

/// Collect every top-level `let NAME = macro(..) {..};` into `env` and
/// remove it from the program. Macro definitions nested inside other
/// statements are not processed.
pub fn define_macros(program: &mut Program, env: &Env) {
    let statements = std::mem::take(&mut program.statements);

    program.statements = statements
        .into_iter()
        .filter_map(|statement| match statement {
            Statement::Let {
                name,
                value:
                    Expression::MacroLiteral {
                        parameters, body, ..
                    },
                ..
            } => {
                let makro = Object::Macro(Rc::new(MacroObject {
                    parameters,
                    body,
                    env: Rc::clone(env),
                }));
                env.borrow_mut().set(name.value, makro);
                None
            }
            other => Some(other),
        })
        .collect();
}

/// Rewrite every call to a defined macro with the AST its body evaluates
/// to. The body sees its arguments as `Quote` objects; its result must be a
/// `Quote`, anything else is fatal.
pub fn expand_macros(program: Program, env: &Env) -> Program {
    let env = Rc::clone(env);
    ast::modify_program(program, &mut |node| {
        let Expression::Call {
            function,
            arguments,
            ..
        } = &node
        else {
            return node;
        };
        let Expression::Identifier(identifier) = function.as_ref() else {
            return node;
        };
        let Some(Object::Macro(makro)) = env.borrow().get(&identifier.value) else {
            return node;
        };

        // Too few arguments is fatal; extra arguments are ignored (only the
        // declared parameters are ever bound)
        if arguments.len() < makro.parameters.len() {
            panic!(
                "wrong number of macro arguments. got={}, want={}",
                arguments.len(),
                makro.parameters.len()
            );
        }

        let extended = Environment::new_enclosed(&makro.env);
        for (parameter, argument) in makro.parameters.iter().zip(arguments) {
            extended
                .borrow_mut()
                .set(parameter.value.clone(), Object::Quote(argument.clone()));
        }

        let evaluated = evaluator::eval_block(&makro.body, &extended, 0);
        match evaluated {
            Object::Quote(replacement) => replacement,
            _ => panic!("only AST nodes can be returned from macros"),
        }
    })
}
