//! The abstract syntax tree: a closed family of statement and expression
//! variants, each carrying its originating token.
//!
//! `Display` is the canonical printer: infix and prefix expressions print
//! fully parenthesized, blocks print braced, and string literals print
//! quoted, so the printed form of a well-formed program parses back to an
//! equivalent tree.
//!
//! [`modify_program`] and friends implement the structural rewriter used by
//! the macro facility: a caller-supplied function is applied to every
//! expression, children first.

use std::fmt;

use crate::token::Token;

/// The root node: a flat, ordered sequence of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// A braced statement list. Blocks appear only as `if` arms and as function
/// and macro bodies, never nested directly in a `Program`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub token: Token,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let {
        token: Token,
        name: Identifier,
        value: Expression,
    },
    Return {
        token: Token,
        value: Expression,
    },
    Expression {
        token: Token,
        expression: Expression,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral {
        token: Token,
        value: i64,
    },
    BooleanLiteral {
        token: Token,
        value: bool,
    },
    StringLiteral {
        token: Token,
        value: String,
    },
    ArrayLiteral {
        token: Token,
        elements: Vec<Expression>,
    },
    /// Pairs are kept in source order; duplicate keys are resolved at
    /// evaluation time (last write wins).
    HashLiteral {
        token: Token,
        pairs: Vec<(Expression, Expression)>,
    },
    Prefix {
        token: Token,
        operator: String,
        right: Box<Expression>,
    },
    Infix {
        token: Token,
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        token: Token,
        condition: Box<Expression>,
        consequence: Block,
        alternative: Option<Block>,
    },
    FunctionLiteral {
        token: Token,
        parameters: Vec<Identifier>,
        body: Block,
    },
    Call {
        token: Token,
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        token: Token,
        left: Box<Expression>,
        index: Box<Expression>,
    },
    MacroLiteral {
        token: Token,
        parameters: Vec<Identifier>,
        body: Block,
    },
}

impl Expression {
    /// The literal text of the node's originating token. The macro facility
    /// dispatches on this (`quote`/`unquote` are not keywords).
    pub fn token_literal(&self) -> &str {
        match self {
            Expression::Identifier(ident) => &ident.token.literal,
            Expression::IntegerLiteral { token, .. }
            | Expression::BooleanLiteral { token, .. }
            | Expression::StringLiteral { token, .. }
            | Expression::ArrayLiteral { token, .. }
            | Expression::HashLiteral { token, .. }
            | Expression::Prefix { token, .. }
            | Expression::Infix { token, .. }
            | Expression::If { token, .. }
            | Expression::FunctionLiteral { token, .. }
            | Expression::Call { token, .. }
            | Expression::Index { token, .. }
            | Expression::MacroLiteral { token, .. } => &token.literal,
        }
    }
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return write!(f, "{{}}");
        }
        write!(f, "{{ {} }}", join(&self.statements, " "))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value, .. } => write!(f, "let {name} = {value};"),
            Statement::Return { value, .. } => write!(f, "return {value};"),
            Statement::Expression { expression, .. } => write!(f, "{expression}"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{ident}"),
            Expression::IntegerLiteral { value, .. } => write!(f, "{value}"),
            Expression::BooleanLiteral { value, .. } => write!(f, "{value}"),
            Expression::StringLiteral { value, .. } => write!(f, "\"{value}\""),
            Expression::ArrayLiteral { elements, .. } => {
                write!(f, "[{}]", join(elements, ", "))
            }
            Expression::HashLiteral { pairs, .. } => {
                let rendered: Vec<String> = pairs
                    .iter()
                    .map(|(key, value)| format!("{key}: {value}"))
                    .collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({operator}{right})"),
            Expression::Infix {
                operator,
                left,
                right,
                ..
            } => write!(f, "({left} {operator} {right})"),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if ({condition}) {consequence}")?;
                if let Some(alternative) = alternative {
                    write!(f, " else {alternative}")?;
                }
                Ok(())
            }
            Expression::FunctionLiteral {
                parameters, body, ..
            } => write!(f, "fn({}) {body}", join(parameters, ", ")),
            Expression::MacroLiteral {
                parameters, body, ..
            } => write!(f, "macro({}) {body}", join(parameters, ", ")),
            Expression::Call {
                function,
                arguments,
                ..
            } => write!(f, "{function}({})", join(arguments, ", ")),
            Expression::Index { left, index, .. } => write!(f, "({left}[{index}])"),
        }
    }
}

/// Rewrite every expression in a program, children first.
pub fn modify_program(
    program: Program,
    f: &mut dyn FnMut(Expression) -> Expression,
) -> Program {
    Program {
        statements: program
            .statements
            .into_iter()
            .map(|statement| modify_statement(statement, f))
            .collect(),
    }
}

pub fn modify_statement(
    statement: Statement,
    f: &mut dyn FnMut(Expression) -> Expression,
) -> Statement {
    match statement {
        Statement::Let { token, name, value } => Statement::Let {
            token,
            name,
            value: modify_expression(value, f),
        },
        Statement::Return { token, value } => Statement::Return {
            token,
            value: modify_expression(value, f),
        },
        Statement::Expression { token, expression } => Statement::Expression {
            token,
            expression: modify_expression(expression, f),
        },
    }
}

fn modify_block(block: Block, f: &mut dyn FnMut(Expression) -> Expression) -> Block {
    Block {
        token: block.token,
        statements: block
            .statements
            .into_iter()
            .map(|statement| modify_statement(statement, f))
            .collect(),
    }
}

/// Rewrite an expression bottom-up: children are rebuilt first, then the
/// modifier is applied to the rebuilt node. The modifier's output is not
/// re-visited.
pub fn modify_expression(
    expression: Expression,
    f: &mut dyn FnMut(Expression) -> Expression,
) -> Expression {
    let rebuilt = match expression {
        Expression::Prefix {
            token,
            operator,
            right,
        } => Expression::Prefix {
            token,
            operator,
            right: Box::new(modify_expression(*right, f)),
        },
        Expression::Infix {
            token,
            operator,
            left,
            right,
        } => Expression::Infix {
            token,
            operator,
            left: Box::new(modify_expression(*left, f)),
            right: Box::new(modify_expression(*right, f)),
        },
        Expression::Index { token, left, index } => Expression::Index {
            token,
            left: Box::new(modify_expression(*left, f)),
            index: Box::new(modify_expression(*index, f)),
        },
        Expression::If {
            token,
            condition,
            consequence,
            alternative,
        } => Expression::If {
            token,
            condition: Box::new(modify_expression(*condition, f)),
            consequence: modify_block(consequence, f),
            alternative: alternative.map(|block| modify_block(block, f)),
        },
        Expression::FunctionLiteral {
            token,
            parameters,
            body,
        } => Expression::FunctionLiteral {
            token,
            parameters,
            body: modify_block(body, f),
        },
        Expression::MacroLiteral {
            token,
            parameters,
            body,
        } => Expression::MacroLiteral {
            token,
            parameters,
            body: modify_block(body, f),
        },
        Expression::Call {
            token,
            function,
            arguments,
        } => Expression::Call {
            token,
            function: Box::new(modify_expression(*function, f)),
            arguments: arguments
                .into_iter()
                .map(|argument| modify_expression(argument, f))
                .collect(),
        },
        Expression::ArrayLiteral { token, elements } => Expression::ArrayLiteral {
            token,
            elements: elements
                .into_iter()
                .map(|element| modify_expression(element, f))
                .collect(),
        },
        Expression::HashLiteral { token, pairs } => Expression::HashLiteral {
            token,
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (modify_expression(key, f), modify_expression(value, f)))
                .collect(),
        },
        leaf => leaf,
    };

    f(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn ident(name: &str) -> Identifier {
        Identifier {
            token: Token::new(TokenKind::Ident, name),
            value: name.to_string(),
        }
    }

    fn int(value: i64) -> Expression {
        Expression::IntegerLiteral {
            token: Token::new(TokenKind::Int, value.to_string()),
            value,
        }
    }

    #[test]
    fn test_program_display() {
        let program = Program {
            statements: vec![Statement::Let {
                token: Token::new(TokenKind::Let, "let"),
                name: ident("myVar"),
                value: Expression::Identifier(ident("anotherVar")),
            }],
        };

        assert_eq!(program.to_string(), "let myVar = anotherVar;");
    }

    #[test]
    fn test_display_forms() {
        let cases: Vec<(Expression, &str)> = vec![
            (
                Expression::StringLiteral {
                    token: Token::new(TokenKind::Str, "abc"),
                    value: "abc".to_string(),
                },
                "\"abc\"",
            ),
            (
                Expression::Prefix {
                    token: Token::new(TokenKind::Minus, "-"),
                    operator: "-".to_string(),
                    right: Box::new(int(5)),
                },
                "(-5)",
            ),
            (
                Expression::ArrayLiteral {
                    token: Token::new(TokenKind::Lbracket, "["),
                    elements: vec![int(1), int(2)],
                },
                "[1, 2]",
            ),
            (
                Expression::Index {
                    token: Token::new(TokenKind::Lbracket, "["),
                    left: Box::new(Expression::Identifier(ident("a"))),
                    index: Box::new(int(0)),
                },
                "(a[0])",
            ),
            (
                Expression::HashLiteral {
                    token: Token::new(TokenKind::Lbrace, "{"),
                    pairs: vec![(int(1), int(2))],
                },
                "{1: 2}",
            ),
        ];

        for (expression, expected) in cases {
            assert_eq!(expression.to_string(), expected);
        }
    }

    #[test]
    fn test_modify_replaces_leaves_everywhere() {
        // Swap every literal 1 for 2, through all containers
        let one = int;
        let turn_one_into_two = |expression: Expression| -> Expression {
            match expression {
                Expression::IntegerLiteral { value: 1, .. } => int(2),
                other => other,
            }
        };

        let dummy = Token::new(TokenKind::Lbracket, "[");
        let block_token = Token::new(TokenKind::Lbrace, "{");
        let cases: Vec<(Expression, Expression)> = vec![
            (one(1), int(2)),
            (
                Expression::Infix {
                    token: Token::new(TokenKind::Plus, "+"),
                    operator: "+".to_string(),
                    left: Box::new(one(1)),
                    right: Box::new(one(1)),
                },
                Expression::Infix {
                    token: Token::new(TokenKind::Plus, "+"),
                    operator: "+".to_string(),
                    left: Box::new(int(2)),
                    right: Box::new(int(2)),
                },
            ),
            (
                Expression::ArrayLiteral {
                    token: dummy.clone(),
                    elements: vec![one(1), one(1)],
                },
                Expression::ArrayLiteral {
                    token: dummy.clone(),
                    elements: vec![int(2), int(2)],
                },
            ),
            (
                Expression::HashLiteral {
                    token: block_token.clone(),
                    pairs: vec![(one(1), one(1))],
                },
                Expression::HashLiteral {
                    token: block_token.clone(),
                    pairs: vec![(int(2), int(2))],
                },
            ),
            (
                Expression::If {
                    token: Token::new(TokenKind::If, "if"),
                    condition: Box::new(one(1)),
                    consequence: Block {
                        token: block_token.clone(),
                        statements: vec![Statement::Expression {
                            token: Token::new(TokenKind::Int, "1"),
                            expression: one(1),
                        }],
                    },
                    alternative: None,
                },
                Expression::If {
                    token: Token::new(TokenKind::If, "if"),
                    condition: Box::new(int(2)),
                    consequence: Block {
                        token: block_token.clone(),
                        statements: vec![Statement::Expression {
                            token: Token::new(TokenKind::Int, "1"),
                            expression: int(2),
                        }],
                    },
                    alternative: None,
                },
            ),
        ];

        for (input, expected) in cases {
            let mut f = turn_one_into_two;
            let modified = modify_expression(input, &mut f);
            assert_eq!(modified, expected);
        }
    }

    #[test]
    fn test_modify_program_rewrites_statements() {
        let turn_one_into_two = |expression: Expression| -> Expression {
            match expression {
                Expression::IntegerLiteral { value: 1, .. } => int(2),
                other => other,
            }
        };

        let program = Program {
            statements: vec![
                Statement::Let {
                    token: Token::new(TokenKind::Let, "let"),
                    name: ident("x"),
                    value: int(1),
                },
                Statement::Return {
                    token: Token::new(TokenKind::Return, "return"),
                    value: int(1),
                },
            ],
        };

        let mut f = turn_one_into_two;
        let modified = modify_program(program, &mut f);
        assert_eq!(modified.to_string(), "let x = 2;return 2;");
    }
}
