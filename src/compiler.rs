//! The single-pass compiler: one walk over the AST, emitting bytecode into
//! a growing byte buffer with an append-only constants pool.
//!
//! Jump targets are backpatched: a jump is emitted with a dummy operand and
//! re-encoded in place once the target offset is known. The only peephole
//! rule is dropping a trailing `OpPop` inside `if` arms so the arm's value
//! stays on the stack.
//!
//! The compiler covers the expression subset (literals, prefix and infix
//! operators, conditionals); everything else is a compile error. The
//! tree-walking evaluator remains the complete interpreter, and that
//! asymmetry is deliberate.

use std::fmt;

use crate::ast::{Block, Expression, Program, Statement};
use crate::code::{self, Instructions, Opcode};
use crate::object::Object;

/// Placeholder operand for jumps that get backpatched.
const DUMMY_OPERAND: usize = 9999;

#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub message: String,
}

impl CompileError {
    fn new(message: impl Into<String>) -> Self {
        CompileError {
            message: message.into(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CompileError {}

/// The compiler's output: an instruction stream plus the constants it
/// references.
#[derive(Debug, Clone)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Object>,
}

#[derive(Debug, Clone, Copy)]
struct EmittedInstruction {
    opcode: Opcode,
    position: usize,
}

pub struct Compiler {
    instructions: Instructions,
    constants: Vec<Object>,
    last_instruction: Option<EmittedInstruction>,
    previous_instruction: Option<EmittedInstruction>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Compiler {
            instructions: Instructions::new(),
            constants: Vec::new(),
            last_instruction: None,
            previous_instruction: None,
        }
    }

    pub fn compile(&mut self, program: &Program) -> Result<(), CompileError> {
        for statement in &program.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    pub fn bytecode(self) -> Bytecode {
        Bytecode {
            instructions: self.instructions,
            constants: self.constants,
        }
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<(), CompileError> {
        match statement {
            Statement::Expression { expression, .. } => {
                self.compile_expression(expression)?;
                // A value produced as a statement is discarded
                self.emit(Opcode::Pop, &[]);
                Ok(())
            }
            Statement::Let { .. } => {
                Err(CompileError::new("compilation of let statements is not supported"))
            }
            Statement::Return { .. } => Err(CompileError::new(
                "compilation of return statements is not supported",
            )),
        }
    }

    fn compile_block(&mut self, block: &Block) -> Result<(), CompileError> {
        for statement in &block.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    fn compile_expression(&mut self, expression: &Expression) -> Result<(), CompileError> {
        match expression {
            Expression::IntegerLiteral { value, .. } => {
                let index = self.add_constant(Object::Integer(*value));
                self.emit(Opcode::Constant, &[index]);
                Ok(())
            }

            Expression::BooleanLiteral { value, .. } => {
                if *value {
                    self.emit(Opcode::True, &[]);
                } else {
                    self.emit(Opcode::False, &[]);
                }
                Ok(())
            }

            Expression::Prefix {
                operator, right, ..
            } => {
                self.compile_expression(right)?;
                match operator.as_str() {
                    "!" => self.emit(Opcode::Bang, &[]),
                    "-" => self.emit(Opcode::Minus, &[]),
                    _ => return Err(CompileError::new(format!("unknown operator {operator}"))),
                };
                Ok(())
            }

            Expression::Infix {
                operator,
                left,
                right,
                ..
            } => {
                // There is no less-than opcode: emit the operands reversed
                // and reuse greater-than
                if operator == "<" {
                    self.compile_expression(right)?;
                    self.compile_expression(left)?;
                    self.emit(Opcode::GreaterThan, &[]);
                    return Ok(());
                }

                self.compile_expression(left)?;
                self.compile_expression(right)?;

                match operator.as_str() {
                    "+" => self.emit(Opcode::Add, &[]),
                    "-" => self.emit(Opcode::Sub, &[]),
                    "*" => self.emit(Opcode::Mul, &[]),
                    "/" => self.emit(Opcode::Div, &[]),
                    "==" => self.emit(Opcode::Eq, &[]),
                    "!=" => self.emit(Opcode::NotEq, &[]),
                    ">" => self.emit(Opcode::GreaterThan, &[]),
                    _ => return Err(CompileError::new(format!("unknown operator {operator}"))),
                };
                Ok(())
            }

            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                self.compile_expression(condition)?;

                let jump_not_truthy = self.emit(Opcode::JumpNotTruthy, &[DUMMY_OPERAND]);

                self.compile_block(consequence)?;
                if self.last_instruction_is_pop() {
                    self.remove_last_instruction();
                }

                match alternative {
                    None => {
                        let after_consequence = self.instructions.len();
                        self.change_operand(jump_not_truthy, after_consequence)?;
                    }
                    Some(alternative) => {
                        // Reached only when the condition was truthy: skip
                        // over the alternative
                        let jump = self.emit(Opcode::Jump, &[DUMMY_OPERAND]);

                        let after_consequence = self.instructions.len();
                        self.change_operand(jump_not_truthy, after_consequence)?;

                        self.compile_block(alternative)?;
                        if self.last_instruction_is_pop() {
                            self.remove_last_instruction();
                        }

                        let after_alternative = self.instructions.len();
                        self.change_operand(jump, after_alternative)?;
                    }
                }
                Ok(())
            }

            Expression::Identifier(_) => {
                Err(CompileError::new("compilation of identifiers is not supported"))
            }
            Expression::StringLiteral { .. } => Err(CompileError::new(
                "compilation of string literals is not supported",
            )),
            Expression::ArrayLiteral { .. } => Err(CompileError::new(
                "compilation of array literals is not supported",
            )),
            Expression::HashLiteral { .. } => Err(CompileError::new(
                "compilation of hash literals is not supported",
            )),
            Expression::FunctionLiteral { .. } => Err(CompileError::new(
                "compilation of function literals is not supported",
            )),
            Expression::Call { .. } => Err(CompileError::new(
                "compilation of call expressions is not supported",
            )),
            Expression::Index { .. } => Err(CompileError::new(
                "compilation of index expressions is not supported",
            )),
            Expression::MacroLiteral { .. } => Err(CompileError::new(
                "compilation of macro literals is not supported",
            )),
        }
    }

    /// Append a constant to the pool. The pool is append-only; indices are
    /// what jump into `OpConstant` operands.
    fn add_constant(&mut self, object: Object) -> usize {
        self.constants.push(object);
        self.constants.len() - 1
    }

    /// Emit an instruction, returning its starting position.
    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let instruction = code::make(op, operands);
        let position = self.instructions.len();
        self.instructions.extend(instruction);
        self.set_last_instruction(op, position);
        position
    }

    fn set_last_instruction(&mut self, opcode: Opcode, position: usize) {
        self.previous_instruction = self.last_instruction;
        self.last_instruction = Some(EmittedInstruction { opcode, position });
    }

    fn last_instruction_is_pop(&self) -> bool {
        matches!(
            self.last_instruction,
            Some(EmittedInstruction {
                opcode: Opcode::Pop,
                ..
            })
        )
    }

    fn remove_last_instruction(&mut self) {
        if let Some(last) = self.last_instruction {
            self.instructions.truncate(last.position);
            self.last_instruction = self.previous_instruction;
            self.previous_instruction = None;
        }
    }

    /// Re-encode the instruction at `position` with a corrected operand.
    /// The new encoding has the same length by construction.
    fn change_operand(&mut self, position: usize, operand: usize) -> Result<(), CompileError> {
        let op = Opcode::try_from(self.instructions[position])
            .map_err(|message| CompileError { message })?;
        let instruction = code::make(op, &[operand]);
        self.instructions[position..position + instruction.len()].copy_from_slice(&instruction);
        Ok(())
    }
}
