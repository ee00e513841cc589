//! The stack virtual machine: a fetch-decode-execute loop over compiled
//! bytecode and a fixed-capacity value stack.
//!
//! `sp` always points at the next free slot, so the top of stack is
//! `stack[sp - 1]`. Popping only decrements `sp`; the slot keeps its value,
//! which makes the "last popped" element observable. That element is the
//! result of an expression statement.

use std::fmt;

use crate::code::{self, Instructions, Opcode};
use crate::compiler::Bytecode;
use crate::object::{FALSE, NULL, Object, TRUE, boolean};

/// Maximum number of stack slots.
pub const STACK_SIZE: usize = 2048;

#[derive(Debug, Clone, PartialEq)]
pub struct VmError {
    pub message: String,
}

impl VmError {
    fn new(message: impl Into<String>) -> Self {
        VmError {
            message: message.into(),
        }
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for VmError {}

pub struct Vm {
    constants: Vec<Object>,
    instructions: Instructions,
    stack: Vec<Object>,
    /// Next free slot; the stack is empty when this is 0
    sp: usize,
}

impl Vm {
    pub fn new(bytecode: Bytecode) -> Self {
        Vm {
            constants: bytecode.constants,
            instructions: bytecode.instructions,
            stack: vec![NULL; STACK_SIZE],
            sp: 0,
        }
    }

    /// The element on top of the stack, if any.
    pub fn stack_top(&self) -> Option<&Object> {
        if self.sp == 0 {
            None
        } else {
            Some(&self.stack[self.sp - 1])
        }
    }

    /// The element most recently popped. Valid because popped slots are
    /// never cleared.
    pub fn last_popped(&self) -> &Object {
        &self.stack[self.sp]
    }

    pub fn run(&mut self) -> Result<(), VmError> {
        let mut ip = 0;

        while ip < self.instructions.len() {
            let op = Opcode::try_from(self.instructions[ip])
                .map_err(VmError::new)?;
            // Step over the opcode byte; operand reads advance further
            ip += 1;

            match op {
                Opcode::Constant => {
                    let index = code::read_u16(&self.instructions[ip..]) as usize;
                    ip += 2;
                    let constant = self
                        .constants
                        .get(index)
                        .cloned()
                        .ok_or_else(|| VmError::new(format!("no constant at index {index}")))?;
                    self.push(constant)?;
                }

                Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
                    self.execute_binary_operation(op)?;
                }

                Opcode::Eq | Opcode::NotEq => {
                    self.execute_equality(op)?;
                }

                Opcode::GreaterThan => {
                    let right = self.pop();
                    let left = self.pop();
                    match (&left, &right) {
                        (Object::Integer(l), Object::Integer(r)) => {
                            self.push(boolean(l > r))?;
                        }
                        _ => {
                            return Err(VmError::new(format!(
                                "type mismatch: {} > {}",
                                left.kind(),
                                right.kind()
                            )));
                        }
                    }
                }

                Opcode::Minus => {
                    let operand = self.pop();
                    match operand {
                        Object::Integer(value) => self.push(Object::Integer(value.wrapping_neg()))?,
                        other => {
                            return Err(VmError::new(format!(
                                "unsupported type for negation: {}",
                                other.kind()
                            )));
                        }
                    }
                }

                Opcode::Bang => {
                    // The VM's `!` table: everything that is not a boolean
                    // negates to false
                    let operand = self.pop();
                    let negated = match operand {
                        Object::Boolean(true) => FALSE,
                        Object::Boolean(false) => TRUE,
                        _ => FALSE,
                    };
                    self.push(negated)?;
                }

                Opcode::True => self.push(TRUE)?,
                Opcode::False => self.push(FALSE)?,

                Opcode::Pop => {
                    self.pop();
                }

                Opcode::Jump => {
                    ip = code::read_u16(&self.instructions[ip..]) as usize;
                }

                Opcode::JumpNotTruthy => {
                    let target = code::read_u16(&self.instructions[ip..]) as usize;
                    ip += 2;
                    let condition = self.pop();
                    if !condition.is_truthy() {
                        ip = target;
                    }
                }
            }
        }

        Ok(())
    }

    fn execute_binary_operation(&mut self, op: Opcode) -> Result<(), VmError> {
        let right = self.pop();
        let left = self.pop();

        let (Object::Integer(l), Object::Integer(r)) = (&left, &right) else {
            let symbol = match op {
                Opcode::Add => "+",
                Opcode::Sub => "-",
                Opcode::Mul => "*",
                _ => "/",
            };
            return Err(VmError::new(format!(
                "type mismatch: {} {symbol} {}",
                left.kind(),
                right.kind()
            )));
        };

        let result = match op {
            Opcode::Add => l.wrapping_add(*r),
            Opcode::Sub => l.wrapping_sub(*r),
            Opcode::Mul => l.wrapping_mul(*r),
            _ => {
                if *r == 0 {
                    return Err(VmError::new("division by zero"));
                }
                l.wrapping_div(*r)
            }
        };

        self.push(Object::Integer(result))
    }

    fn execute_equality(&mut self, op: Opcode) -> Result<(), VmError> {
        let right = self.pop();
        let left = self.pop();

        let equal = match (&left, &right) {
            (Object::Integer(l), Object::Integer(r)) => l == r,
            (Object::Boolean(l), Object::Boolean(r)) => l == r,
            _ => {
                let symbol = if op == Opcode::Eq { "==" } else { "!=" };
                return Err(VmError::new(format!(
                    "type mismatch: {} {symbol} {}",
                    left.kind(),
                    right.kind()
                )));
            }
        };

        let result = if op == Opcode::Eq { equal } else { !equal };
        self.push(boolean(result))
    }

    fn push(&mut self, object: Object) -> Result<(), VmError> {
        if self.sp >= STACK_SIZE {
            return Err(VmError::new("stack overflow"));
        }
        self.stack[self.sp] = object;
        self.sp += 1;
        Ok(())
    }

    /// Remove and return the top of stack. The slot is not cleared. An
    /// empty stack yields `null` and stays empty.
    fn pop(&mut self) -> Object {
        if self.sp == 0 {
            return NULL;
        }
        self.sp -= 1;
        self.stack[self.sp].clone()
    }
}
