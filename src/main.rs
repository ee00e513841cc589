use std::panic;
use std::process;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use ibex::compiler::Compiler;
use ibex::environment::{self, Environment};
use ibex::evaluator;
use ibex::lexer::Lexer;
use ibex::macros::{define_macros, expand_macros};
use ibex::parser::Parser;
use ibex::vm::Vm;

const PROMPT: &str = "ibex> ";

fn main() {
    let result = panic::catch_unwind(|| {
        run_repl();
    });

    if let Err(panic_info) = result {
        eprintln!("The REPL encountered an unexpected error and must exit.");

        if let Some(message) = panic_info.downcast_ref::<&str>() {
            eprintln!("Error: {message}");
        } else if let Some(message) = panic_info.downcast_ref::<String>() {
            eprintln!("Error: {message}");
        } else {
            eprintln!("Error: unknown panic occurred");
        }

        process::exit(1);
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Backend {
    /// Tree-walking evaluation, the complete interpreter
    Eval,
    /// Compile + run on the bytecode VM (expression subset)
    Vm,
}

fn run_repl() {
    println!("Ibex expression language");
    println!("Enter statements like: let add = fn(x, y) {{ x + y }}; add(2, 3);");
    println!("Type :help for commands, or Ctrl+C to exit.");
    println!();

    let mut rl = DefaultEditor::new().expect("could not initialize line editor");
    let env = Environment::new();
    let macro_env = Environment::new();
    let mut backend = Backend::Eval;

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":vm" => {
                        backend = match backend {
                            Backend::Eval => {
                                println!("VM mode: inputs are compiled and run on the bytecode VM");
                                Backend::Vm
                            }
                            Backend::Vm => {
                                println!("Eval mode: inputs run on the tree-walking evaluator");
                                Backend::Eval
                            }
                        };
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                let mut parser = Parser::new(Lexer::new(line));
                let mut program = parser.parse_program();

                if !parser.errors().is_empty() {
                    println!("The ibex lost its footing! Parse errors:");
                    for error in parser.errors() {
                        println!("\t- {error}");
                    }
                    continue;
                }

                define_macros(&mut program, &macro_env);
                let expanded = expand_macros(program, &macro_env);

                match backend {
                    Backend::Eval => {
                        let result = evaluator::eval_program(&expanded, &env);
                        println!("{result}");
                    }
                    Backend::Vm => {
                        let mut compiler = Compiler::new();
                        if let Err(error) = compiler.compile(&expanded) {
                            println!("ERROR: {error}");
                            continue;
                        }

                        let mut vm = Vm::new(compiler.bytecode());
                        match vm.run() {
                            Ok(()) => println!("{}", vm.last_popped()),
                            Err(error) => println!("ERROR: {error}"),
                        }
                    }
                }

                // The REPL is idle between lines: reclaim closure cycles
                environment::sweep(&[&env, &macro_env]);
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  :help  - show this help message");
    println!("  :vm    - toggle between the evaluator and the bytecode VM");
    println!("  :quit  - exit (also :exit, Ctrl+C, or quit())");
    println!();
    println!("The language:");
    println!("  Literals:     5, true, \"text\", [1, 2, 3], {{\"key\": \"value\"}}");
    println!("  Bindings:     let x = 5;");
    println!("  Functions:    let add = fn(a, b) {{ a + b }}; add(2, 3);");
    println!("  Conditionals: if (x > 0) {{ x }} else {{ 0 - x }}");
    println!("  Builtins:     len, first, last, rest, push, puts, quit");
    println!("  Macros:       let unless = macro(c, t, e) {{ quote(if (!(unquote(c))) ...) }};");
    println!();
    println!("The VM backend covers the expression subset: integer and boolean");
    println!("arithmetic, comparisons, and conditionals.");
    println!();
}
