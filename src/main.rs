use std::io::{self, BufRead, Write};

use minnow::Interpreter;

fn repl(interpreter: &mut Interpreter) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        write!(stdout, "in> ")?;
        stdout.flush()?;

        let Some(line) = lines.next().transpose()? else {
            return Ok(());
        };
        let line = line.trim();
        if line == "QUIT" {
            return Ok(());
        }
        if line.is_empty() {
            continue;
        }

        // Errors are terminal for the expression, not for the session.
        match interpreter.evaluate_str(line) {
            Ok(value) => println!("out> {}", value),
            Err(error) => println!("out> {}", error),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let mut interpreter = Interpreter::new();

    // Any paths on the command line are evaluated into the session
    // environment before the REPL starts.
    for path in std::env::args().skip(1) {
        let source = std::fs::read_to_string(&path)?;
        interpreter
            .evaluate_str(&source)
            .map_err(|error| anyhow::anyhow!("{}: {}", path, error))?;
    }

    repl(&mut interpreter)
}
