//! Reads JSON-ish text on stdin and writes strict JSON on stdout.
//!
//! ```text
//! echo "{foo: 'bar', n: 0x1A,}" | cargo run --example scrub
//! ```

use std::io::{Read, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut input = Vec::new();
    if let Err(err) = std::io::stdin().read_to_end(&mut input) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    match jsonscrub::sanitize(&input) {
        Ok(out) => {
            let mut stdout = std::io::stdout().lock();
            if stdout.write_all(&out).and_then(|()| stdout.write_all(b"\n")).is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
