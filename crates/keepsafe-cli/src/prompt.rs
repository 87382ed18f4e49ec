//! Terminal input helpers.
//!
//! Prompts go to stderr so stdout stays clean for bare values captured by
//! shell substitution.

use std::io::{self, BufRead, Write};

use zeroize::Zeroizing;

/// Prompt on stderr and read one echoed line from stdin.
///
/// The trailing newline is stripped; an empty line comes back as an empty
/// string so callers can fall back to prior values.
pub fn read_line(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

/// Prompt on stderr and read a secret with terminal echo disabled.
///
/// Echo is restored on every exit path, and the returned buffer is zeroed
/// when dropped.
pub fn read_secret(prompt: &str) -> io::Result<Zeroizing<String>> {
    eprint!("{prompt}");
    io::stderr().flush()?;

    let secret = rpassword::read_password()?;
    eprintln!();
    Ok(Zeroizing::new(secret))
}
