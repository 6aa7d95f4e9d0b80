use anyhow::{Result, bail};
use rpassword::prompt_password;
use std::io::{self, BufRead, Write};

/// Read one non-empty line from the terminal.
pub fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim().to_string();
    if trimmed.is_empty() {
        bail!("input must not be empty");
    }
    Ok(trimmed)
}

/// Use `value` when given, otherwise ask for it.
pub fn value_or_prompt(value: Option<String>, message: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => prompt(message),
    }
}

/// Read a password without echo, or one line from stdin when `from_stdin` is set.
pub fn password(message: &str, from_stdin: bool) -> Result<String> {
    let password = if from_stdin {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_string()
    } else {
        prompt_password(message)?
    };
    if password.trim().is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}
