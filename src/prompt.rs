use crate::error::ConfigError;
use std::io::{BufRead, Write};
use tracing::debug;

/// Line-oriented prompts with a bracketed default.
///
/// Generic over the reader/writer so a scripted session can stand in for a
/// terminal.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Show `prompt [default]: `, read a line, fall back to `default` when empty.
    pub fn read_line(&mut self, prompt: &str, default: &str) -> Result<String, ConfigError> {
        write!(self.output, "{} [{}]: ", prompt, default)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ConfigError::InputClosed);
        }

        let line = line.trim();
        if line.is_empty() {
            debug!("{}: using default {:?}", prompt, default);
            Ok(default.to_string())
        } else {
            Ok(line.to_string())
        }
    }

    /// Keep asking until the answer is a non-negative integer.
    pub fn read_positive_integer(&mut self, prompt: &str, default: &str) -> Result<u64, ConfigError> {
        loop {
            let answer = self.read_line(prompt, default)?;

            match classify_integer(&answer) {
                IntegerAnswer::Value(value) => return Ok(value),
                IntegerAnswer::Negative => {
                    writeln!(self.output, "Sorry, input must be a positive integer, try again")?;
                }
                IntegerAnswer::TooLarge => {
                    writeln!(self.output, "Sorry, input must be at most {}, try again", u64::MAX)?;
                }
                IntegerAnswer::NotInteger => {
                    writeln!(self.output, "This is not an integer number, try again")?;
                }
            }
        }
    }
}

enum IntegerAnswer {
    Value(u64),
    Negative,
    TooLarge,
    NotInteger,
}

fn classify_integer(text: &str) -> IntegerAnswer {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return IntegerAnswer::NotInteger;
    }
    if negative && digits.bytes().any(|b| b != b'0') {
        return IntegerAnswer::Negative;
    }
    match digits.parse::<u64>() {
        Ok(value) => IntegerAnswer::Value(value),
        Err(_) => IntegerAnswer::TooLarge,
    }
}
