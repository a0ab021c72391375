//! Interactive stdin prompts.
//!
//! The prompt flow mirrors the tool's interactive contract: free-form path
//! prompts, `[y/n]` questions that re-ask until answered, and a coverage
//! prompt bounded to 0–100. All readers take a generic `BufRead` so tests
//! can drive them from in-memory buffers.

use std::io::{self, BufRead, Write};

/// Prints `prompt` and reads one trimmed line.
///
/// End-of-input is an error rather than an empty answer, so looping
/// prompts cannot spin on a closed stdin.
pub fn prompt_line(input: &mut impl BufRead, prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed while waiting for an answer",
        ));
    }
    Ok(line.trim().to_string())
}

/// Asks a `[y/n]` question, re-prompting until the answer is `y` or `n`.
pub fn prompt_yes_no(input: &mut impl BufRead, prompt: &str) -> io::Result<bool> {
    loop {
        match prompt_line(input, prompt)?.as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => continue,
        }
    }
}

/// Asks for a coverage percentage, re-prompting until a number in
/// `[0, 100]` is entered.
pub fn prompt_coverage(input: &mut impl BufRead) -> io::Result<f64> {
    loop {
        let answer = prompt_line(input, "Minimum required coverage? (Value between 0-100): ")?;
        if let Ok(value) = answer.parse::<f64>() {
            if (0.0..=100.0).contains(&value) {
                return Ok(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn line_is_trimmed() {
        let mut input = Cursor::new("  netlist.txt  \n");
        assert_eq!(prompt_line(&mut input, "> ").unwrap(), "netlist.txt");
    }

    #[test]
    fn eof_is_an_error() {
        let mut input = Cursor::new("");
        let err = prompt_line(&mut input, "> ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn yes_no_accepts_y() {
        let mut input = Cursor::new("y\n");
        assert!(prompt_yes_no(&mut input, "? ").unwrap());
    }

    #[test]
    fn yes_no_accepts_n() {
        let mut input = Cursor::new("n\n");
        assert!(!prompt_yes_no(&mut input, "? ").unwrap());
    }

    #[test]
    fn yes_no_reasks_until_valid() {
        let mut input = Cursor::new("maybe\nyes\nY\ny\n");
        assert!(prompt_yes_no(&mut input, "? ").unwrap());
    }

    #[test]
    fn yes_no_eof_while_reasking_is_an_error() {
        let mut input = Cursor::new("maybe\n");
        assert!(prompt_yes_no(&mut input, "? ").is_err());
    }

    #[test]
    fn coverage_accepts_bounds() {
        let mut input = Cursor::new("0\n");
        assert_eq!(prompt_coverage(&mut input).unwrap(), 0.0);
        let mut input = Cursor::new("100\n");
        assert_eq!(prompt_coverage(&mut input).unwrap(), 100.0);
    }

    #[test]
    fn coverage_reasks_out_of_range_and_junk() {
        let mut input = Cursor::new("150\n-3\nlots\n92.5\n");
        assert_eq!(prompt_coverage(&mut input).unwrap(), 92.5);
    }
}
