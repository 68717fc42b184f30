use anyhow::{anyhow, Result};
use std::io::{self, BufRead, Write};

/// Prints `message` (with an optional example) and reads one trimmed line.
///
/// Fails once stdin is closed.
pub fn prompt(message: &str, example: Option<&str>) -> Result<String> {
    read_prompt(message, example)?.ok_or_else(|| anyhow!("end of input"))
}

/// Like [`prompt`], but returns `None` when stdin is closed.
pub fn read_prompt(message: &str, example: Option<&str>) -> Result<Option<String>> {
    prompt_from(&mut io::stdin().lock(), &mut io::stdout(), message, example)
}

pub fn prompt_optional(message: &str, example: Option<&str>) -> Result<Option<String>> {
    let input = prompt(message, example)?;
    Ok((!input.is_empty()).then_some(input))
}

/// Asks a yes/no question. An empty answer takes `default`.
pub fn prompt_bool(message: &str, default: bool) -> Result<bool> {
    let input = prompt(
        &format!("{} (y/n)", message),
        Some(if default { "y" } else { "n" }),
    )?;
    Ok(parse_yes(&input, default))
}

/// Asks before a destructive action unless `assume_yes` was given.
pub fn confirm(action: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    prompt_bool(&format!("{action}? This cannot be undone."), false)
}

pub(crate) fn prompt_from(
    input: &mut impl BufRead,
    output: &mut impl Write,
    message: &str,
    example: Option<&str>,
) -> Result<Option<String>> {
    match example {
        Some(ex) => write!(output, "{} (e.g., {}): ", message, ex)?,
        None => write!(output, "{}: ", message)?,
    }
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn parse_yes(input: &str, default: bool) -> bool {
    if input.is_empty() {
        default
    } else {
        input.to_lowercase().starts_with('y')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn prompt_shows_example_and_trims() {
        let mut input = Cursor::new("  Electronics \n");
        let mut output = Vec::new();
        let answer = prompt_from(&mut input, &mut output, "Enter category", Some("Books")).unwrap();
        assert_eq!(answer.as_deref(), Some("Electronics"));
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Enter category (e.g., Books): "
        );
    }

    #[test]
    fn blank_line_is_an_empty_answer() {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();
        let answer = prompt_from(&mut input, &mut output, "Enter command", None).unwrap();
        assert_eq!(answer.as_deref(), Some(""));
    }

    #[test]
    fn closed_input_yields_none() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let answer = prompt_from(&mut input, &mut output, "Enter command", None).unwrap();
        assert_eq!(answer, None);
        assert_eq!(String::from_utf8(output).unwrap(), "Enter command: \n");
    }

    #[test]
    fn yes_no_answers() {
        assert!(parse_yes("", true));
        assert!(!parse_yes("", false));
        assert!(parse_yes("Yes", false));
        assert!(!parse_yes("nope", true));
    }

    #[test]
    fn assume_yes_skips_the_question() {
        assert!(confirm("Delete bucket 'demo'", true).unwrap());
    }
}
