//! Line Parser
//!
//! Turns one line of client text into a [`Command`] or a [`ParseError`].
//! The wire format is plain UTF-8, whitespace-separated, case-sensitive:
//!
//! | input          | result                              |
//! |----------------|-------------------------------------|
//! | `echo`         | `Command::Echo`                     |
//! | `toggle <n>`   | `Command::Toggle(n)`                |
//! | `set <n>`      | `Command::Set(n)`                   |
//! | `unset <n>`    | `Command::Unset(n)`                 |
//! | `random`       | `Command::Random`                   |
//! | `dropAll`      | `Command::DropAll`                  |
//! | `toggle` (bare)| `ParseError::MissingArgument`       |
//! | `set 1 2 3`    | `ParseError::Unrecognized`          |
//! | `toggle abc`   | `ParseError::BadNumber`             |
//!
//! Only `BadNumber` is ever surfaced to the client; the other variants
//! are server-side diagnostics. Parsing touches no hardware and no
//! connection state - it is a pure function from text to a value.

use crate::protocol::types::{Argument, Command};
use thiserror::Error;

/// Errors produced while parsing a command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A numeric verb was given a non-numeric argument. The offending
    /// token is reported back to the client verbatim.
    #[error("cannot parse \"{0}\"")]
    BadNumber(String),

    /// A numeric verb arrived with no argument. Logged, never sent.
    #[error("{0} requires a numeric argument")]
    MissingArgument(&'static str),

    /// Anything that matches no command shape. Logged, never sent.
    #[error("unrecognized command \"{0}\"")]
    Unrecognized(String),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parses one command line into a [`Command`].
///
/// The line is split on whitespace, so trailing newlines or padding from
/// interactive clients are harmless. An empty or all-whitespace line is
/// `Unrecognized`.
pub fn parse_line(line: &str) -> ParseResult<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.as_slice() {
        ["echo"] => Ok(Command::Echo),
        ["toggle"] => Err(ParseError::MissingArgument("toggle")),
        ["toggle", num] => parse_number(num).map(Command::Toggle),
        ["set"] => Err(ParseError::MissingArgument("set")),
        ["set", num] => parse_number(num).map(Command::Set),
        ["unset"] => Err(ParseError::MissingArgument("unset")),
        ["unset", num] => parse_number(num).map(Command::Unset),
        ["random"] => Ok(Command::Random),
        ["dropAll"] => Ok(Command::DropAll),
        _ => Err(ParseError::Unrecognized(line.trim().to_string())),
    }
}

/// Parses a base-10 argument token, preserving the raw text.
fn parse_number(token: &str) -> ParseResult<Argument> {
    token
        .parse::<i64>()
        .map(|value| Argument::new(token, value))
        .map_err(|_| ParseError::BadNumber(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_echo() {
        assert_eq!(parse_line("echo"), Ok(Command::Echo));
    }

    #[test]
    fn parse_toggle_with_index() {
        assert_eq!(
            parse_line("toggle 3"),
            Ok(Command::Toggle(Argument::new("3", 3)))
        );
    }

    #[test]
    fn parse_set_and_unset() {
        assert_eq!(parse_line("set 1"), Ok(Command::Set(Argument::new("1", 1))));
        assert_eq!(
            parse_line("unset 8"),
            Ok(Command::Unset(Argument::new("8", 8)))
        );
    }

    #[test]
    fn parse_sequences() {
        assert_eq!(parse_line("random"), Ok(Command::Random));
        assert_eq!(parse_line("dropAll"), Ok(Command::DropAll));
    }

    #[test]
    fn parse_missing_argument() {
        assert_eq!(parse_line("toggle"), Err(ParseError::MissingArgument("toggle")));
        assert_eq!(parse_line("set"), Err(ParseError::MissingArgument("set")));
        assert_eq!(parse_line("unset"), Err(ParseError::MissingArgument("unset")));
    }

    #[test]
    fn parse_bad_number_keeps_token() {
        assert_eq!(
            parse_line("toggle abc"),
            Err(ParseError::BadNumber("abc".to_string()))
        );
        assert_eq!(
            parse_line("set 1.5"),
            Err(ParseError::BadNumber("1.5".to_string()))
        );
    }

    #[test]
    fn parse_negative_and_zero_are_valid_numbers() {
        // Range policing happens in the command handler, not here
        assert_eq!(
            parse_line("toggle 0"),
            Ok(Command::Toggle(Argument::new("0", 0)))
        );
        assert_eq!(
            parse_line("set -2"),
            Ok(Command::Set(Argument::new("-2", -2)))
        );
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!(matches!(
            parse_line("ECHO"),
            Err(ParseError::Unrecognized(_))
        ));
        assert!(matches!(
            parse_line("dropall"),
            Err(ParseError::Unrecognized(_))
        ));
    }

    #[test]
    fn parse_unrecognized() {
        assert_eq!(
            parse_line("foo"),
            Err(ParseError::Unrecognized("foo".to_string()))
        );
        assert!(matches!(
            parse_line("echo twice"),
            Err(ParseError::Unrecognized(_))
        ));
        assert!(matches!(parse_line(""), Err(ParseError::Unrecognized(_))));
        assert!(matches!(
            parse_line("   "),
            Err(ParseError::Unrecognized(_))
        ));
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        assert_eq!(parse_line("  toggle 2\n"), Ok(Command::Toggle(Argument::new("2", 2))));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ParseError::BadNumber("x1".into()).to_string(),
            "cannot parse \"x1\""
        );
        assert_eq!(
            ParseError::MissingArgument("toggle").to_string(),
            "toggle requires a numeric argument"
        );
    }
}
