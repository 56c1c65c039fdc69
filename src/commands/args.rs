//! Positional argument reader for `!command` lines.
//!
//! Arguments are separated by whitespace; a double-quoted run is one
//! argument. [`Args::rest`] hands back the untouched remainder for commands
//! whose last parameter is free text.

use std::str::FromStr;

use crate::shared::errors::{BotError, BotResult};

#[derive(Debug, Clone)]
pub struct Args<'a> {
    remaining: &'a str,
}

impl<'a> Args<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            remaining: input.trim_start(),
        }
    }

    /// Next argument, with surrounding quotes removed.
    pub fn next_arg(&mut self) -> Option<String> {
        let input = self.remaining.trim_start();
        if input.is_empty() {
            self.remaining = input;
            return None;
        }

        if let Some(quoted) = input.strip_prefix('"') {
            if let Some(end) = quoted.find('"') {
                self.remaining = quoted[end + 1..].trim_start();
                return Some(quoted[..end].to_string());
            }
            // Unterminated quote: the rest of the line is the argument.
            self.remaining = "";
            return Some(quoted.to_string());
        }

        let end = input.find(char::is_whitespace).unwrap_or(input.len());
        self.remaining = input[end..].trim_start();
        Some(input[..end].to_string())
    }

    /// Peeks at the next argument without consuming it.
    pub fn peek(&self) -> Option<String> {
        self.clone().next_arg()
    }

    pub fn required(&mut self, name: &str) -> BotResult<String> {
        self.next_arg()
            .ok_or_else(|| BotError::validation(format!("Missing required argument: {}", name)))
    }

    pub fn parsed<T: FromStr>(&mut self, name: &str) -> BotResult<T> {
        let raw = self.required(name)?;
        raw.parse()
            .map_err(|_| BotError::validation(format!("Invalid argument provided for {}: {}", name, raw)))
    }

    pub fn parsed_opt<T: FromStr>(&mut self, name: &str) -> BotResult<Option<T>> {
        match self.next_arg() {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                BotError::validation(format!("Invalid argument provided for {}: {}", name, raw))
            }),
        }
    }

    /// Everything not yet consumed, trimmed. Quotes are kept as typed.
    pub fn rest(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.remaining).trim();
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    }

    pub fn rest_required(&mut self, name: &str) -> BotResult<String> {
        self.rest()
            .ok_or_else(|| BotError::validation(format!("Missing required argument: {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_and_quotes() {
        let mut args = Args::new(r#"  work   "big meeting" 2025-07-10 "#);
        assert_eq!(args.next_arg().as_deref(), Some("work"));
        assert_eq!(args.next_arg().as_deref(), Some("big meeting"));
        assert_eq!(args.next_arg().as_deref(), Some("2025-07-10"));
        assert_eq!(args.next_arg(), None);
    }

    #[test]
    fn test_rest_keeps_remainder_verbatim() {
        let mut args = Args::new(r#"work 2025-07-10 Call "Bob"  back"#);
        args.next_arg();
        args.next_arg();
        assert_eq!(args.rest().as_deref(), Some(r#"Call "Bob"  back"#));
        assert_eq!(args.rest(), None);
    }

    #[test]
    fn test_unterminated_quote_takes_rest() {
        let mut args = Args::new(r#""Castle of doom"#);
        assert_eq!(args.next_arg().as_deref(), Some("Castle of doom"));
    }

    #[test]
    fn test_missing_and_invalid_arguments() {
        let mut args = Args::new("abc");
        assert!(matches!(args.parsed::<i64>("task_number"), Err(BotError::Validation(_))));
        assert!(matches!(args.required("date"), Err(BotError::Validation(msg)) if msg.contains("date")));
    }

    #[test]
    fn test_optional_numbers() {
        let mut args = Args::new("150.5");
        assert_eq!(args.parsed_opt::<f64>("buy_below").unwrap(), Some(150.5));
        assert_eq!(args.parsed_opt::<f64>("sell_above").unwrap(), None);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut args = Args::new("in progress");
        assert_eq!(args.peek().as_deref(), Some("in"));
        assert_eq!(args.next_arg().as_deref(), Some("in"));
    }
}
