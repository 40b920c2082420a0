//! Keyboard surface: maps key names to calculator inputs.

use shared::domain::Operator;
use thiserror::Error;

use crate::calculator::Input;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key '{0}'")]
pub struct UnknownKey(pub String);

/// Maps a single key name to its input.
///
/// Accepts the browser-style names (`"0"`..`"9"`, `"."`, `"Backspace"`,
/// `"Escape"`, `"Enter"`, `"="`, `"+"`, `"-"`, `"*"`, `"/"`) plus a few
/// lowercase aliases for typing in a terminal, including `sign` for the
/// keypad's sign toggle.
pub fn input_for_key(key: &str) -> Option<Input> {
    let input = match key {
        "." | "," => Input::Decimal,
        "Backspace" | "backspace" | "bs" => Input::Backspace,
        "Escape" | "escape" | "esc" | "clear" | "c" => Input::Clear,
        "Enter" | "enter" | "=" => Input::Equals,
        "sign" | "neg" | "±" => Input::ToggleSign,
        "×" => Input::Operator(Operator::Multiply),
        "÷" => Input::Operator(Operator::Divide),
        other => {
            if let Ok(op) = other.parse::<Operator>() {
                Input::Operator(op)
            } else {
                let mut chars = other.chars();
                let digit = chars.next()?.to_digit(10)?;
                if chars.next().is_some() {
                    return None;
                }
                Input::Digit(digit as u8)
            }
        }
    };
    Some(input)
}

/// Splits a typed line into inputs.
///
/// Whitespace-separated tokens are looked up as key names first; a token
/// that is not a key name is read character by character, so `12+3=` and
/// `1 2 + 3 Enter` are equivalent.
pub fn parse_keys(line: &str) -> Result<Vec<Input>, UnknownKey> {
    let mut inputs = Vec::new();
    for token in line.split_whitespace() {
        if let Some(input) = input_for_key(token) {
            inputs.push(input);
            continue;
        }
        for ch in token.chars() {
            let mut buf = [0u8; 4];
            let input =
                input_for_key(ch.encode_utf8(&mut buf)).ok_or_else(|| UnknownKey(token.into()))?;
            inputs.push(input);
        }
    }
    Ok(inputs)
}
