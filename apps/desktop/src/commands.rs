//! Lines typed at the prompt: either keypad input or a `:command`.

use anyhow::{anyhow, bail, Result};
use client_core::{keys::parse_keys, Input};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Keys(Vec<Input>),
    RefreshHistory,
    ClearHistory,
    SetBase(String),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Ok(Self::Keys(parse_keys(line)?));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let command = match name {
            "history" | "refresh" | "r" => Self::RefreshHistory,
            "clear-history" | "ch" => Self::ClearHistory,
            "base" => {
                let url = parts
                    .next()
                    .ok_or_else(|| anyhow!("usage: :base <url>"))?;
                Self::SetBase(url.to_string())
            }
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => bail!("unknown command ':{other}' (try :help)"),
        };
        if parts.next().is_some() {
            bail!("too many arguments for ':{name}'");
        }
        Ok(command)
    }
}

pub const HELP: &str = "\
keys:     0-9  . or ,  + - * /  = or Enter  Backspace  Escape/esc/c (clear)  sign (+/-)
          tokens may be spaced (`1 2 + 3 Enter`) or compact (`12+3=`)
commands: :history      refresh history
          :clear-history  delete all stored history
          :base <url>   change the service address
          :help         show this text
          :quit         exit";
