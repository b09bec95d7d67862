// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! User prompts.
//!
//! Everything that asks the user a question goes through [`Prompter`] so the
//! login flow can run against scripted answers in tests.

use std::io::{self, BufRead, IsTerminal, Write};

use dialoguer::{Confirm, Input, Password};

/// Source of interactive answers.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Whether a person is there to answer.
    fn is_interactive(&self) -> bool;

    /// Show an informational line.
    fn message(&self, text: &str);

    fn prompt_string(&self, prompt: &str) -> io::Result<String>;

    /// Empty input yields `default`.
    fn prompt_string_with_default(&self, prompt: &str, default: &str) -> io::Result<String>;

    /// Input is not echoed.
    fn prompt_password(&self, prompt: &str) -> io::Result<String>;

    fn prompt_bool(&self, prompt: &str, default: bool) -> io::Result<bool>;
}

/// Prompts on the controlling terminal.
///
/// When stdin is not a terminal, answers are read line by line from stdin
/// without echoing a prompt, so input can be piped in.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl Prompter for TerminalPrompter {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn message(&self, text: &str) {
        let mut stderr = io::stderr();
        let _ = writeln!(stderr, "{}", text);
    }

    fn prompt_string(&self, prompt: &str) -> io::Result<String> {
        if !self.is_interactive() {
            return self.read_line();
        }
        Ok(Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?)
    }

    fn prompt_string_with_default(&self, prompt: &str, default: &str) -> io::Result<String> {
        if !self.is_interactive() {
            let answer = self.read_line()?;
            return Ok(if answer.is_empty() {
                default.to_string()
            } else {
                answer
            });
        }
        Ok(Input::<String>::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .interact_text()
            .map_err(prompt_error)?)
    }

    fn prompt_password(&self, prompt: &str) -> io::Result<String> {
        if !self.is_interactive() {
            return self.read_line();
        }
        Ok(Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(prompt_error)?)
    }

    fn prompt_bool(&self, prompt: &str, default: bool) -> io::Result<bool> {
        if !self.is_interactive() {
            return Ok(parse_bool(&self.read_line()?).unwrap_or(default));
        }
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(prompt_error)?)
    }
}

fn prompt_error(err: dialoguer::Error) -> io::Error {
    io::Error::other(err)
}

/// Yes/no answers as typed at a prompt. Anything else is `None`.
pub fn parse_bool(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}
