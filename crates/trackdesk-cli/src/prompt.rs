//! Terminal prompts via `dialoguer`.

use anyhow::Context;
use dialoguer::{Confirm, Input, Password};
use trackdesk_scan::ConfirmationPolicy;

/// Asks the operator on the terminal. A prompt that cannot be shown counts as "no".
pub struct TerminalPrompt;

impl ConfirmationPolicy for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    fn challenge(&self, message: &str, expected: &str) -> bool {
        Input::<String>::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .is_ok_and(|typed| typed == expected)
    }
}

pub fn text(prompt: &str) -> anyhow::Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()
        .with_context(|| format!("reading {prompt}"))
}

pub fn password(prompt: &str) -> anyhow::Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .context("reading password")
}

/// Ask twice, repeating until both entries match.
pub fn new_password(prompt: &str) -> anyhow::Result<String> {
    Password::new()
        .with_prompt(prompt)
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .context("reading password")
}
