use std::io;

use dialoguer::{Confirm as Prompt, console::Term};
use reelsync_core::Confirm;

/// Yes/no prompts on stderr, defaulting to yes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        Prompt::new()
            .with_prompt(prompt)
            .default(true)
            .interact_on(&Term::stderr())
            .map_err(io::Error::other)
    }
}
