use std::io;

/// Yes/no gate consulted before destructive or state-changing writes in
/// interactive mode. An empty answer counts as yes.
///
/// Answers are read on a blocking thread, so implementations may block.
pub trait Confirm: Send + Sync + 'static {
    fn confirm(&self, prompt: &str) -> io::Result<bool>;
}

/// Answers yes to everything; used for unattended runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> io::Result<bool> {
        Ok(true)
    }
}

impl<C: Confirm + ?Sized> Confirm for Box<C> {
    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        (**self).confirm(prompt)
    }
}
