/// Operator confirmation capability.
///
/// The accumulator asks before every irreversible bulk mutation. A CLI
/// implementation prompts on the terminal; tests script the answers.
pub trait ConfirmationPolicy {
    /// Yes/no question.
    fn confirm(&self, message: &str) -> bool;

    /// Ask the operator to retype `expected`. Only an exact match returns `true`.
    fn challenge(&self, message: &str, expected: &str) -> bool;
}

impl<T: ConfirmationPolicy + ?Sized> ConfirmationPolicy for &T {
    fn confirm(&self, message: &str) -> bool {
        (**self).confirm(message)
    }

    fn challenge(&self, message: &str, expected: &str) -> bool {
        (**self).challenge(message, expected)
    }
}
