use super::value::Flags;

/// A parsed command, created fresh for each dispatched message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    /// The matched command name.
    pub command: String,
    /// Positional arguments after the command name, in input order.
    pub args: Vec<String>,
    /// Flags keyed by canonical name.
    pub flags: Flags,
}

impl Invocation {
    /// Creates an invocation.
    pub fn new(command: impl Into<String>, args: Vec<String>, flags: Flags) -> Self {
        Self {
            command: command.into(),
            args,
            flags,
        }
    }

    /// Returns the positional argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}
