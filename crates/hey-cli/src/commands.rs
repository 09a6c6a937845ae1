/// What the positional arguments ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the interactive configuration editor.
    Config,
    /// Forget the stored conversation.
    Clear,
    /// Ask a question.
    Query(String),
    /// Nothing to do.
    Empty,
}

/// Exit statuses reported by the binary.
pub mod exit {
    pub const OK: u8 = 0;
    pub const REQUEST_FAILED: u8 = 1;
    pub const NO_QUERY: u8 = 2;
    pub const TOS_REQUIRED: u8 = 3;
    pub const INTERRUPTED: u8 = 130;
}

/// `config` and `clear` are only commands when they are the sole argument;
/// anything else is joined into a query.
pub fn parse_command(args: &[String]) -> Command {
    if let [single] = args {
        match single.as_str() {
            "config" => return Command::Config,
            "clear" => return Command::Clear,
            _ => {}
        }
    }

    let query = args.join(" ");
    if query.trim().is_empty() {
        Command::Empty
    } else {
        Command::Query(query)
    }
}
