//! Command grammar for filename-derived command strings.
//!
//! A command file's stem is `<name>` or `<name>@<arg1>&<arg2>&...`. The
//! grammar has no quoting or escaping: only the first `@` separates the
//! name from the argument list (later `@` characters are argument text),
//! and an argument containing `&` is not representable.

/// A parsed command: its name and ordered argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

/// Parse a command string into a name and ordered arguments.
///
/// Without an `@` the whole string is the name and the argument list is
/// empty. `parse("cmd@")` yields one empty argument, and adjacent `&`
/// separators likewise yield empty arguments; neither is validated here.
pub fn parse(text: &str) -> Command {
    match text.split_once('@') {
        None => Command {
            name: text.to_string(),
            args: Vec::new(),
        },
        Some((name, rest)) => Command {
            name: name.to_string(),
            args: rest.split('&').map(str::to_string).collect(),
        },
    }
}
