//! Borrowed command lines.
//!
//! A command line is a verb followed by whitespace-separated arguments:
//!
//! ```text
//! LOGIN <user> <pass>
//! SWITCH <user> <pass>
//! SEND <user> <text...>
//! MSG <text...>
//! FILE <name> [<size>]
//! EXIT
//! ```
//!
//! Parsing never fails. Argument-count checks belong to the command
//! handlers, which know the usage text to send back.

use std::fmt;

/// Recognized command verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `LOGIN <user> <pass>`
    Login,
    /// `SWITCH <user> <pass>`
    Switch,
    /// `SEND <user> <text...>`
    Send,
    /// `MSG <text...>`
    Msg,
    /// `FILE <name> [<size>]`
    File,
    /// `EXIT`
    Exit,
    /// Anything else, including blank lines.
    Unknown,
}

impl Verb {
    /// All verbs that name a real command.
    pub const KNOWN: [Verb; 6] = [
        Verb::Login,
        Verb::Switch,
        Verb::Send,
        Verb::Msg,
        Verb::File,
        Verb::Exit,
    ];

    /// Match a verb token, ignoring ASCII case.
    pub fn from_token(token: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|verb| verb.name().eq_ignore_ascii_case(token))
            .unwrap_or(Verb::Unknown)
    }

    /// Canonical upper-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Verb::Login => "LOGIN",
            Verb::Switch => "SWITCH",
            Verb::Send => "SEND",
            Verb::Msg => "MSG",
            Verb::File => "FILE",
            Verb::Exit => "EXIT",
            Verb::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed command line borrowing from the input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRef<'a> {
    verb: &'a str,
    kind: Verb,
    tail: &'a str,
    args: Vec<&'a str>,
}

impl<'a> CommandRef<'a> {
    /// Parse one line. Trailing `\r`/`\n` and surrounding whitespace are ignored.
    pub fn parse(line: &'a str) -> Self {
        let raw = line.trim();
        let (verb, tail) = match raw.find(char::is_whitespace) {
            Some(idx) => (&raw[..idx], raw[idx..].trim_start()),
            None => (raw, ""),
        };
        Self {
            verb,
            kind: Verb::from_token(verb),
            tail,
            args: tail.split_whitespace().collect(),
        }
    }

    /// The verb token exactly as the client wrote it.
    pub fn verb(&self) -> &'a str {
        self.verb
    }

    /// The recognized verb.
    pub fn kind(&self) -> Verb {
        self.kind
    }

    /// Argument `n` (zero-based, verb excluded).
    pub fn arg(&self, n: usize) -> Option<&'a str> {
        self.args.get(n).copied()
    }

    /// All arguments.
    pub fn args(&self) -> &[&'a str] {
        &self.args
    }

    /// Number of arguments after the verb.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Arguments from `n` onwards, joined with single spaces.
    pub fn joined_from(&self, n: usize) -> String {
        self.args.get(n..).map(|rest| rest.join(" ")).unwrap_or_default()
    }

    /// Everything after the verb with internal spacing preserved.
    pub fn tail(&self) -> &'a str {
        self.tail
    }
}
