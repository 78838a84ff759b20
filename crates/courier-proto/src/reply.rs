//! Server replies.
//!
//! Every line the server writes is one of these variants. Rendering is done
//! through `Display` and never includes the trailing newline; the codec adds it.

use std::fmt;

/// A single server-to-client line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `Closing connection...`
    Closing,
    /// `Login successful!`
    LoginOk,
    /// `Invalid credentials.`
    InvalidCredentials,
    /// `Invalid login format.`
    InvalidLoginFormat,
    /// `Already logged in as <user>.`
    AlreadyLoggedIn(String),
    /// `User <user> is already logged in.`
    UserBusy(String),
    /// `Please log in first.`
    LoginRequired,
    /// `Switched to <user>.`
    Switched(String),
    /// `Invalid credentials for switch.`
    InvalidSwitchCredentials,
    /// `Invalid switch format.`
    InvalidSwitchFormat,
    /// `Message sent to <user>.`
    MessageSent(String),
    /// `Recipient not found.`
    RecipientNotFound,
    /// `Invalid send format. Usage: SEND <username> <message>`
    InvalidSendFormat,
    /// `Message received: <text>`
    MessageReceived(String),
    /// `Invalid message format. Usage: MSG <text>`
    InvalidMsgFormat,
    /// `Received from another user: <text>`
    Delivered(String),
    /// `Ready to receive <name>`
    ReadyToReceive(String),
    /// `File <name> received (<n> bytes).`
    FileReceived {
        /// Client-supplied file name.
        name: String,
        /// Bytes persisted.
        bytes: u64,
    },
    /// `Invalid file transfer format.`
    InvalidFileFormat,
    /// `Invalid file name.`
    InvalidFileName,
    /// `File too large.`
    FileTooLarge,
    /// `File transfer failed.`
    FileTransferFailed,
    /// `Unknown command.`
    UnknownCommand,
    /// `Line too long.`
    LineTooLong,
    /// `Invalid encoding.`
    InvalidEncoding,
    /// `Command not available over datagram transport.`
    DatagramUnsupported,
    /// `Idle timeout.`
    IdleTimeout,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Closing => f.write_str("Closing connection..."),
            Reply::LoginOk => f.write_str("Login successful!"),
            Reply::InvalidCredentials => f.write_str("Invalid credentials."),
            Reply::InvalidLoginFormat => f.write_str("Invalid login format."),
            Reply::AlreadyLoggedIn(user) => write!(f, "Already logged in as {user}."),
            Reply::UserBusy(user) => write!(f, "User {user} is already logged in."),
            Reply::LoginRequired => f.write_str("Please log in first."),
            Reply::Switched(user) => write!(f, "Switched to {user}."),
            Reply::InvalidSwitchCredentials => f.write_str("Invalid credentials for switch."),
            Reply::InvalidSwitchFormat => f.write_str("Invalid switch format."),
            Reply::MessageSent(user) => write!(f, "Message sent to {user}."),
            Reply::RecipientNotFound => f.write_str("Recipient not found."),
            Reply::InvalidSendFormat => {
                f.write_str("Invalid send format. Usage: SEND <username> <message>")
            }
            Reply::MessageReceived(text) => write!(f, "Message received: {text}"),
            Reply::InvalidMsgFormat => f.write_str("Invalid message format. Usage: MSG <text>"),
            Reply::Delivered(text) => write!(f, "Received from another user: {text}"),
            Reply::ReadyToReceive(name) => write!(f, "Ready to receive {name}"),
            Reply::FileReceived { name, bytes } => {
                write!(f, "File {name} received ({bytes} bytes).")
            }
            Reply::InvalidFileFormat => f.write_str("Invalid file transfer format."),
            Reply::InvalidFileName => f.write_str("Invalid file name."),
            Reply::FileTooLarge => f.write_str("File too large."),
            Reply::FileTransferFailed => f.write_str("File transfer failed."),
            Reply::UnknownCommand => f.write_str("Unknown command."),
            Reply::LineTooLong => f.write_str("Line too long."),
            Reply::InvalidEncoding => f.write_str("Invalid encoding."),
            Reply::DatagramUnsupported => {
                f.write_str("Command not available over datagram transport.")
            }
            Reply::IdleTimeout => f.write_str("Idle timeout."),
        }
    }
}

impl From<Reply> for String {
    fn from(reply: Reply) -> Self {
        reply.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_texts() {
        assert_eq!(Reply::LoginOk.to_string(), "Login successful!");
        assert_eq!(
            Reply::AlreadyLoggedIn("user1".into()).to_string(),
            "Already logged in as user1."
        );
        assert_eq!(
            Reply::ReadyToReceive("notes.txt".into()).to_string(),
            "Ready to receive notes.txt"
        );
        assert_eq!(
            Reply::FileReceived {
                name: "a.bin".into(),
                bytes: 42
            }
            .to_string(),
            "File a.bin received (42 bytes)."
        );
        assert_eq!(
            Reply::Delivered("hi".into()).to_string(),
            "Received from another user: hi"
        );
    }
}
