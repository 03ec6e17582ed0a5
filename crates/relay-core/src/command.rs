//! Classification of message bodies into relay commands.

/// Exact body that ends a session.
pub const QUIT: &str = "/sair";
/// Body prefix requesting the roster.
pub const LIST_USERS: &str = "/usuarios";
/// Body prefix of a directed message: `/privado:<recipient>:<body>`.
pub const DIRECT_PREFIX: &str = "/privado:";

/// What a registered session's inbound body asks the relay to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Quit,
    ListUsers,
    /// Well-formed directed message. `recipient` is trimmed, `body` is not.
    Direct { recipient: &'a str, body: &'a str },
    /// `/privado:` without both a recipient and a body segment.
    MalformedDirect,
    /// Anything else; relayed verbatim.
    Text,
}

impl<'a> Command<'a> {
    pub fn parse(body: &'a str) -> Self {
        if body == QUIT {
            return Command::Quit;
        }
        if body.starts_with(LIST_USERS) {
            return Command::ListUsers;
        }
        if let Some(rest) = body.strip_prefix(DIRECT_PREFIX) {
            return match rest.split_once(':') {
                Some((recipient, body)) => Command::Direct {
                    recipient: recipient.trim(),
                    body,
                },
                None => Command::MalformedDirect,
            };
        }
        Command::Text
    }
}
