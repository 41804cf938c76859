//! Line-oriented transport: stdin lines in, rendered outbound messages out.

use sbechat_core::{ChatEvent, Outbound};

const CHANNEL_PREFIX: &str = "SBE Chat > ";

/// One line read from the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// A channel message.
    Chat(ChatEvent),
    /// A local operator command, without the leading `/`.
    Operator(String),
    /// Blank or unparsable line.
    Skip,
}

/// Parse `[SBE Chat > ][TAG ]Name: message`, or `/command` for the operator.
pub fn parse_line(line: &str) -> ConsoleInput {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ConsoleInput::Skip;
    }
    if let Some(command) = trimmed.strip_prefix('/') {
        return ConsoleInput::Operator(command.trim().to_string());
    }

    let body = trimmed.strip_prefix(CHANNEL_PREFIX).unwrap_or(trimmed);
    let Some((sender, message)) = body.split_once(": ") else {
        return ConsoleInput::Skip;
    };
    let sender = sender.trim();
    if sender.is_empty() {
        return ConsoleInput::Skip;
    }
    ConsoleInput::Chat(ChatEvent::new(sender, message))
}

/// Text written to stdout for an outbound message.
pub fn render(item: &Outbound) -> String {
    match item {
        Outbound::Chat(text) => format!("sbechat {text}"),
        Outbound::ClientCommand(command) => format!("/{command}"),
        Outbound::Notice(text) => format!("[local] {text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_channel_lines() {
        assert_eq!(
            parse_line("SBE Chat > [MVP+] Alex: !rng Hyperion\n"),
            ConsoleInput::Chat(ChatEvent::new("[MVP+] Alex", "!rng Hyperion"))
        );
        assert_eq!(
            parse_line("Steve: meow"),
            ConsoleInput::Chat(ChatEvent::new("Steve", "meow"))
        );
    }

    #[test]
    fn message_keeps_later_colons() {
        assert_eq!(
            parse_line("Alex: time is 10: 30"),
            ConsoleInput::Chat(ChatEvent::new("Alex", "time is 10: 30"))
        );
    }

    #[test]
    fn slash_lines_are_operator_commands() {
        assert_eq!(
            parse_line("  /scc blacklist add Steve "),
            ConsoleInput::Operator("scc blacklist add Steve".to_string())
        );
    }

    #[test]
    fn skips_noise() {
        assert_eq!(parse_line(""), ConsoleInput::Skip);
        assert_eq!(parse_line("   "), ConsoleInput::Skip);
        assert_eq!(parse_line("no separator here"), ConsoleInput::Skip);
        assert_eq!(parse_line(": orphan"), ConsoleInput::Skip);
    }

    #[test]
    fn renders_each_kind() {
        assert_eq!(render(&Outbound::Chat("[SCC] hi".into())), "sbechat [SCC] hi");
        assert_eq!(
            render(&Outbound::ClientCommand("party Alex".into())),
            "/party Alex"
        );
        assert_eq!(render(&Outbound::Notice("saved".into())), "[local] saved");
    }
}
