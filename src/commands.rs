use std::fmt;

use chrono::{DateTime, Utc};
use sbechat_dispatch::Dispatcher;
use sbechat_store::{achievements, Store, ACHIEVEMENTS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

/// Which moderation list a command edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Blacklist,
    Block,
}

impl ListKind {
    fn label(self) -> &'static str {
        match self {
            Self::Blacklist => "blacklist",
            Self::Block => "block list",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    Add(String),
    Remove(String),
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteAction {
    Add(String),
    /// One-based index as shown by `list`.
    Remove(usize),
    List,
}

/// Local-only operator commands (`/scc ...`, `/scca`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Help,
    HelpCommands,
    List { kind: ListKind, action: ListAction },
    Quote(QuoteAction),
    Stats,
    Achievements,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub lines: Vec<String>,
}

pub fn execute_command(dispatcher: &mut Dispatcher, cmd: OperatorCommand) -> CommandOutput {
    let mut out = CommandOutput::default();
    match cmd {
        OperatorCommand::Help => out.lines.extend(help_lines()),
        OperatorCommand::HelpCommands => {
            let registry = dispatcher.registry();
            let toggles = &dispatcher.context().settings.commands;
            out.lines.push("Chat commands:".to_string());
            for canonical in registry.canonical_names() {
                let Some(reg) = registry.by_canonical(canonical) else {
                    continue;
                };
                let aliases: Vec<&str> = reg
                    .names
                    .iter()
                    .copied()
                    .filter(|name| *name != canonical)
                    .collect();
                let state = if toggles.is_enabled(reg.config_key) {
                    "on"
                } else {
                    "off"
                };
                if aliases.is_empty() {
                    out.lines.push(format!("  !{canonical} [{state}]"));
                } else {
                    out.lines
                        .push(format!("  !{canonical} ({}) [{state}]", aliases.join(", ")));
                }
            }
        }
        OperatorCommand::List { kind, action } => {
            let store = &mut dispatcher.context_mut().store;
            execute_list(store, kind, action, &mut out);
        }
        OperatorCommand::Quote(action) => {
            let store = &mut dispatcher.context_mut().store;
            execute_quote(store, action, &mut out);
        }
        OperatorCommand::Stats => {
            let store = &dispatcher.context().store;
            out.lines.extend(stats_lines(store));
        }
        OperatorCommand::Achievements => {
            let store = &dispatcher.context().store;
            out.lines.extend(achievement_lines(store));
        }
    }
    out
}

fn execute_list(store: &mut Store, kind: ListKind, action: ListAction, out: &mut CommandOutput) {
    let label = kind.label();
    match action {
        ListAction::Add(name) => {
            let added = match kind {
                ListKind::Blacklist => store.add_to_blacklist(&name),
                ListKind::Block => store.add_to_blocked(&name),
            };
            if added {
                out.lines.push(format!("Added {name} to the {label}"));
            } else {
                out.lines.push(format!("{name} is already on the {label}"));
            }
        }
        ListAction::Remove(name) => {
            let removed = match kind {
                ListKind::Blacklist => store.remove_from_blacklist(&name),
                ListKind::Block => store.remove_from_blocked(&name),
            };
            if removed {
                out.lines.push(format!("Removed {name} from the {label}"));
            } else {
                out.lines.push(format!("{name} is not on the {label}"));
            }
        }
        ListAction::List => {
            let names = match kind {
                ListKind::Blacklist => store.blacklist(),
                ListKind::Block => store.blocked_users(),
            };
            if names.is_empty() {
                out.lines.push(format!("The {label} is empty"));
            } else {
                out.lines
                    .push(format!("{} ({}): {}", capitalize(label), names.len(), names.join(", ")));
            }
        }
    }
}

fn execute_quote(store: &mut Store, action: QuoteAction, out: &mut CommandOutput) {
    match action {
        QuoteAction::Add(text) => {
            if store.add_quote(&text) {
                out.lines
                    .push(format!("Added quote #{}", store.quotes().len()));
            } else {
                out.lines.push("Error: quote is empty".to_string());
            }
        }
        QuoteAction::Remove(number) => match number
            .checked_sub(1)
            .and_then(|index| store.remove_quote(index))
        {
            Some(text) => out.lines.push(format!("Removed quote #{number}: \"{text}\"")),
            None => out.lines.push(format!("Error: no quote #{number}")),
        },
        QuoteAction::List => {
            if store.quotes().is_empty() {
                out.lines.push("No quotes yet".to_string());
            }
            for (i, text) in store.quotes().iter().enumerate() {
                out.lines.push(format!("#{} \"{text}\"", i + 1));
            }
        }
    }
}

fn stats_lines(store: &Store) -> Vec<String> {
    let record = store.record();
    let last_reply = match store.last_meow_response().0 {
        0 => "never".to_string(),
        ms => i64::try_from(ms)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    };
    let unlocked = ACHIEVEMENTS
        .iter()
        .filter(|def| store.is_unlocked(def.id))
        .count();
    vec![
        format!("Total meows: {}", store.total_meows()),
        format!("Your meows: {}", store.personal_meows()),
        format!("Last meow reply: {last_reply}"),
        format!(
            "Blacklisted: {} | Blocked: {} | Quotes: {}",
            record.blacklisted_users.len(),
            record.blocked_users.len(),
            record.quotes.len()
        ),
        format!("Achievements: {unlocked}/{}", ACHIEVEMENTS.len()),
    ]
}

fn achievement_lines(store: &Store) -> Vec<String> {
    let mut lines = vec!["Achievements:".to_string()];
    for def in ACHIEVEMENTS {
        let mark = if store.is_unlocked(def.id) { "x" } else { " " };
        let progress = match achievements::progress(store, def) {
            Some(p) if !store.is_unlocked(def.id) => format!(" ({}/{})", p.current, p.required),
            _ => String::new(),
        };
        lines.push(format!("[{mark}] {} - {}{progress}", def.name, def.description));
    }
    lines
}

pub fn parse_command(input: &str) -> Result<OperatorCommand, CommandError> {
    let input = input.trim();
    let input = input.strip_prefix('/').unwrap_or(input).trim();

    let mut parts = input.split_whitespace();
    let cmd = parts
        .next()
        .ok_or_else(|| CommandError::new("Missing command"))?
        .to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    match cmd.as_str() {
        "scca" => Ok(OperatorCommand::Achievements),
        "scc" => parse_scc_command(&args),
        _ => Err(CommandError::new(format!(
            "Unknown command: {cmd}. Try /scc help"
        ))),
    }
}

fn parse_scc_command(args: &[&str]) -> Result<OperatorCommand, CommandError> {
    let Some(sub) = args.first() else {
        return Ok(OperatorCommand::Help);
    };
    let rest = &args[1..];
    match sub.to_ascii_lowercase().as_str() {
        "help" | "?" => match rest.first().map(|s| s.to_ascii_lowercase()).as_deref() {
            None => Ok(OperatorCommand::Help),
            Some("commands") => Ok(OperatorCommand::HelpCommands),
            Some(_) => Err(CommandError::new("Usage: /scc help [commands]")),
        },
        "blacklist" | "bl" => parse_list_command(ListKind::Blacklist, "blacklist", rest),
        "block" => parse_list_command(ListKind::Block, "block", rest),
        "quote" | "quotes" => parse_quote_command(rest),
        "stats" => Ok(OperatorCommand::Stats),
        "achievements" => Ok(OperatorCommand::Achievements),
        other => Err(CommandError::new(format!(
            "Unknown subcommand: {other}. Try /scc help"
        ))),
    }
}

fn parse_list_command(
    kind: ListKind,
    name: &str,
    args: &[&str],
) -> Result<OperatorCommand, CommandError> {
    let usage = || CommandError::new(format!("Usage: /scc {name} <add|remove|list> [user]"));
    let action = match (args.first().map(|s| s.to_ascii_lowercase()).as_deref(), args.len()) {
        (None, _) | (Some("list"), 1) => ListAction::List,
        (Some("add"), 2) => ListAction::Add(args[1].to_string()),
        (Some("remove") | Some("rm"), 2) => ListAction::Remove(args[1].to_string()),
        _ => return Err(usage()),
    };
    Ok(OperatorCommand::List { kind, action })
}

fn parse_quote_command(args: &[&str]) -> Result<OperatorCommand, CommandError> {
    let usage = || CommandError::new("Usage: /scc quote <add <text>|remove <n>|list>");
    let Some(sub) = args.first() else {
        return Ok(OperatorCommand::Quote(QuoteAction::List));
    };
    let rest = &args[1..];
    match sub.to_ascii_lowercase().as_str() {
        "add" => {
            if rest.is_empty() {
                return Err(usage());
            }
            Ok(OperatorCommand::Quote(QuoteAction::Add(rest.join(" "))))
        }
        "remove" | "rm" => {
            if rest.len() != 1 {
                return Err(usage());
            }
            let number = rest[0]
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| CommandError::new("Invalid quote number"))?;
            Ok(OperatorCommand::Quote(QuoteAction::Remove(number)))
        }
        "list" if rest.is_empty() => Ok(OperatorCommand::Quote(QuoteAction::List)),
        _ => Err(usage()),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn help_lines() -> Vec<String> {
    vec![
        "SBE Chat Commands:".to_string(),
        "  /scc help                          this list".to_string(),
        "  /scc help commands                 chat commands and their state".to_string(),
        "  /scc blacklist <add|remove|list> [user]   users whose commands are ignored"
            .to_string(),
        "  /scc block <add|remove|list> [user]       users hidden from chat".to_string(),
        "  /scc quote <add <text>|remove <n>|list>".to_string(),
        "  /scc stats                         counters and list sizes".to_string(),
        "  /scca                              achievement progress".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use sbechat_core::{ChatEvent, ManualClock, Millis, Outbox};
    use sbechat_dispatch::{BotContext, DispatchSettings};
    use sbechat_templates::TemplateEngine;
    use sbechat_testkit::{sample_catalog, scratch_store, CannedStats};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn dispatcher() -> (TempDir, Dispatcher) {
        let (dir, store) = scratch_store();
        let (outbox, _rx) = Outbox::channel();
        let settings = DispatchSettings {
            operator: "Operator".to_string(),
            ..DispatchSettings::default()
        };
        let ctx = BotContext::new(
            settings,
            store,
            TemplateEngine::new(sample_catalog()),
            Arc::new(CannedStats::new()),
            outbox,
            Box::new(ManualClock::starting_at(Millis(0))),
            StdRng::seed_from_u64(1),
        );
        (dir, Dispatcher::with_builtins(ctx))
    }

    fn run(dispatcher: &mut Dispatcher, input: &str) -> Vec<String> {
        let cmd = parse_command(input).unwrap();
        execute_command(dispatcher, cmd).lines
    }

    #[test]
    fn parses_scc_subcommands() {
        assert_eq!(parse_command("/scc").unwrap(), OperatorCommand::Help);
        assert_eq!(
            parse_command("scc HELP commands").unwrap(),
            OperatorCommand::HelpCommands
        );
        assert_eq!(
            parse_command("/scc blacklist add Steve").unwrap(),
            OperatorCommand::List {
                kind: ListKind::Blacklist,
                action: ListAction::Add("Steve".to_string())
            }
        );
        assert_eq!(
            parse_command("/scc block").unwrap(),
            OperatorCommand::List {
                kind: ListKind::Block,
                action: ListAction::List
            }
        );
        assert_eq!(
            parse_command("/scc quote add  never   dig down ").unwrap(),
            OperatorCommand::Quote(QuoteAction::Add("never dig down".to_string()))
        );
        assert_eq!(parse_command("/scca").unwrap(), OperatorCommand::Achievements);
    }

    #[test]
    fn usage_errors() {
        assert_eq!(
            parse_command("/scc blacklist add").unwrap_err().to_string(),
            "Usage: /scc blacklist <add|remove|list> [user]"
        );
        assert_eq!(
            parse_command("/scc quote remove 0").unwrap_err().to_string(),
            "Invalid quote number"
        );
        assert!(parse_command("/scc launch").is_err());
        assert!(parse_command("/tp 1 2 3").is_err());
        assert!(parse_command("").is_err());
    }

    #[test]
    fn blacklist_round_trip() {
        let (_dir, mut d) = dispatcher();
        assert_eq!(
            run(&mut d, "/scc blacklist add Steve"),
            ["Added Steve to the blacklist"]
        );
        assert_eq!(
            run(&mut d, "/scc blacklist add STEVE"),
            ["STEVE is already on the blacklist"]
        );
        assert_eq!(run(&mut d, "/scc blacklist list"), ["Blacklist (1): steve"]);
        assert!(d.context().store.is_blacklisted("steve"));
        assert_eq!(
            run(&mut d, "/scc blacklist remove steve"),
            ["Removed steve from the blacklist"]
        );
        assert_eq!(run(&mut d, "/scc blacklist"), ["The blacklist is empty"]);
    }

    #[test]
    fn block_list_hides_sender() {
        let (_dir, mut d) = dispatcher();
        run(&mut d, "/scc block add Griefer");
        assert!(d
            .handle(&ChatEvent::new("[VIP] Griefer", "hi"))
            .cancels_display());
    }

    #[test]
    fn quotes_are_numbered_from_one() {
        let (_dir, mut d) = dispatcher();
        assert_eq!(run(&mut d, "/scc quote add first"), ["Added quote #1"]);
        assert_eq!(run(&mut d, "/scc quote add second"), ["Added quote #2"]);
        assert_eq!(
            run(&mut d, "/scc quote list"),
            ["#1 \"first\"", "#2 \"second\""]
        );
        assert_eq!(
            run(&mut d, "/scc quote remove 1"),
            ["Removed quote #1: \"first\""]
        );
        assert_eq!(run(&mut d, "/scc quote remove 5"), ["Error: no quote #5"]);
        assert_eq!(d.context().store.quotes(), ["second"]);
    }

    #[test]
    fn help_commands_shows_aliases_and_state() {
        let (_dir, mut d) = dispatcher();
        d.context_mut().settings.commands.set("cf_command", false);
        let lines = run(&mut d, "/scc help commands");
        assert_eq!(lines[0], "Chat commands:");
        assert_eq!(lines[1], "  !rng [on]");
        assert_eq!(lines[2], "  !cf (coinflip) [off]");
        assert_eq!(lines.len(), d.registry().canonical_names().len() + 1);
    }

    #[test]
    fn stats_and_achievements_reflect_store() {
        let (_dir, mut d) = dispatcher();
        for _ in 0..3 {
            d.handle(&ChatEvent::new("Operator", "meow"));
        }
        let stats = run(&mut d, "/scc stats");
        assert_eq!(stats[0], "Total meows: 3");
        assert_eq!(stats[1], "Your meows: 3");
        assert_eq!(stats[2], "Last meow reply: never");
        assert_eq!(stats[4], format!("Achievements: 1/{}", ACHIEVEMENTS.len()));

        let lines = run(&mut d, "/scca");
        assert!(lines.iter().any(|l| l.starts_with("[x] Breaking the Ice - ")));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("[ ] Beginner Catversation") && l.ends_with("(3/10)")));
    }
}
