use std::collections::HashMap;

use crate::BotContext;

/// A resolved command call handed to its handler.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    /// Sender username with rank tags removed, original casing.
    pub sender: &'a str,
    /// Whitespace-separated arguments after the name.
    pub args: &'a [String],
    /// Registry the command was resolved from.
    pub registry: &'a CommandRegistry,
}

impl Invocation<'_> {
    /// First argument, or the sender when absent.
    pub fn target(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or(self.sender)
    }
}

/// Command body. Runs to completion; remote lookups are spawned, not awaited.
pub type Handler = fn(&mut BotContext, &Invocation<'_>);

/// One command and the names it answers to.
#[derive(Clone, Copy)]
pub struct Registration {
    /// Name recorded as "used" and listed in help.
    pub canonical: &'static str,
    /// Every name that routes here, canonical included.
    pub names: &'static [&'static str],
    /// Key of the toggle that enables this command.
    pub config_key: &'static str,
    /// Command body.
    pub handler: Handler,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("canonical", &self.canonical)
            .field("names", &self.names)
            .field("config_key", &self.config_key)
            .finish()
    }
}

/// Name → command lookup. Names are matched exactly after lowercasing.
#[derive(Debug, Default, Clone)]
pub struct CommandRegistry {
    by_name: HashMap<String, Registration>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under every name in `names`. A name registered twice
    /// points at the later registration.
    pub fn register(
        &mut self,
        names: &'static [&'static str],
        canonical: &'static str,
        config_key: &'static str,
        handler: Handler,
    ) {
        let registration = Registration {
            canonical,
            names,
            config_key,
            handler,
        };
        for name in names {
            self.by_name.insert(name.to_lowercase(), registration);
        }
        if !self.order.contains(&canonical) {
            self.order.push(canonical);
        }
    }

    /// Resolve a typed name.
    pub fn lookup(&self, name: &str) -> Option<&Registration> {
        self.by_name.get(&name.to_lowercase())
    }

    /// Distinct canonical names still reachable by some name, in registration order.
    pub fn canonical_names(&self) -> Vec<&'static str> {
        self.order
            .iter()
            .copied()
            .filter(|canonical| {
                self.by_name
                    .values()
                    .any(|registration| registration.canonical == *canonical)
            })
            .collect()
    }

    /// Registration for a canonical name.
    pub fn by_canonical(&self, canonical: &str) -> Option<&Registration> {
        self.by_name
            .values()
            .find(|registration| registration.canonical == canonical)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
