use sbechat_core::{strip_rank_tags, ChatEvent, Username};
use sbechat_store::Trigger;
use tracing::{debug, info};

use crate::moderation::{CooldownCheck, ModerationGate};
use crate::{handlers, BotContext, CommandRegistry, Invocation};

/// Why a line was hidden from the local chat view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// A `!` command while command messages are hidden.
    HiddenCommand,
    /// A bot response while command outputs are hidden.
    HiddenOutput,
    /// The sender is on the block list.
    Blocked,
}

/// Why a line produced no command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Plain chat.
    NotACommand,
    /// The sender is blacklisted.
    Blacklisted,
    /// Commands are switched off globally.
    CommandsDisabled,
    /// No command by that name.
    UnknownCommand,
    /// Accepted (cooldown stamped, usage recorded) but the command's toggle is off.
    CommandDisabled,
    /// The sender is still cooling down.
    Cooldown,
}

/// What happened to one chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Hide the line; nothing else happened.
    Suppressed(SuppressReason),
    /// The line was a meow and was counted.
    MeowHandled,
    /// A command ran.
    CommandRouted {
        /// Canonical name of the command.
        command: &'static str,
    },
    /// Nothing to do.
    Ignored(IgnoreReason),
}

impl Disposition {
    /// Whether the transport should cancel the line's display.
    pub fn cancels_display(self) -> bool {
        matches!(self, Self::Suppressed(_))
    }
}

const WELCOME_LINES: &[&str] = &[
    "Welcome to SBE Chat Commands!",
    "/scc help - Display all available commands",
    "/scc help commands - Display all SBE Chat commands",
    "/scc blacklist - Manage blacklisted users",
    "/scc block - Manage blocked users",
    "/scca - Display achievements",
    "TIP: Type !commands in SBE chat to list what everyone can use.",
];

/// Classifies chat lines and routes commands. Processes one line at a time.
pub struct Dispatcher {
    ctx: BotContext,
    registry: CommandRegistry,
    gate: ModerationGate,
}

impl Dispatcher {
    /// Dispatcher over a custom registry.
    pub fn new(ctx: BotContext, registry: CommandRegistry) -> Self {
        let gate = ModerationGate::new(ctx.settings.command_cooldown_ms);
        Self {
            ctx,
            registry,
            gate,
        }
    }

    /// Dispatcher with the built-in commands.
    pub fn with_builtins(ctx: BotContext) -> Self {
        Self::new(ctx, handlers::builtin_registry())
    }

    /// Shared state.
    pub fn context(&self) -> &BotContext {
        &self.ctx
    }

    /// Mutable shared state, for operator commands.
    pub fn context_mut(&mut self) -> &mut BotContext {
        &mut self.ctx
    }

    /// Command table.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Cooldown table.
    pub fn gate(&self) -> &ModerationGate {
        &self.gate
    }

    /// Run the first-install welcome once. Returns whether it ran.
    pub fn startup(&mut self) -> bool {
        if self.ctx.store.first_install_done() {
            return false;
        }
        for line in WELCOME_LINES {
            self.ctx.notice(*line);
        }
        self.ctx.store.mark_first_install();
        self.ctx.unlock(Trigger::FirstInstall);
        info!("first install welcome shown");
        true
    }

    /// Classify and act on one chat line.
    pub fn handle(&mut self, event: &ChatEvent) -> Disposition {
        let message = event.message.as_str();
        let settings = &self.ctx.settings;

        if settings.hide_command_messages && message.starts_with('!') {
            return Disposition::Suppressed(SuppressReason::HiddenCommand);
        }
        if settings.hide_command_outputs
            && !settings.response_marker.is_empty()
            && message.contains(settings.response_marker.as_str())
        {
            return Disposition::Suppressed(SuppressReason::HiddenOutput);
        }

        let sender = strip_rank_tags(&event.sender);
        if self.ctx.store.is_blocked(sender) {
            return Disposition::Suppressed(SuppressReason::Blocked);
        }

        let is_operator = self.ctx.is_operator(sender);
        if is_operator && self.ctx.store.mark_first_message() {
            self.ctx.unlock(Trigger::FirstMessage);
        }

        if message.trim().eq_ignore_ascii_case("meow") {
            self.handle_meow(sender, is_operator);
            return Disposition::MeowHandled;
        }

        let Some(body) = message.strip_prefix('!') else {
            return Disposition::Ignored(IgnoreReason::NotACommand);
        };
        if self.ctx.store.is_blacklisted(sender) {
            return Disposition::Ignored(IgnoreReason::Blacklisted);
        }
        if !self.ctx.settings.enable_all_commands {
            return Disposition::Ignored(IgnoreReason::CommandsDisabled);
        }

        let mut tokens = body.split_whitespace();
        let Some(name) = tokens.next().map(str::to_lowercase) else {
            return Disposition::Ignored(IgnoreReason::UnknownCommand);
        };
        let args: Vec<String> = tokens.map(str::to_string).collect();

        let Some(registration) = self.registry.lookup(&name).copied() else {
            return Disposition::Ignored(IgnoreReason::UnknownCommand);
        };

        let user = Username::new(sender);
        let now = self.ctx.now();
        let check = self.gate.check(&user, now);
        if let CooldownCheck::Cooling { .. } = check {
            if is_operator {
                self.ctx.notice(format!(
                    "Please wait {} seconds before using another command!",
                    check.remaining_secs()
                ));
            }
            debug!(user = %user, command = registration.canonical, "command on cooldown");
            return Disposition::Ignored(IgnoreReason::Cooldown);
        }

        self.gate.stamp(user, now);
        if is_operator && self.ctx.store.add_used_command(registration.canonical) {
            self.ctx.unlock(Trigger::CommandMaster);
        }
        if !self
            .ctx
            .settings
            .commands
            .is_enabled(registration.config_key)
        {
            debug!(sender, command = registration.canonical, "command switched off");
            return Disposition::Ignored(IgnoreReason::CommandDisabled);
        }

        debug!(sender, command = registration.canonical, "routing command");
        let invocation = Invocation {
            sender,
            args: &args,
            registry: &self.registry,
        };
        (registration.handler)(&mut self.ctx, &invocation);
        Disposition::CommandRouted {
            command: registration.canonical,
        }
    }

    fn handle_meow(&mut self, sender: &str, is_operator: bool) {
        self.ctx.store.increment_total_meows();
        if is_operator {
            let count = self.ctx.store.increment_personal_meows();
            self.ctx.unlock(Trigger::MeowCount(count));
            return;
        }
        if self.ctx.store.is_blacklisted(sender) || !self.ctx.settings.auto_meow_response {
            return;
        }
        let now = self.ctx.now();
        if self
            .ctx
            .store
            .can_auto_respond_meow(now, self.ctx.settings.meow_reply_cooldown_ms)
        {
            self.ctx.store.record_meow_response(now);
            self.ctx.outbox().chat("meow");
        }
    }
}
