use serde::{Deserialize, Serialize};

/// Behavior switches for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// The local player's username. Empty means nobody is treated as the operator.
    pub operator: String,
    /// Master switch for `!` commands.
    pub enable_all_commands: bool,
    /// Hide `!`-prefixed lines from the local chat view.
    pub hide_command_messages: bool,
    /// Hide lines carrying the response marker from the local chat view.
    pub hide_command_outputs: bool,
    /// Reply `meow` to other players' meows.
    pub auto_meow_response: bool,
    /// Minimum gap between two accepted commands from the same user.
    pub command_cooldown_ms: u64,
    /// Minimum gap between two automatic meow replies.
    pub meow_reply_cooldown_ms: u64,
    /// Prefix placed before every command response.
    pub response_marker: String,
    /// Per-command switches.
    pub commands: CommandToggles,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            operator: String::new(),
            enable_all_commands: true,
            hide_command_messages: false,
            hide_command_outputs: false,
            auto_meow_response: true,
            command_cooldown_ms: 3_000,
            meow_reply_cooldown_ms: 100_000,
            response_marker: "[SCC]".to_string(),
            commands: CommandToggles::default(),
        }
    }
}

/// One switch per built-in command, all on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandToggles {
    /// `!rng`
    pub rng_command: bool,
    /// `!cf`
    pub cf_command: bool,
    /// `!8ball`
    pub eight_ball_command: bool,
    /// `!throw`
    pub throw_command: bool,
    /// `!dice`
    pub dice_command: bool,
    /// `!simp`
    pub simp_command: bool,
    /// `!sus`
    pub sus_command: bool,
    /// `!join`
    pub join_command: bool,
    /// `!meow`
    pub meow_command: bool,
    /// `!quote`
    pub quote_command: bool,
    /// `!commands`
    pub commands_command: bool,
    /// `!tax`
    pub tax_command: bool,
    /// `!nw`
    pub networth_command: bool,
    /// `!mayor`
    pub mayor_command: bool,
    /// `!election`
    pub election_command: bool,
    /// `!slayer`
    pub slayer_command: bool,
    /// `!lbin`
    pub lowest_bin_command: bool,
    /// `!skills`
    pub skills_command: bool,
    /// `!skillaverage`
    pub skill_average_command: bool,
    /// `!level`
    pub level_command: bool,
    /// `!mp`
    pub magical_power_command: bool,
    /// `!pbs`
    pub pbs_command: bool,
    /// `!comp`
    pub comp_command: bool,
    /// `!class`
    pub class_command: bool,
    /// `!cata`
    pub cata_command: bool,
    /// `!secrets`
    pub secrets_command: bool,
}

impl Default for CommandToggles {
    fn default() -> Self {
        Self {
            rng_command: true,
            cf_command: true,
            eight_ball_command: true,
            throw_command: true,
            dice_command: true,
            simp_command: true,
            sus_command: true,
            join_command: true,
            meow_command: true,
            quote_command: true,
            commands_command: true,
            tax_command: true,
            networth_command: true,
            mayor_command: true,
            election_command: true,
            slayer_command: true,
            lowest_bin_command: true,
            skills_command: true,
            skill_average_command: true,
            level_command: true,
            magical_power_command: true,
            pbs_command: true,
            comp_command: true,
            class_command: true,
            cata_command: true,
            secrets_command: true,
        }
    }
}

impl CommandToggles {
    /// Every toggle key, in declaration order.
    pub const KEYS: &'static [&'static str] = &[
        "rng_command",
        "cf_command",
        "eight_ball_command",
        "throw_command",
        "dice_command",
        "simp_command",
        "sus_command",
        "join_command",
        "meow_command",
        "quote_command",
        "commands_command",
        "tax_command",
        "networth_command",
        "mayor_command",
        "election_command",
        "slayer_command",
        "lowest_bin_command",
        "skills_command",
        "skill_average_command",
        "level_command",
        "magical_power_command",
        "pbs_command",
        "comp_command",
        "class_command",
        "cata_command",
        "secrets_command",
    ];

    fn slot(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            "rng_command" => Some(&mut self.rng_command),
            "cf_command" => Some(&mut self.cf_command),
            "eight_ball_command" => Some(&mut self.eight_ball_command),
            "throw_command" => Some(&mut self.throw_command),
            "dice_command" => Some(&mut self.dice_command),
            "simp_command" => Some(&mut self.simp_command),
            "sus_command" => Some(&mut self.sus_command),
            "join_command" => Some(&mut self.join_command),
            "meow_command" => Some(&mut self.meow_command),
            "quote_command" => Some(&mut self.quote_command),
            "commands_command" => Some(&mut self.commands_command),
            "tax_command" => Some(&mut self.tax_command),
            "networth_command" => Some(&mut self.networth_command),
            "mayor_command" => Some(&mut self.mayor_command),
            "election_command" => Some(&mut self.election_command),
            "slayer_command" => Some(&mut self.slayer_command),
            "lowest_bin_command" => Some(&mut self.lowest_bin_command),
            "skills_command" => Some(&mut self.skills_command),
            "skill_average_command" => Some(&mut self.skill_average_command),
            "level_command" => Some(&mut self.level_command),
            "magical_power_command" => Some(&mut self.magical_power_command),
            "pbs_command" => Some(&mut self.pbs_command),
            "comp_command" => Some(&mut self.comp_command),
            "class_command" => Some(&mut self.class_command),
            "cata_command" => Some(&mut self.cata_command),
            "secrets_command" => Some(&mut self.secrets_command),
            _ => None,
        }
    }

    /// Current value of a switch, or `None` for unknown keys.
    pub fn get(&self, key: &str) -> Option<bool> {
        let mut toggles = *self;
        toggles.slot(key).map(|slot| *slot)
    }

    /// Whether the command behind `key` may run. Unknown keys are enabled.
    pub fn is_enabled(&self, key: &str) -> bool {
        self.get(key).unwrap_or(true)
    }

    /// Flip a switch by key. Returns `false` for unknown keys.
    pub fn set(&mut self, key: &str, enabled: bool) -> bool {
        match self.slot(key) {
            Some(slot) => {
                *slot = enabled;
                true
            }
            None => false,
        }
    }
}
