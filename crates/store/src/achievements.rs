//! Operator achievements: a fixed catalog and trigger evaluation against the store.

use crate::Store;
use std::collections::BTreeSet;
use tracing::info;

/// What kind of event can unlock an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// Shown once when the add-on first starts.
    FirstInstall,
    /// The operator's first chat line.
    FirstMessage,
    /// Personal meow count reached a threshold.
    MeowCount,
    /// Every required command has been used.
    CommandMaster,
}

/// An event fed to [`check`], carrying the value it is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First-install flow completed.
    FirstInstall,
    /// Operator sent a chat line.
    FirstMessage,
    /// Operator's personal meow count is now this value.
    MeowCount(u64),
    /// Operator used a command.
    CommandMaster,
}

impl Trigger {
    /// Kind this trigger matches in the catalog.
    pub fn kind(self) -> TriggerKind {
        match self {
            Self::FirstInstall => TriggerKind::FirstInstall,
            Self::FirstMessage => TriggerKind::FirstMessage,
            Self::MeowCount(_) => TriggerKind::MeowCount,
            Self::CommandMaster => TriggerKind::CommandMaster,
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementDefinition {
    /// Stable id persisted in the store.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Display description.
    pub description: &'static str,
    /// Trigger kind.
    pub trigger: TriggerKind,
    /// Numeric threshold for count-based triggers.
    pub requirement: Option<u64>,
}

/// Commands that must all be used for `COMMAND_MASTER`.
pub const COMMAND_MASTER_REQUIRED: &[&str] = &[
    "rng", "cf", "8ball", "throw", "dice", "simp", "sus", "join", "commands", "meow",
];

/// The full catalog, in display order.
pub const ACHIEVEMENTS: &[AchievementDefinition] = &[
    AchievementDefinition {
        id: "FIRST_INSTALL",
        name: "Welcome to SBE Chat",
        description: "Install SBE Chat Commands for the first time",
        trigger: TriggerKind::FirstInstall,
        requirement: None,
    },
    AchievementDefinition {
        id: "FIRST_MESSAGE",
        name: "Breaking the Ice",
        description: "Send your first message in SBE Chat",
        trigger: TriggerKind::FirstMessage,
        requirement: None,
    },
    AchievementDefinition {
        id: "MEOW_10",
        name: "Beginner Catversation",
        description: "Send \"meow\" 10 times in SBE Chat",
        trigger: TriggerKind::MeowCount,
        requirement: Some(10),
    },
    AchievementDefinition {
        id: "MEOW_50",
        name: "True Cat Person",
        description: "Send \"meow\" 50 times in SBE Chat",
        trigger: TriggerKind::MeowCount,
        requirement: Some(50),
    },
    AchievementDefinition {
        id: "MEOW_100",
        name: "Legendary Meower",
        description: "Send \"meow\" 100 times in SBE Chat",
        trigger: TriggerKind::MeowCount,
        requirement: Some(100),
    },
    AchievementDefinition {
        id: "COMMAND_MASTER",
        name: "Command Master",
        description: "Use all available SBE Chat commands at least once",
        trigger: TriggerKind::CommandMaster,
        requirement: Some(COMMAND_MASTER_REQUIRED.len() as u64),
    },
];

/// Look up a definition by id.
pub fn definition(id: &str) -> Option<&'static AchievementDefinition> {
    ACHIEVEMENTS.iter().find(|def| def.id == id)
}

/// Number of required commands present in `used`.
pub fn required_commands_used(used: &BTreeSet<String>) -> usize {
    COMMAND_MASTER_REQUIRED
        .iter()
        .filter(|name| used.contains(**name))
        .count()
}

/// Evaluate `trigger`, unlocking and returning every newly satisfied definition.
///
/// Already-unlocked entries are skipped, so repeated triggers never announce twice.
pub fn check(store: &mut Store, trigger: Trigger) -> Vec<&'static AchievementDefinition> {
    let mut unlocked = Vec::new();
    for def in ACHIEVEMENTS.iter().filter(|def| def.trigger == trigger.kind()) {
        if store.is_unlocked(def.id) {
            continue;
        }
        let satisfied = match trigger {
            Trigger::MeowCount(value) => def.requirement.map_or(true, |req| value >= req),
            Trigger::CommandMaster => {
                required_commands_used(store.used_commands()) == COMMAND_MASTER_REQUIRED.len()
            }
            Trigger::FirstInstall | Trigger::FirstMessage => true,
        };
        if satisfied && store.unlock_achievement(def.id) {
            info!(id = def.id, "achievement unlocked");
            unlocked.push(def);
        }
    }
    unlocked
}

/// Progress toward a count-based achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Current value.
    pub current: u64,
    /// Value needed to unlock.
    pub required: u64,
}

/// Progress for `def`, or `None` for one-shot achievements.
pub fn progress(store: &Store, def: &AchievementDefinition) -> Option<Progress> {
    let required = def.requirement?;
    let current = match def.trigger {
        TriggerKind::MeowCount => store.personal_meows(),
        TriggerKind::CommandMaster => required_commands_used(store.used_commands()) as u64,
        TriggerKind::FirstInstall | TriggerKind::FirstMessage => return None,
    };
    Some(Progress {
        current: current.min(required),
        required,
    })
}

/// Announcement lines for a freshly unlocked achievement.
pub fn announcement(def: &AchievementDefinition) -> [String; 2] {
    [
        format!("Achievement Unlocked: {}", def.name),
        def.description.to_string(),
    ]
}
