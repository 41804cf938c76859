//! Chat-line formatting for stats documents.
//!
//! Each `format_*` function decodes the document for one query kind and renders it
//! as a single line without the response marker.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::FetchError;

/// Compact number with a K/M/B suffix and one decimal (`1234` → `1.2K`).
pub fn format_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{value:.0}")
    }
}

/// Integer with thousands separators (`1234567` → `1,234,567`).
pub fn format_grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `m:ss` for a duration in milliseconds.
pub fn format_duration_ms(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, FetchError> {
    Ok(serde_json::from_value(value)?)
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// Networth

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworthDoc {
    profile_name: String,
    #[serde(default = "normal_mode")]
    game_mode: String,
    networth: f64,
    unsoulbound_networth: f64,
}

fn normal_mode() -> String {
    "normal".to_string()
}

/// `Steve's Networth (Apple [ironman]): 1.2B | Unsoulbound: 900.0M`
pub fn format_networth(player: &str, value: Value) -> Result<String, FetchError> {
    let doc: NetworthDoc = decode(value)?;
    let mode = if doc.game_mode == "normal" {
        String::new()
    } else {
        format!(" [{}]", doc.game_mode)
    };
    Ok(format!(
        "{player}'s Networth ({}{mode}): {} | Unsoulbound: {}",
        doc.profile_name,
        format_number(doc.networth),
        format_number(doc.unsoulbound_networth)
    ))
}

// Slayer

#[derive(Debug, Deserialize)]
struct SlayerDoc {
    slayers: Vec<SlayerEntry>,
}

#[derive(Debug, Deserialize)]
struct SlayerEntry {
    name: String,
    level: u32,
    xp: f64,
}

/// `Steve's Slayers: Zombie 9 | Spider 7 | Total XP: 2.1M`
pub fn format_slayer(player: &str, value: Value) -> Result<String, FetchError> {
    let doc: SlayerDoc = decode(value)?;
    if doc.slayers.is_empty() {
        return Err(FetchError::NotFound(format!("slayer data for {player}")));
    }
    let total: f64 = doc.slayers.iter().map(|s| s.xp).sum();
    let levels: Vec<String> = doc
        .slayers
        .iter()
        .map(|s| format!("{} {}", title_case(&s.name), s.level))
        .collect();
    Ok(format!(
        "{player}'s Slayers: {} | Total XP: {}",
        levels.join(" | "),
        format_number(total)
    ))
}

// Skills

#[derive(Debug, Deserialize)]
struct SkillsDoc {
    skills: Vec<SkillEntry>,
}

#[derive(Debug, Deserialize)]
struct SkillEntry {
    name: String,
    level: f64,
}

/// Skills that do not count toward the skill average.
const COSMETIC_SKILLS: &[&str] = &["runecrafting", "social"];

fn decode_skills(player: &str, value: Value) -> Result<Vec<SkillEntry>, FetchError> {
    let doc: SkillsDoc = decode(value)?;
    if doc.skills.is_empty() {
        return Err(FetchError::NotFound(format!("skills for {player}")));
    }
    Ok(doc.skills)
}

/// `Steve's Skills: Farming 50 | Mining 45 | ...`
pub fn format_skills(player: &str, value: Value) -> Result<String, FetchError> {
    let skills = decode_skills(player, value)?;
    let parts: Vec<String> = skills
        .iter()
        .map(|s| format!("{} {}", title_case(&s.name), s.level.floor()))
        .collect();
    Ok(format!("{player}'s Skills: {}", parts.join(" | ")))
}

/// `Steve's Skill Average: 42.75`
pub fn format_skill_average(player: &str, value: Value) -> Result<String, FetchError> {
    let skills = decode_skills(player, value)?;
    let counted: Vec<f64> = skills
        .iter()
        .filter(|s| !COSMETIC_SKILLS.contains(&s.name.to_lowercase().as_str()))
        .map(|s| s.level)
        .collect();
    if counted.is_empty() {
        return Err(FetchError::Payload("no averaged skills".to_string()));
    }
    let average = counted.iter().sum::<f64>() / counted.len() as f64;
    Ok(format!("{player}'s Skill Average: {average:.2}"))
}

// Level

#[derive(Debug, Deserialize)]
struct LevelDoc {
    level: u32,
    #[serde(default)]
    xp: u32,
}

/// `Steve's Skyblock Level: 312 (45/100 XP)`
pub fn format_level(player: &str, value: Value) -> Result<String, FetchError> {
    let doc: LevelDoc = decode(value)?;
    Ok(format!(
        "{player}'s Skyblock Level: {} ({}/100 XP)",
        doc.level,
        doc.xp.min(100)
    ))
}

// Magical power

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MagicalPowerDoc {
    magical_power: u64,
    #[serde(default)]
    selected_power: Option<String>,
}

/// `Steve's Magical Power: 1,234 (Power: Silky)`
pub fn format_magical_power(player: &str, value: Value) -> Result<String, FetchError> {
    let doc: MagicalPowerDoc = decode(value)?;
    let power = doc
        .selected_power
        .map(|power| format!(" (Power: {})", title_case(&power)))
        .unwrap_or_default();
    Ok(format!(
        "{player}'s Magical Power: {}{power}",
        format_grouped(doc.magical_power)
    ))
}

// Secrets

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretsDoc {
    secrets: u64,
    #[serde(default)]
    total_runs: u64,
}

/// `Steve has found 12.3K secrets (8.42 per run)`
pub fn format_secrets(player: &str, value: Value) -> Result<String, FetchError> {
    let doc: SecretsDoc = decode(value)?;
    let per_run = if doc.total_runs > 0 {
        format!(" ({:.2} per run)", doc.secrets as f64 / doc.total_runs as f64)
    } else {
        String::new()
    };
    Ok(format!(
        "{player} has found {} secrets{per_run}",
        format_number(doc.secrets as f64)
    ))
}

// Dungeons

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DungeonsDoc {
    catacombs_level: f64,
    #[serde(default)]
    classes: Vec<ClassEntry>,
    #[serde(default)]
    floors: BTreeMap<u8, FloorStats>,
    #[serde(default)]
    master_floors: BTreeMap<u8, FloorStats>,
}

#[derive(Debug, Deserialize)]
struct ClassEntry {
    name: String,
    level: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FloorStats {
    #[serde(default)]
    completions: u64,
    #[serde(default)]
    fastest_s_plus_ms: Option<u64>,
}

impl DungeonsDoc {
    fn floors(&self, master: bool) -> (&BTreeMap<u8, FloorStats>, char) {
        if master {
            (&self.master_floors, 'M')
        } else {
            (&self.floors, 'F')
        }
    }
}

fn floor_label(prefix: char, floor: u8) -> String {
    if prefix == 'F' && floor == 0 {
        "E".to_string()
    } else {
        format!("{prefix}{floor}")
    }
}

/// `Steve's Catacombs Level: 45.67`
pub fn format_cata_level(player: &str, value: Value) -> Result<String, FetchError> {
    let doc: DungeonsDoc = decode(value)?;
    Ok(format!(
        "{player}'s Catacombs Level: {:.2}",
        doc.catacombs_level
    ))
}

/// `Steve's Class Levels: Healer 30.5 | Mage 45.1 | Average: 37.8`
pub fn format_class_levels(player: &str, value: Value) -> Result<String, FetchError> {
    let doc: DungeonsDoc = decode(value)?;
    if doc.classes.is_empty() {
        return Err(FetchError::NotFound(format!("class levels for {player}")));
    }
    let average = doc.classes.iter().map(|c| c.level).sum::<f64>() / doc.classes.len() as f64;
    let parts: Vec<String> = doc
        .classes
        .iter()
        .map(|c| format!("{} {:.1}", title_case(&c.name), c.level))
        .collect();
    Ok(format!(
        "{player}'s Class Levels: {} | Average: {average:.1}",
        parts.join(" | ")
    ))
}

/// `Steve's Master Mode PBs (S+): M1 3:21 | M2 4:05`
pub fn format_pbs(player: &str, value: Value, master: bool) -> Result<String, FetchError> {
    let doc: DungeonsDoc = decode(value)?;
    let (floors, prefix) = doc.floors(master);
    let parts: Vec<String> = floors
        .iter()
        .filter_map(|(floor, stats)| {
            stats
                .fastest_s_plus_ms
                .map(|ms| format!("{} {}", floor_label(prefix, *floor), format_duration_ms(ms)))
        })
        .collect();
    let mode = if master { "Master Mode" } else { "Catacombs" };
    if parts.is_empty() {
        return Ok(format!("{player} has no {mode} S+ runs yet"));
    }
    Ok(format!("{player}'s {mode} PBs (S+): {}", parts.join(" | ")))
}

/// `Steve's Catacombs Completions: F1 120 | F2 80 | Total: 200`
pub fn format_completions(player: &str, value: Value, master: bool) -> Result<String, FetchError> {
    let doc: DungeonsDoc = decode(value)?;
    let (floors, prefix) = doc.floors(master);
    let mut total = 0u64;
    let parts: Vec<String> = floors
        .iter()
        .filter(|(_, stats)| stats.completions > 0)
        .map(|(floor, stats)| {
            total += stats.completions;
            format!("{} {}", floor_label(prefix, *floor), format_grouped(stats.completions))
        })
        .collect();
    let mode = if master { "Master Mode" } else { "Catacombs" };
    if parts.is_empty() {
        return Ok(format!("{player} has no {mode} completions yet"));
    }
    Ok(format!(
        "{player}'s {mode} Completions: {} | Total: {}",
        parts.join(" | "),
        format_grouped(total)
    ))
}

/// Player name and master-mode flag from dungeon command arguments.
///
/// `m` or `master` (any case, any position) selects master mode; the first other
/// argument is the player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DungeonArgs {
    /// Explicit player, if given.
    pub player: Option<String>,
    /// Whether master-mode floors were requested.
    pub master: bool,
}

/// Parse dungeon command arguments.
pub fn parse_dungeon_args<S: AsRef<str>>(args: &[S]) -> DungeonArgs {
    let mut parsed = DungeonArgs::default();
    for arg in args {
        let arg = arg.as_ref();
        if arg.eq_ignore_ascii_case("m") || arg.eq_ignore_ascii_case("master") {
            parsed.master = true;
        } else if parsed.player.is_none() {
            parsed.player = Some(arg.to_string());
        }
    }
    parsed
}

// Election

#[derive(Debug, Deserialize)]
struct ElectionDoc {
    mayor: MayorEntry,
    #[serde(default)]
    election: Option<ElectionRound>,
}

#[derive(Debug, Deserialize)]
struct MayorEntry {
    name: String,
    #[serde(default)]
    perks: Vec<String>,
    #[serde(default)]
    minister: Option<MinisterEntry>,
}

#[derive(Debug, Deserialize)]
struct MinisterEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ElectionRound {
    year: u32,
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    name: String,
    #[serde(default)]
    votes: u64,
}

/// `Current Mayor: Diana (Mythological Ritual, Pet XP Buff) | Minister: Paul`
pub fn format_mayor(value: Value) -> Result<String, FetchError> {
    let doc: ElectionDoc = decode(value)?;
    let mut line = format!("Current Mayor: {}", doc.mayor.name);
    if !doc.mayor.perks.is_empty() {
        line.push_str(&format!(" ({})", doc.mayor.perks.join(", ")));
    }
    if let Some(minister) = doc.mayor.minister {
        line.push_str(&format!(" | Minister: {}", minister.name));
    }
    Ok(line)
}

/// `Election (Year 345): Diaz 45.2% | Marina 30.1% | Cole 24.7%`
pub fn format_election(value: Value) -> Result<String, FetchError> {
    let doc: ElectionDoc = decode(value)?;
    let Some(mut round) = doc.election.filter(|round| !round.candidates.is_empty()) else {
        return Ok("No election is currently running".to_string());
    };
    round.candidates.sort_by(|a, b| b.votes.cmp(&a.votes));
    let total: u64 = round.candidates.iter().map(|c| c.votes).sum();
    let parts: Vec<String> = round
        .candidates
        .iter()
        .map(|c| {
            let share = if total == 0 {
                0.0
            } else {
                c.votes as f64 * 100.0 / total as f64
            };
            format!("{} {share:.1}%", c.name)
        })
        .collect();
    Ok(format!(
        "Election (Year {}): {}",
        round.year,
        parts.join(" | ")
    ))
}

// Lowest BIN

#[derive(Debug, Deserialize)]
struct LowestBinDoc {
    item: String,
    price: f64,
}

/// `Lowest BIN for Hyperion: 1.1B`
pub fn format_lowest_bin(value: Value) -> Result<String, FetchError> {
    let doc: LowestBinDoc = decode(value)?;
    Ok(format!(
        "Lowest BIN for {}: {}",
        doc.item,
        format_number(doc.price)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_suffixes() {
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1_234.0), "1.2K");
        assert_eq!(format_number(2_500_000.0), "2.5M");
        assert_eq!(format_number(1_100_000_000.0), "1.1B");
        assert_eq!(format_grouped(1_234_567), "1,234,567");
        assert_eq!(format_grouped(12), "12");
        assert_eq!(format_duration_ms(201_500), "3:21");
    }

    #[test]
    fn networth_line() {
        let doc = json!({"profileName": "Apple", "gameMode": "ironman", "networth": 1.2e9, "unsoulboundNetworth": 9.0e8});
        assert_eq!(
            format_networth("Steve", doc).unwrap(),
            "Steve's Networth (Apple [ironman]): 1.2B | Unsoulbound: 900.0M"
        );
        let doc = json!({"profileName": "Kiwi", "networth": 5000, "unsoulboundNetworth": 10});
        assert_eq!(
            format_networth("Alex", doc).unwrap(),
            "Alex's Networth (Kiwi): 5.0K | Unsoulbound: 10"
        );
    }

    #[test]
    fn wrong_shape_is_payload_error() {
        let err = format_networth("Steve", json!({"networth": "lots"})).unwrap_err();
        assert!(matches!(err, FetchError::Payload(_)));
    }

    #[test]
    fn slayer_line() {
        let doc = json!({"slayers": [
            {"name": "zombie", "level": 9, "xp": 2_000_000},
            {"name": "spider", "level": 7, "xp": 100_000}
        ]});
        assert_eq!(
            format_slayer("Steve", doc).unwrap(),
            "Steve's Slayers: Zombie 9 | Spider 7 | Total XP: 2.1M"
        );
        assert!(matches!(
            format_slayer("Steve", json!({"slayers": []})),
            Err(FetchError::NotFound(_))
        ));
    }

    #[test]
    fn skill_average_skips_cosmetic_skills() {
        let doc = json!({"skills": [
            {"name": "farming", "level": 50.0},
            {"name": "mining", "level": 40.0},
            {"name": "runecrafting", "level": 25.0}
        ]});
        assert_eq!(
            format_skill_average("Steve", doc.clone()).unwrap(),
            "Steve's Skill Average: 45.00"
        );
        assert_eq!(
            format_skills("Steve", doc).unwrap(),
            "Steve's Skills: Farming 50 | Mining 40 | Runecrafting 25"
        );
    }

    #[test]
    fn level_and_magical_power() {
        assert_eq!(
            format_level("Steve", json!({"level": 312, "xp": 45})).unwrap(),
            "Steve's Skyblock Level: 312 (45/100 XP)"
        );
        assert_eq!(
            format_magical_power("Steve", json!({"magicalPower": 1234, "selectedPower": "silky"}))
                .unwrap(),
            "Steve's Magical Power: 1,234 (Power: Silky)"
        );
    }

    #[test]
    fn secrets_per_run() {
        assert_eq!(
            format_secrets("Steve", json!({"secrets": 12_300, "totalRuns": 1000})).unwrap(),
            "Steve has found 12.3K secrets (12.30 per run)"
        );
        assert_eq!(
            format_secrets("Steve", json!({"secrets": 5})).unwrap(),
            "Steve has found 5 secrets"
        );
    }

    fn dungeons() -> Value {
        json!({
            "catacombsLevel": 45.678,
            "classes": [{"name": "healer", "level": 30.5}, {"name": "mage", "level": 45.1}],
            "floors": {"0": {"completions": 10}, "7": {"completions": 120, "fastestSPlusMs": 301000}},
            "masterFloors": {"1": {"completions": 5, "fastestSPlusMs": 201500}}
        })
    }

    #[test]
    fn dungeon_lines() {
        assert_eq!(
            format_cata_level("Steve", dungeons()).unwrap(),
            "Steve's Catacombs Level: 45.68"
        );
        assert_eq!(
            format_class_levels("Steve", dungeons()).unwrap(),
            "Steve's Class Levels: Healer 30.5 | Mage 45.1 | Average: 37.8"
        );
        assert_eq!(
            format_pbs("Steve", dungeons(), true).unwrap(),
            "Steve's Master Mode PBs (S+): M1 3:21"
        );
        assert_eq!(
            format_pbs("Steve", dungeons(), false).unwrap(),
            "Steve's Catacombs PBs (S+): F7 5:01"
        );
        assert_eq!(
            format_completions("Steve", dungeons(), false).unwrap(),
            "Steve's Catacombs Completions: E 10 | F7 120 | Total: 130"
        );
    }

    #[test]
    fn dungeon_args() {
        assert_eq!(
            parse_dungeon_args(&["m", "Steve"]),
            DungeonArgs {
                player: Some("Steve".into()),
                master: true
            }
        );
        assert_eq!(
            parse_dungeon_args(&["Steve", "MASTER"]),
            DungeonArgs {
                player: Some("Steve".into()),
                master: true
            }
        );
        assert_eq!(parse_dungeon_args::<&str>(&[]), DungeonArgs::default());
    }

    #[test]
    fn mayor_and_election() {
        let doc = json!({
            "mayor": {"name": "Diana", "perks": ["Mythological Ritual", "Pet XP Buff"], "minister": {"name": "Paul"}},
            "election": {"year": 345, "candidates": [
                {"name": "Marina", "votes": 300}, {"name": "Diaz", "votes": 700}
            ]}
        });
        assert_eq!(
            format_mayor(doc.clone()).unwrap(),
            "Current Mayor: Diana (Mythological Ritual, Pet XP Buff) | Minister: Paul"
        );
        assert_eq!(
            format_election(doc).unwrap(),
            "Election (Year 345): Diaz 70.0% | Marina 30.0%"
        );
        assert_eq!(
            format_election(json!({"mayor": {"name": "Cole"}})).unwrap(),
            "No election is currently running"
        );
    }

    #[test]
    fn lowest_bin_line() {
        assert_eq!(
            format_lowest_bin(json!({"item": "Hyperion", "price": 1.1e9})).unwrap(),
            "Lowest BIN for Hyperion: 1.1B"
        );
    }
}
