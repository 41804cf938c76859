//! Built-in `!` commands.

use rand::Rng;
use sbechat_stats::format::{self, parse_dungeon_args};
use sbechat_stats::tax::{parse_amount, TaxBreakdown};
use sbechat_stats::StatsQuery;
use sbechat_templates::{Category, Vars};

use crate::{BotContext, CommandRegistry, Invocation};

/// Registry with every built-in command.
pub fn builtin_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Flavor
    registry.register(&["rng"], "rng", "rng_command", rng);
    registry.register(&["cf", "coinflip"], "cf", "cf_command", coinflip);
    registry.register(&["8ball", "ask"], "8ball", "eight_ball_command", eight_ball);
    registry.register(&["throw", "shitter"], "throw", "throw_command", throw);
    registry.register(&["dice", "roll"], "dice", "dice_command", dice);
    registry.register(&["simp"], "simp", "simp_command", simp);
    registry.register(&["sus"], "sus", "sus_command", sus);
    registry.register(&["join", "j"], "join", "join_command", join);
    registry.register(&["meow"], "meow", "meow_command", meow);
    registry.register(&["quote"], "quote", "quote_command", quote);
    registry.register(
        &["commands", "help", "command"],
        "commands",
        "commands_command",
        commands,
    );

    // Skyblock
    registry.register(&["tax", "taxes"], "tax", "tax_command", tax);
    registry.register(&["nw", "networth"], "nw", "networth_command", networth);
    registry.register(&["mayor"], "mayor", "mayor_command", mayor);
    registry.register(&["election"], "election", "election_command", election);
    registry.register(&["slayer"], "slayer", "slayer_command", slayer);
    registry.register(&["lbin", "lowestbin"], "lbin", "lowest_bin_command", lowest_bin);
    registry.register(
        &["skills", "skill", "skilllvl", "skilllevel"],
        "skills",
        "skills_command",
        skills,
    );
    registry.register(
        &["skillaverage", "sa"],
        "skillaverage",
        "skill_average_command",
        skill_average,
    );
    registry.register(
        &["level", "lvl", "sblvl", "sblevel", "skyblocklvl", "skyblocklevel"],
        "level",
        "level_command",
        level,
    );
    registry.register(&["mp", "magicalpower"], "mp", "magical_power_command", magical_power);
    registry.register(&["pbs", "pb"], "pbs", "pbs_command", pbs);
    registry.register(&["comp", "comps", "runs"], "comp", "comp_command", completions);
    registry.register(&["class", "classlvl", "classlevel"], "class", "class_command", class);
    registry.register(&["cata", "catalvl", "catalevel"], "cata", "cata_command", cata);
    registry.register(&["secrets", "secret"], "secrets", "secrets_command", secrets);

    registry
}

fn percent_roll(ctx: &mut BotContext) -> u32 {
    ctx.rng().gen_range(0..=100)
}

fn rng(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let roll = percent_roll(ctx);
    let item = inv.args.join(" ").to_lowercase();
    let drop = if item.is_empty() {
        String::new()
    } else {
        format!(" for {item}")
    };
    let vars = Vars::new()
        .with("playerName", inv.sender)
        .with("rng", roll)
        .with("dropString", drop);
    ctx.reply_with_template(Category::Rng, &vars);
}

fn coinflip(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let result = if ctx.rng().gen_bool(0.5) { "heads" } else { "tails" };
    let vars = Vars::new()
        .with("playerName", inv.sender)
        .with("result", result);
    ctx.reply_with_template(Category::Coinflip, &vars);
}

fn eight_ball(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let vars = Vars::new().with("playerName", inv.sender);
    ctx.reply_with_template(Category::EightBall, &vars);
}

fn throw(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let intensity = percent_roll(ctx);
    let vars = Vars::new()
        .with("playerName", inv.target())
        .with("throwIntensity", intensity);
    ctx.reply_with_template(Category::Throw, &vars);
}

fn dice(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let result: u32 = ctx.rng().gen_range(1..=6);
    let vars = Vars::new()
        .with("playerName", inv.sender)
        .with("result", result);
    ctx.reply_with_template(Category::Dice, &vars);
}

fn simp(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let percentage = percent_roll(ctx);
    let vars = Vars::new()
        .with("playerName", inv.target())
        .with("percentage", percentage);
    ctx.reply_with_template(Category::Simp, &vars);
}

fn sus(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let percentage = percent_roll(ctx);
    let vars = Vars::new()
        .with("playerName", inv.target())
        .with("percentage", percentage);
    ctx.reply_with_template(Category::Sus, &vars);
}

/// `!join <operator>` invites the sender to the operator's party.
fn join(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let Some(target) = inv.args.first() else {
        return;
    };
    if ctx.is_operator(target) {
        ctx.outbox().client_command(format!("party {}", inv.sender));
    }
}

fn meow(ctx: &mut BotContext, _inv: &Invocation<'_>) {
    let vars = Vars::new().with("total", ctx.store.total_meows());
    ctx.reply_with_template(Category::Meow, &vars);
}

fn quote(ctx: &mut BotContext, _inv: &Invocation<'_>) {
    let count = ctx.store.quotes().len();
    let picked = if count == 0 {
        None
    } else {
        let index = ctx.rng().gen_range(0..count);
        ctx.store.quotes().get(index).cloned()
    };
    match picked {
        Some(quote) => ctx.reply(&format!("Quote: \"{quote}\"")),
        None => ctx.notice("No quotes found! Add some with /scc quote add <quote>"),
    }
}

fn commands(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let listing = inv
        .args
        .first()
        .map_or(true, |arg| arg.eq_ignore_ascii_case("list"));
    if !listing {
        return;
    }
    let enabled: Vec<String> = inv
        .registry
        .canonical_names()
        .into_iter()
        .filter(|name| {
            inv.registry
                .by_canonical(name)
                .is_some_and(|reg| ctx.settings.commands.is_enabled(reg.config_key))
        })
        .map(|name| format!("!{name}"))
        .collect();
    ctx.reply(&format!("Available commands: {}", enabled.join(", ")));
}

fn tax(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let Some(amount) = inv.args.first().and_then(|raw| parse_amount(raw)) else {
        return;
    };
    let derpy = inv.args[1..]
        .iter()
        .any(|arg| arg.eq_ignore_ascii_case("derpy"));
    ctx.reply(&TaxBreakdown::calculate(amount, derpy).message());
}

fn networth(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let player = inv.target().to_string();
    let query = StatsQuery::Networth {
        player: player.clone(),
    };
    ctx.spawn_lookup(query, move |doc| format::format_networth(&player, doc));
}

fn mayor(ctx: &mut BotContext, _inv: &Invocation<'_>) {
    ctx.spawn_lookup(StatsQuery::Election, format::format_mayor);
}

fn election(ctx: &mut BotContext, _inv: &Invocation<'_>) {
    ctx.spawn_lookup(StatsQuery::Election, format::format_election);
}

fn slayer(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let player = inv.target().to_string();
    let query = StatsQuery::Slayer {
        player: player.clone(),
    };
    ctx.spawn_lookup(query, move |doc| format::format_slayer(&player, doc));
}

fn lowest_bin(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let query = inv.args.join(" ");
    if query.is_empty() {
        return;
    }
    ctx.spawn_lookup(StatsQuery::LowestBin { query }, format::format_lowest_bin);
}

fn skills(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let player = inv.target().to_string();
    let query = StatsQuery::Skills {
        player: player.clone(),
    };
    ctx.spawn_lookup(query, move |doc| format::format_skills(&player, doc));
}

fn skill_average(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let player = inv.target().to_string();
    let query = StatsQuery::Skills {
        player: player.clone(),
    };
    ctx.spawn_lookup(query, move |doc| format::format_skill_average(&player, doc));
}

fn level(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let player = inv.target().to_string();
    let query = StatsQuery::Level {
        player: player.clone(),
    };
    ctx.spawn_lookup(query, move |doc| format::format_level(&player, doc));
}

fn magical_power(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let player = inv.target().to_string();
    let query = StatsQuery::MagicalPower {
        player: player.clone(),
    };
    ctx.spawn_lookup(query, move |doc| format::format_magical_power(&player, doc));
}

fn pbs(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let args = parse_dungeon_args(inv.args);
    let player = args.player.unwrap_or_else(|| inv.sender.to_string());
    let query = StatsQuery::Dungeons {
        player: player.clone(),
    };
    let master = args.master;
    ctx.spawn_lookup(query, move |doc| format::format_pbs(&player, doc, master));
}

fn completions(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let args = parse_dungeon_args(inv.args);
    let player = args.player.unwrap_or_else(|| inv.sender.to_string());
    let query = StatsQuery::Dungeons {
        player: player.clone(),
    };
    let master = args.master;
    ctx.spawn_lookup(query, move |doc| {
        format::format_completions(&player, doc, master)
    });
}

fn class(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let player = inv.target().to_string();
    let query = StatsQuery::Dungeons {
        player: player.clone(),
    };
    ctx.spawn_lookup(query, move |doc| format::format_class_levels(&player, doc));
}

fn cata(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let player = inv.target().to_string();
    let query = StatsQuery::Dungeons {
        player: player.clone(),
    };
    ctx.spawn_lookup(query, move |doc| format::format_cata_level(&player, doc));
}

fn secrets(ctx: &mut BotContext, inv: &Invocation<'_>) {
    let player = inv.target().to_string();
    let query = StatsQuery::Secrets {
        player: player.clone(),
    };
    ctx.spawn_lookup(query, move |doc| format::format_secrets(&player, doc));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandToggles;
    use std::collections::BTreeSet;

    #[test]
    fn every_builtin_has_a_known_toggle() {
        let registry = builtin_registry();
        for name in registry.canonical_names() {
            let reg = registry.by_canonical(name).unwrap();
            assert!(
                CommandToggles::KEYS.contains(&reg.config_key),
                "{name} uses unknown key {}",
                reg.config_key
            );
            assert!(reg.names.contains(&name));
        }
    }

    #[test]
    fn every_toggle_has_a_command() {
        let registry = builtin_registry();
        let used: BTreeSet<&str> = registry
            .canonical_names()
            .into_iter()
            .filter_map(|name| registry.by_canonical(name))
            .map(|reg| reg.config_key)
            .collect();
        for key in CommandToggles::KEYS {
            assert!(used.contains(key), "{key} has no command");
        }
    }

    #[test]
    fn aliases_resolve_to_canonical_names() {
        let registry = builtin_registry();
        for (alias, canonical) in [
            ("coinflip", "cf"),
            ("ask", "8ball"),
            ("shitter", "throw"),
            ("roll", "dice"),
            ("j", "join"),
            ("help", "commands"),
            ("taxes", "tax"),
            ("networth", "nw"),
            ("lowestbin", "lbin"),
            ("skilllevel", "skills"),
            ("sa", "skillaverage"),
            ("skyblocklevel", "level"),
            ("magicalpower", "mp"),
            ("pb", "pbs"),
            ("runs", "comp"),
            ("classlevel", "class"),
            ("catalvl", "cata"),
            ("secret", "secrets"),
        ] {
            assert_eq!(registry.lookup(alias).unwrap().canonical, canonical, "{alias}");
        }
    }
}
