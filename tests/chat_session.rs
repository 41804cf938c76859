use std::path::Path;
use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};
use sbechat_core::{ChatEvent, ManualClock, Millis, Outbound, Outbox};
use sbechat_dispatch::{BotContext, DispatchSettings, Dispatcher, Disposition};
use sbechat_store::Store;
use sbechat_templates::{catalog_from_file, TemplateEngine};
use sbechat_testkit::{chat_lines, drain, notices, CannedStats};
use tokio::sync::mpsc::UnboundedReceiver;

fn shipped_templates() -> TemplateEngine {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/templates.json");
    TemplateEngine::new(catalog_from_file(&path).expect("shipped catalog parses"))
}

fn session(store: Store, clock: &ManualClock) -> (Dispatcher, UnboundedReceiver<Outbound>) {
    let (outbox, rx) = Outbox::channel();
    let settings = DispatchSettings {
        operator: "Operator".to_string(),
        command_cooldown_ms: 0,
        ..DispatchSettings::default()
    };
    let ctx = BotContext::new(
        settings,
        store,
        shipped_templates(),
        Arc::new(CannedStats::new()),
        outbox,
        Box::new(clock.clone()),
        StdRng::seed_from_u64(7),
    );
    (Dispatcher::with_builtins(ctx), rx)
}

#[test]
fn flavor_commands_render_from_shipped_templates() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::starting_at(Millis(10_000));
    let (mut dispatcher, mut rx) = session(Store::open(dir.path().join("store.json")), &clock);

    for line in [
        "!rng Necron's Handle",
        "!cf",
        "!8ball am I lucky",
        "!throw Steve",
        "!dice",
        "!simp Steve",
        "!sus Steve",
        "!meow",
    ] {
        // Many rolls so every bucket of every category gets exercised.
        for _ in 0..50 {
            let disposition = dispatcher.handle(&ChatEvent::new("[MVP+] Alex", line));
            assert!(matches!(disposition, Disposition::CommandRouted { .. }), "{line}");
            let out = drain(&mut rx);
            let lines = chat_lines(&out);
            assert_eq!(lines.len(), 1, "{line} produced {out:?}");
            assert!(lines[0].starts_with("[SCC] "), "{}", lines[0]);
            assert!(!lines[0].contains("${"), "unresolved variable in {}", lines[0]);
        }
    }
}

#[test]
fn state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("store.json");
    let clock = ManualClock::starting_at(Millis(1_000_000));

    {
        let (mut dispatcher, mut rx) = session(Store::open(&path), &clock);
        assert!(dispatcher.startup());
        for _ in 0..10 {
            dispatcher.handle(&ChatEvent::new("Operator", "meow"));
        }
        dispatcher.handle(&ChatEvent::new("Alex", "meow"));
        dispatcher.handle(&ChatEvent::new("Operator", "!coinflip"));
        dispatcher.context_mut().store.add_to_blacklist("Griefer");
        dispatcher.context_mut().store.add_quote("gg");
        let out = drain(&mut rx);
        assert!(notices(&out).contains(&"Achievement Unlocked: Beginner Catversation"));
        assert_eq!(chat_lines(&out).iter().filter(|l| **l == "meow").count(), 1);
    }

    let reopened = Store::open(&path);
    assert_eq!(reopened.total_meows(), 11);
    assert_eq!(reopened.personal_meows(), 10);
    assert!(reopened.first_install_done());
    assert!(reopened.is_blacklisted("GRIEFER"));
    assert!(reopened.is_unlocked("MEOW_10"));
    assert!(reopened.is_unlocked("FIRST_MESSAGE"));
    assert!(reopened.used_commands().contains("cf"));
    assert_eq!(reopened.quotes(), ["gg"]);
    assert_eq!(reopened.last_meow_response(), Millis(1_000_000));

    let (mut dispatcher, mut rx) = session(reopened, &clock);
    assert!(!dispatcher.startup(), "welcome only runs on first install");
    dispatcher.handle(&ChatEvent::new("Operator", "hello again"));
    assert!(drain(&mut rx).is_empty(), "first message already counted");
    assert!(matches!(
        dispatcher.handle(&ChatEvent::new("Griefer", "!rng")),
        Disposition::Ignored(_)
    ));
}
