use std::sync::Arc;

use rand::rngs::StdRng;
use sbechat_core::{Clock, Millis, Outbox, Username};
use sbechat_stats::{FetchError, StatsProvider, StatsQuery};
use sbechat_store::{achievements, Store, Trigger};
use sbechat_templates::{Category, TemplateEngine, Vars};
use serde_json::Value;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, warn};

use crate::DispatchSettings;

/// Everything a handler may touch.
///
/// Owned by the dispatcher and passed explicitly to each handler; nothing here is
/// global. Spawned lookups only receive the stats provider and an outbox clone.
pub struct BotContext {
    /// Behavior switches.
    pub settings: DispatchSettings,
    /// Persistent state.
    pub store: Store,
    /// Flavor text templates.
    pub templates: TemplateEngine,
    stats: Arc<dyn StatsProvider>,
    outbox: Outbox,
    clock: Box<dyn Clock>,
    rng: StdRng,
}

impl BotContext {
    /// Assemble a context.
    pub fn new(
        settings: DispatchSettings,
        store: Store,
        templates: TemplateEngine,
        stats: Arc<dyn StatsProvider>,
        outbox: Outbox,
        clock: Box<dyn Clock>,
        rng: StdRng,
    ) -> Self {
        Self {
            settings,
            store,
            templates,
            stats,
            outbox,
            clock,
            rng,
        }
    }

    /// Current time.
    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    /// Random source for rolls and template picks.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Outbound queue.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Whether `name` is the local operator.
    pub fn is_operator(&self, name: &str) -> bool {
        let operator = Username::new(&self.settings.operator);
        !operator.is_empty() && operator.matches(name)
    }

    /// `text` with the response marker in front.
    pub fn marked(&self, text: &str) -> String {
        marked(&self.settings.response_marker, text)
    }

    /// Post a marked response to the channel.
    pub fn reply(&self, text: &str) {
        self.outbox.chat(self.marked(text));
    }

    /// Show a local-only line to the operator.
    pub fn notice(&self, text: impl Into<String>) {
        self.outbox.notice(text);
    }

    /// Render a template and post it. Template problems are logged and nothing is sent.
    pub fn reply_with_template(&mut self, category: Category, vars: &Vars) {
        match self.templates.render(category, vars, &mut self.rng) {
            Ok(text) => self.reply(&text),
            Err(err) => warn!(%category, "Failed to render template: {err}"),
        }
    }

    /// Evaluate achievements for `trigger` and announce each new unlock locally.
    pub fn unlock(&mut self, trigger: Trigger) {
        for def in achievements::check(&mut self.store, trigger) {
            for line in achievements::announcement(def) {
                self.outbox.notice(line);
            }
        }
    }

    /// Run `query` in the background and post `format`'s line when it resolves.
    ///
    /// Failures are logged only. The task does not observe later moderation changes.
    /// Outside a tokio runtime the lookup is dropped with a warning.
    pub fn spawn_lookup<F>(&self, query: StatsQuery, format: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Value) -> Result<String, FetchError> + Send + 'static,
    {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(%query, "No async runtime, dropping stats lookup: {err}");
                return None;
            }
        };
        let stats = Arc::clone(&self.stats);
        let outbox = self.outbox.clone();
        let marker = self.settings.response_marker.clone();
        debug!(%query, "spawning stats lookup");
        Some(runtime.spawn(async move {
            match stats.fetch(&query).await.and_then(format) {
                Ok(line) => outbox.chat(marked(&marker, &line)),
                Err(err) => warn!(%query, "Stats lookup failed: {err}"),
            }
        }))
    }
}

fn marked(marker: &str, text: &str) -> String {
    if marker.is_empty() {
        text.to_string()
    } else {
        format!("{marker} {text}")
    }
}
