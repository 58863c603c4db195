use anyhow::Result;
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    info, warn,
};
use tracing_subscriber::{
    EnvFilter, Layer,
    field::RecordFields,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};
use url::Url;

/// Initializes the tracing stack: RFC3339 local-time fmt layer, `RUST_LOG`
/// env filter with an `info` default, and an optional Discord layer that
/// forwards error-level events to an ops channel.
pub fn init_observability(component: &str) -> Result<()> {
    let discord = DiscordConfig::from_env();

    let notify_layer = discord.as_ref().map(|config| {
        DiscordNotifyLayer::new(
            Notifier::new(config.webhook_url.clone()),
            component.to_string(),
            config.min_level,
        )
        .with_filter(tracing_subscriber::filter::LevelFilter::from_level(
            config.min_level,
        ))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(notify_layer)
        .with(env_filter)
        .try_init()?;

    if discord.is_some() {
        info!(component, "Discord error notifications enabled");
    } else {
        info!(component, "Discord error notifications disabled");
    }

    Ok(())
}

struct DiscordConfig {
    webhook_url: Url,
    min_level: Level,
}

impl DiscordConfig {
    fn from_env() -> Option<Self> {
        let raw = std::env::var("DISCORD_WEBHOOK_URL").ok()?;
        if raw.is_empty() {
            return None;
        }

        // The raw URL carries a secret token; never echo it in logs.
        let webhook_url = Url::parse(&raw).ok()?;
        let min_level = std::env::var("DISCORD_NOTIFY_LEVEL")
            .ok()
            .and_then(|value| value.trim().parse::<Level>().ok())
            .unwrap_or(Level::ERROR);

        Some(Self {
            webhook_url,
            min_level,
        })
    }
}

#[derive(Clone)]
struct Notifier {
    tx: tokio::sync::mpsc::Sender<String>,
}

impl Notifier {
    fn new(webhook_url: Url) -> Self {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<String>(256);

        tokio::spawn(async move {
            let http = reqwest::Client::new();
            while let Some(content) = rx.recv().await {
                let payload = serde_json::json!({ "content": content });
                if let Err(error) = http.post(webhook_url.clone()).json(&payload).send().await {
                    warn!(error = %error, "Discord notification failed");
                }
            }
        });

        Self { tx }
    }

    fn try_notify(&self, content: String) {
        if self.tx.try_send(content).is_err() {
            warn!("Discord notification queue full or closed; dropping event");
        }
    }
}

struct DiscordNotifyLayer {
    notifier: Notifier,
    component: String,
    min_level: Level,
}

impl DiscordNotifyLayer {
    fn new(notifier: Notifier, component: String, min_level: Level) -> Self {
        Self {
            notifier,
            component,
            min_level,
        }
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn collect(source: &impl RecordFields) -> Self {
        let mut visitor = Self::default();
        source.record(&mut visitor);
        visitor
    }

    fn push(&mut self, name: &str, value: String) {
        if name == "message" {
            self.message = Some(value);
        } else if is_sensitive_key(name) {
            self.fields.push((name.to_string(), "[REDACTED]".into()));
        } else {
            self.fields.push((name.to_string(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field.name(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field.name(), value.to_string());
    }
}

impl<S> Layer<S> for DiscordNotifyLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() > self.min_level {
            return;
        }

        let visitor = FieldVisitor::collect(event);
        let mut content = format!(
            "**{}** `{}` {}",
            event.metadata().level(),
            self.component,
            visitor.message.unwrap_or_default()
        );
        for (name, value) in visitor.fields {
            content.push_str(&format!("\n- {name}: {value}"));
        }

        self.notifier.try_notify(content);
    }
}

fn is_sensitive_key(field_name: &str) -> bool {
    let field = field_name.to_ascii_lowercase();
    field.contains("webhook")
        || field.contains("secret")
        || field.contains("password")
        || field.contains("token")
        || field.contains("authorization")
}
