use rustyproxy::config::{self, ProxyConfig};
use rustyproxy::net::server::Server;
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_PATH: &str = "rustyproxy.toml";

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> std::io::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let (cfg, load_error) = match ProxyConfig::from_file(&path) {
        Ok(cfg) => (cfg, None),
        Err(err) => (ProxyConfig::default(), Some(err)),
    };

    init_tracing(&cfg.log_filter);
    if let Some(err) = load_error {
        warn!(error = %err, "falling back to default config");
    }

    config::set_config(cfg).map_err(std::io::Error::other)?;
    async_std::task::block_on(Server.run())
}
