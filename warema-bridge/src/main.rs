use std::sync::Arc;

use warema_bridge::configs::{RawSettings, Settings};
use warema_bridge::run;

#[tokio::main]
async fn main() {
    let raw = RawSettings::load().expect("Failed to load settings.");

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = raw.log_level();

            format!("{app_name}={level},rumqttc={level}").into()
        }))
        .init();

    let settings = Arc::new(Settings::from_raw(raw));

    tokio::select! {
        result = run(settings) => {
            if let Err(e) = result {
                tracing::error!("Bridge stopped: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }
}
