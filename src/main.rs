use std::net::TcpListener;
use std::time::Duration;

use fit_insights_backend::run;
use fit_insights_backend::config::settings::get_config;
use fit_insights_backend::services::credential_store::build_credential_store;
use fit_insights_backend::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Panic if we can't read the config
    let config = get_config().expect("Failed to read the config.");

    let subscriber = get_subscriber(
        "fit-insights-backend".into(),
        config.application.log_level.clone(),
        std::io::stdout
    );
    init_subscriber(subscriber);

    let credential_store = match build_credential_store(
        &config.credential_store,
        Duration::from_secs(config.session.ttl_secs),
    ) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to create credential store: {}", e);
            std::process::exit(1);
        }
    };

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Listening on {}", address);

    run(listener, config, credential_store)?.await
}
