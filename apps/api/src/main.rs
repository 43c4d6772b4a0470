mod config;
mod errors;
mod http;
mod llm_client;
mod outreach;
mod pitch;
mod repl;
mod routes;
mod scheduler;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::BufReader;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AppMode, Config};
use crate::llm_client::ChatClient;
use crate::outreach::messaging::ChatOutreach;
use crate::outreach::phone::PhoneOutreach;
use crate::outreach::SimulatedFollowUp;
use crate::routes::build_router;
use crate::scheduler::calendar::AppointmentScheduler;
use crate::scheduler::provision::provision_calendar;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing OPENAI_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting Job Pitch agent v{} in {:?} mode",
        env!("CARGO_PKG_VERSION"),
        config.mode
    );

    let client = http::build_client(config.http_timeout_secs)?;

    match config.mode {
        AppMode::ProvisionCalendar => {
            let token_file = provision_calendar(&client, &config.calendar).await?;
            info!("Calendar authorized; token saved to {}", token_file.display());
        }
        AppMode::Repl => {
            let llm = chat_client(&config, client);
            let stdin = BufReader::new(tokio::io::stdin());
            repl::run(&llm, stdin, tokio::io::stdout()).await?;
        }
        AppMode::Serve => {
            let state = AppState {
                llm: Arc::new(chat_client(&config, client.clone())),
                scheduler: AppointmentScheduler::new(client.clone(), &config.calendar),
                phone: PhoneOutreach::new(
                    client.clone(),
                    config.vapi.clone(),
                    Arc::new(SimulatedFollowUp::phone()),
                ),
                messaging: ChatOutreach::new(
                    client,
                    config.whatsapp.clone(),
                    Arc::new(SimulatedFollowUp::messaging()),
                ),
            };

            let app = build_router(state)
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive());

            let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
            info!("Listening on {addr}");

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn chat_client(config: &Config, client: reqwest::Client) -> ChatClient {
    let llm = ChatClient::new(
        client,
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    );
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    llm
}
