use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quizboard::{
    api,
    config::AppConfig,
    questions::{FileQuestionBank, QuestionBank, StaticQuestionBank},
    state::AppState,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting quizboard...");

    let config = AppConfig::from_env();
    let bank = question_bank(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(AppState::new(config, bank));
    let app = api::router(state);

    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}

/// Pick the question bank. A broken bank file leaves the board empty
/// rather than keeping the server down.
fn question_bank(config: &AppConfig) -> Arc<dyn QuestionBank> {
    if config.questions_reload {
        tracing::info!(
            "Reading questions from {} on every lookup",
            config.questions_path.display()
        );
        return Arc::new(FileQuestionBank::new(config.questions_path.clone()));
    }

    match StaticQuestionBank::load(&config.questions_path) {
        Ok(bank) => bank_loaded(bank),
        Err(e) => {
            tracing::warn!(
                "Failed to load questions from {}: {}. The board will be empty.",
                config.questions_path.display(),
                e
            );
            Arc::new(StaticQuestionBank::default())
        }
    }
}

fn bank_loaded(bank: StaticQuestionBank) -> Arc<dyn QuestionBank> {
    match bank.catalog() {
        Ok(catalog) => tracing::info!(
            "Loaded {} questions in {} categories",
            catalog.total_questions(),
            catalog.categories.len()
        ),
        Err(e) => tracing::warn!("Question bank unavailable: {}", e),
    }
    Arc::new(bank)
}
