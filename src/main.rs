use cinebot::agent::{AgentConfig, ToolCallingAgent};
use cinebot::config::AppConfig;
use cinebot::controller::ConversationController;
use cinebot::llm::create_adapter;
use cinebot::tools::default_registry;
use cinebot::ui::CinebotApp;
use cinebot::version;
use eframe::egui;
use std::sync::Arc;

/// Exit with a logged error before any window opens
fn fail_startup(context: &str, err: impl std::fmt::Display) -> ! {
    tracing::error!("{}: {}", context, err);
    eprintln!("\n❌ ERROR: {}\n\n{}\n", context, err);
    std::process::exit(1);
}

fn main() -> std::result::Result<(), eframe::Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();
    tracing::info!("Starting {}", version::window_title());

    let config = AppConfig::load().unwrap_or_else(|e| {
        fail_startup(
            "Failed to load configuration (set GEMINI_API_KEY in .env.local or the environment)",
            e,
        )
    });
    tracing::info!(
        "Using {} model {}",
        config.provider.display_name(),
        config.model
    );

    let runtime = tokio::runtime::Runtime::new()
        .map(Arc::new)
        .unwrap_or_else(|e| fail_startup("Failed to create tokio runtime", e));

    let llm = create_adapter(
        config.provider,
        config.api_key.clone(),
        config.api_base.clone(),
        config.model.clone(),
        config.http_timeout,
    )
    .unwrap_or_else(|e| fail_startup("Failed to create LLM adapter", e));

    let tools = default_registry(config.http_timeout)
        .unwrap_or_else(|e| fail_startup("Failed to create tools", e));
    tracing::info!("Registered {} tools", tools.len());

    let agent_config = AgentConfig {
        max_iterations: config.max_iterations,
        ..AgentConfig::movie_assistant()
    };
    let agent = ToolCallingAgent::new(agent_config, llm, Arc::new(tools));
    let controller = ConversationController::new(Arc::new(agent), runtime);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([700.0, 500.0])
            .with_title(version::APP_NAME),
        ..Default::default()
    };

    eframe::run_native(
        "cinebot",
        options,
        Box::new(move |cc| Ok(Box::new(CinebotApp::new(cc, controller)))),
    )
}
