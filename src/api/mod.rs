//! HTTP API: the conversation entry point and health check.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::agent::Agent;
use crate::config::Config;
use crate::llm::OpenAiClient;
use crate::store::{ConversationStore, InMemoryStore, SqliteStore};
use crate::tools::{
    CompanyComparison, CompanyDbSearch, CompanyFinancials, CompanyNews, CompanyResearch,
    CompanyResearchClient, ToolRegistry,
};
use types::{ChatRequest, ChatResponseBody, HealthResponse};

/// Shared server state: one agent and one store for all conversations.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub store: Arc<dyn ConversationStore>,
}

/// Wire the full toolset: the database search plus the four research tools
/// sharing one research client.
pub fn build_registry(research: CompanyResearchClient) -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(CompanyDbSearch);
    tools.register(CompanyResearch::new(research.clone()));
    tools.register(CompanyNews::new(research.clone()));
    tools.register(CompanyFinancials::new(research.clone()));
    tools.register(CompanyComparison::new(research));
    tools
}

/// Build the router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/conversations/:id/messages", post(post_message))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server from configuration.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let llm = Arc::new(OpenAiClient::new(
        config.base_url.clone(),
        config.api_key.clone(),
        config.model.clone(),
    ));

    let research = CompanyResearchClient::new(llm.clone());
    let agent = Agent::new(llm, build_registry(research), config.max_rounds)
        .with_approval_timeout(config.approval_timeout_secs.map(Duration::from_secs));

    let store: Arc<dyn ConversationStore> = match &config.database_path {
        Some(path) => {
            let store = SqliteStore::open(path)?;
            tracing::info!("using sqlite checkpoint store at {}", path.display());
            Arc::new(store)
        }
        None => {
            tracing::info!("using in-memory checkpoint store");
            Arc::new(InMemoryStore::new())
        }
    };

    let state = AppState {
        agent: Arc::new(agent),
        store,
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponseBody>, (StatusCode, String)> {
    run_conversation_turn(&state, id, request).await.map(Json)
}

/// Load, run one turn, and checkpoint. The conversation is saved even when
/// the turn ends suspended so an independent later call can resume the gate.
pub async fn run_conversation_turn(
    state: &AppState,
    id: Uuid,
    request: ChatRequest,
) -> Result<ChatResponseBody, (StatusCode, String)> {
    let mut conversation = state
        .store
        .load_or_create(id)
        .await
        .map_err(internal_error)?;

    if let Some(language) = request.language {
        conversation.language = language;
    }

    let outcome = state
        .agent
        .run_turn(
            &mut conversation,
            request.message.as_deref(),
            &request.frontend_actions,
        )
        .await;

    state
        .store
        .save(&conversation)
        .await
        .map_err(internal_error)?;

    Ok(ChatResponseBody {
        status: outcome.status,
        messages: conversation.messages,
        rendered_actions: outcome.rendered,
    })
}

fn internal_error(e: crate::error::StoreError) -> (StatusCode, String) {
    tracing::error!("store failure: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
