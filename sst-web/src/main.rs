//! Servidor web Axum para inspecionar as features de supersentidos de uma sentença

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use sst_core::{
    FeatureOptions, FeaturePipeline, LabelSource, Sentence, SstError, Tag, Token,
};
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Estado compartilhado da aplicação. O alfabeto muda a cada requisição,
/// então o pipeline inteiro fica atrás de um `Mutex`.
struct AppState {
    pipeline: Mutex<FeaturePipeline>,
}

#[derive(Deserialize)]
struct TokenRequest {
    text: String,
    stem: String,
    pos: String,
    #[serde(default)]
    shape: Option<String>,
    #[serde(default)]
    gold: Option<String>,
    /// Rótulo já previsto (decodificação da esquerda para a direita).
    #[serde(default)]
    prediction: Option<String>,
}

#[derive(Deserialize)]
struct FeaturesRequest {
    tokens: Vec<TokenRequest>,
    #[serde(default)]
    labels: LabelSource,
}

#[derive(Serialize)]
struct NamedFeature {
    name: String,
    value: f64,
}

#[derive(Serialize)]
struct TokenFeatures {
    text: String,
    baseline: String,
    features: Vec<NamedFeature>,
}

#[derive(Serialize)]
struct FeaturesResponse {
    tokens: Vec<TokenFeatures>,
    alphabet_size: usize,
}

#[derive(Serialize)]
struct AlphabetResponse {
    size: usize,
    frozen: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let options = match std::env::var("SST_CONFIG") {
        Ok(path) => {
            let base = std::path::Path::new(&path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            FeatureOptions::from_json_file(&path)?.with_base_dir(base)
        }
        Err(_) => {
            warn!("SST_CONFIG not set, using default feature options");
            FeatureOptions::default()
        }
    };

    let mut pipeline = FeaturePipeline::from_options(options);
    // falha cedo se algum arquivo configurado estiver ausente
    pipeline.preload()?;
    match std::env::var("SST_ALPHABET") {
        Ok(path) => pipeline.load_frozen_alphabet(&path)?,
        Err(_) => warn!("SST_ALPHABET not set, alphabet grows with every request until frozen"),
    }
    let state = Arc::new(AppState {
        pipeline: Mutex::new(pipeline),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/features", post(features_handler))
        .route("/alphabet", get(alphabet_handler))
        .route("/alphabet/freeze", post(freeze_handler))
        .layer(cors)
        .with_state(state);

    let addr = std::env::var("SST_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Servidor SST iniciado em http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// Featuriza uma sentença e devolve, por token, a linha de base e as features nomeadas.
async fn features_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeaturesRequest>,
) -> impl IntoResponse {
    let mut sentence = match build_sentence(req.tokens) {
        Ok(sentence) => sentence,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, &message),
    };

    let Ok(mut pipeline) = state.pipeline.lock() else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "pipeline indisponível");
    };
    let vectors = match pipeline.featurize(&mut sentence, req.labels) {
        Ok(vectors) => vectors,
        Err(err) => return internal_error(err),
    };
    let alphabet = pipeline.alphabet();
    let baseline = sentence.first_senses().unwrap_or_default();

    let tokens = sentence
        .tokens
        .iter()
        .zip(&vectors)
        .enumerate()
        .map(|(j, (token, fv))| TokenFeatures {
            text: token.text.clone(),
            baseline: baseline.get(j).map_or_else(|| Tag::Outside.label(), Tag::label),
            features: fv
                .named_items(alphabet)
                .map(|(name, value)| NamedFeature {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        })
        .collect::<Vec<_>>();
    info!(tokens = tokens.len(), alphabet = alphabet.len(), "sentence featurized");

    Json(FeaturesResponse {
        tokens,
        alphabet_size: alphabet.len(),
    })
    .into_response()
}

/// Monta a sentença da requisição, validando os rótulos BIO informados.
fn build_sentence(tokens: Vec<TokenRequest>) -> Result<Sentence, String> {
    if tokens.is_empty() {
        return Err("sentença vazia".to_string());
    }
    if let Some(bad) = tokens
        .iter()
        .flat_map(|t| [t.gold.as_deref(), t.prediction.as_deref()])
        .flatten()
        .find(|label| Tag::from_label(label).is_none())
    {
        return Err(format!("rótulo BIO inválido: {bad}"));
    }

    Ok(Sentence::new(
        tokens
            .into_iter()
            .map(|t| {
                let mut token = Token::new(t.text, t.stem, t.pos);
                if let Some(shape) = t.shape {
                    token.shape = shape;
                }
                token.gold = t.gold;
                token.prediction = t.prediction;
                token
            })
            .collect(),
    ))
}

async fn alphabet_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Ok(pipeline) = state.pipeline.lock() else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "pipeline indisponível");
    };
    Json(AlphabetResponse {
        size: pipeline.alphabet().len(),
        frozen: pipeline.is_frozen(),
    })
    .into_response()
}

/// Congela o alfabeto: features novas passam a ser descartadas.
async fn freeze_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Ok(mut pipeline) = state.pipeline.lock() else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "pipeline indisponível");
    };
    pipeline.freeze();
    info!(features = pipeline.alphabet().len(), "alphabet frozen");
    Json(AlphabetResponse {
        size: pipeline.alphabet().len(),
        frozen: true,
    })
    .into_response()
}

fn internal_error(err: SstError) -> axum::response::Response {
    tracing::error!(error = %err, "featurization failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(serde_json::json!({"error": message}))).into_response()
}
