use actix_cors::Cors;
use actix_web::{error::JsonPayloadError, web, App, HttpRequest, HttpResponse, HttpServer, Result as ActixResult};
use clausematch_assembler::{QueryAssembler, RawQuery, SplitQuery};
use clausematch_core::{Error, FieldName, FieldTexts, Query};
use clausematch_similarity::{
    ExplainedCandidate, MatchResponse, Ranker, TemplateResponse, DEFAULT_TOP_K,
};
use clausematch_storage::CatalogManager;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Listen address and request defaults for the REST server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// K used when a request does not carry `top_k`
    pub default_top_k: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8031,
            default_top_k: DEFAULT_TOP_K,
        }
    }
}

/// Shared state behind every handler
pub struct AppState {
    pub catalog: Arc<CatalogManager>,
    pub assembler: QueryAssembler,
    pub ranker: Ranker,
    pub default_top_k: usize,
}

impl AppState {
    pub fn new(catalog: Arc<CatalogManager>, assembler: QueryAssembler) -> Self {
        Self {
            catalog,
            assembler,
            ranker: Ranker::default(),
            default_top_k: DEFAULT_TOP_K,
        }
    }

    #[must_use]
    pub fn with_default_top_k(mut self, k: usize) -> Self {
        self.default_top_k = k;
        self
    }
}

/// Body of `POST /find_similar_templates/`
#[derive(Debug, Deserialize)]
struct LegacyMatchRequest {
    #[serde(default, alias = "category_primary")]
    template1: String,
    #[serde(default, alias = "category_secondary")]
    template2: String,
    #[serde(default, alias = "subject_matter")]
    text1: String,
    #[serde(default, alias = "parties")]
    text2: String,
    #[serde(default, alias = "price_payment")]
    text3: String,
    #[serde(default, alias = "performance_terms")]
    text4: String,
    top_k: Option<usize>,
}

impl LegacyMatchRequest {
    fn split_query(&self) -> SplitQuery {
        SplitQuery::default()
            .with_field(FieldName::SubjectMatter, self.text1.as_str())
            .with_field(FieldName::Parties, self.text2.as_str())
            .with_field(FieldName::PricePayment, self.text3.as_str())
            .with_field(FieldName::PerformanceTerms, self.text4.as_str())
            .with_categories(self.template1.as_str(), self.template2.as_str())
    }
}

/// Body of `POST /templates/match`
#[derive(Debug, Deserialize)]
struct MatchRequest {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    history: Vec<String>,
    #[serde(default)]
    fields: Option<FieldTexts>,
    #[serde(default, alias = "template1")]
    category_primary: String,
    #[serde(default, alias = "template2")]
    category_secondary: String,
    top_k: Option<usize>,
    #[serde(default)]
    with_text: bool,
    #[serde(default)]
    summary: bool,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: Arc<AppState>, config: ServerConfig) -> std::io::Result<()> {
        info!("REST API listening on {}:{}", config.host, config.port);

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(state.clone()))
                .configure(configure)
        })
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
    }
}

/// Register every route; shared by the server and the tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/health", web::get().to(health))
        .route("/find_similar_templates/", web::post().to(find_similar_templates))
        .route("/templates/match", web::post().to(match_templates))
        .route("/catalog", web::get().to(catalog_info))
        .route("/catalog/reload", web::post().to(reload_catalog));
}

/// Map a domain error to its HTTP response
pub fn error_response(err: &Error) -> HttpResponse {
    let mut builder = match err {
        Error::EmbeddingUnavailable(_) => HttpResponse::BadGateway(),
        Error::DimensionMismatch { .. } => HttpResponse::UnprocessableEntity(),
        Error::CatalogUnavailable(_) => HttpResponse::ServiceUnavailable(),
        Error::InvalidConfig(_) | Error::Serialization(_) => HttpResponse::BadRequest(),
        Error::MalformedCatalogEntry { .. } | Error::Io(_) => HttpResponse::InternalServerError(),
    };

    builder.json(serde_json::json!({
        "error": err.to_string(),
        "kind": err.kind(),
    }))
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": message.into(),
        "kind": "bad_request",
    }))
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = bad_request(format!("Invalid request body: {}", err));
    actix_web::error::InternalError::from_response(err, response).into()
}

async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })))
}

async fn find_similar_templates(
    state: web::Data<Arc<AppState>>,
    req: web::Json<LegacyMatchRequest>,
) -> ActixResult<HttpResponse> {
    let query = match state.assembler.assemble_split(&req.split_query()).await {
        Ok(q) => q,
        Err(e) => return Ok(log_and_respond("assemble", &e)),
    };

    let snapshot = state.catalog.snapshot();
    let k = req.top_k.unwrap_or(state.default_top_k);

    match state.ranker.rank(&query, snapshot.all_entries(), k) {
        Ok(ranked) => {
            debug!("Legacy match: {} of {} templates returned", ranked.len(), snapshot.len());
            Ok(HttpResponse::Ok().json(TemplateResponse::from_ranked(&ranked)))
        }
        Err(e) => Ok(log_and_respond("rank", &e)),
    }
}

async fn match_templates(
    state: web::Data<Arc<AppState>>,
    req: web::Json<MatchRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();

    let assembled = if let Some(fields) = req.fields.clone() {
        let split = SplitQuery {
            fields,
            category_primary: req.category_primary.clone(),
            category_secondary: req.category_secondary.clone(),
        };
        state.assembler.assemble_split(&split).await
    } else if req.text.as_deref().is_some_and(|t| !t.trim().is_empty()) || !req.history.is_empty() {
        let raw = RawQuery {
            text: req.text.clone().unwrap_or_default(),
            history: req.history.clone(),
            category_primary: req.category_primary.clone(),
            category_secondary: req.category_secondary.clone(),
        };
        state.assembler.assemble_raw(&raw).await
    } else {
        return Ok(bad_request("One of 'text', 'history' or 'fields' must be provided"));
    };

    let query: Query = match assembled {
        Ok(q) => q,
        Err(e) => return Ok(log_and_respond("assemble", &e)),
    };

    let snapshot = state.catalog.snapshot();
    let k = req.top_k.unwrap_or(state.default_top_k);

    let ranked = match state.ranker.rank(&query, snapshot.all_entries(), k) {
        Ok(r) => r,
        Err(e) => return Ok(log_and_respond("rank", &e)),
    };

    let policy = state.ranker.policy();
    let result = ExplainedCandidate::from_ranked_list(ranked, snapshot.all_entries(), policy, req.with_text);
    let mut response = MatchResponse::new(result, snapshot.len());
    if req.summary {
        response = response.with_summary(policy);
    }

    debug!(
        "Match: {} of {} templates returned, best {:.1}",
        response.stats.results_count, response.stats.candidates_count, response.stats.best_score
    );
    Ok(HttpResponse::Ok().json(response))
}

async fn catalog_info(state: web::Data<Arc<AppState>>) -> ActixResult<HttpResponse> {
    let snapshot = state.catalog.snapshot();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "source": state.catalog.source_description(),
        "report": snapshot.report(),
    })))
}

async fn reload_catalog(state: web::Data<Arc<AppState>>) -> ActixResult<HttpResponse> {
    let catalog = state.catalog.clone();
    let outcome = web::block(move || catalog.reload()).await?;

    match outcome {
        Ok(report) => {
            info!("Catalog reloaded: {} entries, {} dropped", report.loaded, report.dropped);
            Ok(HttpResponse::Ok().json(serde_json::json!({ "result": report })))
        }
        Err(e) => {
            error!("Catalog reload failed, keeping previous snapshot: {}", e);
            Ok(error_response(&e))
        }
    }
}

fn log_and_respond(stage: &str, err: &Error) -> HttpResponse {
    warn!("Request failed during {}: {}", stage, err);
    error_response(err)
}
