// Sales Dashboard - Web Server
// Serves the single-page dashboard and runs one render pass per request

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use sales_dashboard::{
    logging, render_pass, Config, Dashboard, DashboardError, FilterState, HttpFetcher, Metric, Region, SectionKind,
    Totals, TopN,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state (read-only)
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Sidebar state as sent by the page.
/// Empty strings mean "all", as in the upstream query.
#[derive(Debug, Default, Deserialize)]
struct DashboardQuery {
    #[serde(default)]
    regiao: String,
    #[serde(default)]
    ano: String,
    /// Seller allow-list as a JSON array of names; names may contain commas
    #[serde(default)]
    vendedores: String,
    top: Option<usize>,
}

impl DashboardQuery {
    fn into_filters(self) -> Result<(FilterState, TopN), DashboardError> {
        let region: Region = self.regiao.parse()?;

        let year = match self.ano.trim() {
            "" => None,
            text => Some(
                text.parse::<i32>()
                    .map_err(|_| DashboardError::UnparsableYear(text.to_string()))?,
            ),
        };

        let sellers: Vec<String> = match self.vendedores.trim() {
            "" => Vec::new(),
            text => serde_json::from_str(text).map_err(|e| DashboardError::InvalidSellerList(e.to_string()))?,
        };

        let top = match self.top {
            Some(n) => TopN::new(n)?,
            None => TopN::default(),
        };

        Ok((FilterState::new(region, year)?.with_sellers(sellers), top))
    }
}

#[derive(Serialize)]
struct SectionResponse {
    kind: SectionKind,
    title: &'static str,
    metrics: Vec<Metric>,
    left: Vec<Value>,
    right: Vec<Value>,
}

/// Dashboard with charts already converted to Plotly figures
#[derive(Serialize)]
struct DashboardResponse {
    filters: FilterState,
    top_sellers: TopN,
    totals: Totals,
    seller_options: Vec<String>,
    sections: Vec<SectionResponse>,
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            filters: dashboard.filters,
            top_sellers: dashboard.top_sellers,
            totals: dashboard.totals,
            seller_options: dashboard.seller_options,
            sections: dashboard
                .sections
                .into_iter()
                .map(|s| SectionResponse {
                    kind: s.kind,
                    title: s.title,
                    metrics: s.metrics,
                    left: s.left.iter().map(|c| c.to_plotly()).collect(),
                    right: s.right.iter().map(|c| c.to_plotly()).collect(),
                })
                .collect(),
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ApiResponse::<()>::err(message))).into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/regions - Region options for the sidebar
async fn get_regions() -> impl IntoResponse {
    let regions: Vec<&str> = Region::ALL.iter().map(|r| r.name()).collect();
    Json(ApiResponse::ok(regions))
}

/// GET /api/dashboard - One full render pass for the given filters
async fn get_dashboard(State(state): State<AppState>, Query(query): Query<DashboardQuery>) -> Response {
    let (filters, top) = match query.into_filters() {
        Ok(parsed) => parsed,
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    };

    let api_url = state.config.api_url.clone();

    // The pipeline is blocking (one synchronous GET); keep it off the async workers
    let result = tokio::task::spawn_blocking(move || {
        let fetcher = HttpFetcher::new(api_url)?;
        render_pass(&fetcher, &filters, top)
    })
    .await;

    match result {
        Ok(Ok(dashboard)) => (StatusCode::OK, Json(ApiResponse::ok(DashboardResponse::from(dashboard)))).into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "render pass failed");
            let status = if e.is_upstream() {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            error_response(status, e.to_string())
        }
        Err(join_error) => {
            error!(error = %join_error, "render task panicked");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
        }
    }
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/regions", get(get_regions))
        .route("/dashboard", get(get_dashboard))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("web"))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Config::from_env();
    info!(api = %config.api_url, "sales API configured");

    let state = AppState {
        config: Arc::new(config.clone()),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", config.bind_addr, e))?;

    info!(addr = %config.bind_addr, "dashboard server listening");
    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   API: http://{}/api/dashboard", config.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(regiao: &str, ano: &str, vendedores: &str, top: Option<usize>) -> DashboardQuery {
        DashboardQuery {
            regiao: regiao.to_string(),
            ano: ano.to_string(),
            vendedores: vendedores.to_string(),
            top,
        }
    }

    #[test]
    fn test_empty_query_means_all() {
        let (filters, top) = DashboardQuery::default().into_filters().unwrap();
        assert_eq!(filters, FilterState::default());
        assert_eq!(top, TopN::default());
    }

    #[test]
    fn test_query_with_everything() {
        let (filters, top) = query("nordeste", "2021", r#"["Ana", "Bruno"]"#, Some(8))
            .into_filters()
            .unwrap();

        assert_eq!(filters.region, Region::Nordeste);
        assert_eq!(filters.year, Some(2021));
        assert_eq!(filters.sellers.len(), 2);
        assert!(filters.sellers.contains("Bruno"));
        assert_eq!(top.get(), 8);
    }

    #[test]
    fn test_seller_names_keep_commas_and_spaces() {
        let (filters, _) = query("", "", r#"["Silva, Ana", " Bruno "]"#, None).into_filters().unwrap();

        assert_eq!(filters.sellers.len(), 2);
        assert!(filters.sellers.contains("Silva, Ana"));
        assert!(filters.sellers.contains(" Bruno "));
        assert!(!filters.sellers.contains("Ana"));
    }

    #[test]
    fn test_empty_seller_array_means_no_filter() {
        let (filters, _) = query("", "", "[]", None).into_filters().unwrap();
        assert!(filters.sellers.is_empty());
    }

    #[test]
    fn test_malformed_seller_list_is_rejected() {
        let err = query("", "", "Ana,Bruno", None).into_filters().unwrap_err();
        assert!(matches!(err, DashboardError::InvalidSellerList(_)));
        assert!(!err.is_upstream());
    }

    #[test]
    fn test_query_rejects_out_of_range() {
        assert!(query("", "1999", "", None).into_filters().is_err());
        assert!(matches!(
            query("", "abc", "", None).into_filters(),
            Err(DashboardError::UnparsableYear(text)) if text == "abc"
        ));
        assert!(query("", "", "", Some(1)).into_filters().is_err());
        assert!(query("Marte", "", "", None).into_filters().is_err());
    }

    #[test]
    fn test_index_sends_sellers_as_json_and_inserts_text_only() {
        let page = include_str!("../web/index.html");

        assert!(page.contains("vendedores: JSON.stringify("));
        assert!(!page.contains("innerHTML"));
        assert!(page.contains("o.textContent = name"));
    }

    #[tokio::test]
    async fn test_bad_query_returns_422_without_fetching() {
        let state = AppState {
            config: Arc::new(Config::default()),
        };

        let response = get_dashboard(State(state), Query(query("", "", "", Some(42)))).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unreachable_api_returns_502() {
        let state = AppState {
            config: Arc::new(Config {
                api_url: "http://127.0.0.1:9/produtos".to_string(),
                ..Config::default()
            }),
        };

        let response = get_dashboard(State(state), Query(DashboardQuery::default())).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
