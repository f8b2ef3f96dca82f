//! In-process reference implementation of the regions endpoint.
//!
//! Applies the documented validation rules over a fixed fixture, so the
//! checker and the catalog can run without the public service.

use std::{sync::Arc, time::Duration};

use axum::{
    error_handling::HandleErrorLayer,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower::{timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::models::{
    messages, ApiError, Country, ErrorBody, Region, RegionsPage, RegionsQuery, COUNTRY_CODES, PAGE_SIZES,
    Q_MAX_CHARS, Q_MIN_CHARS,
};

pub const REGIONS_PATH: &str = "/1.0/regions";

#[derive(OpenApi)]
#[openapi(
    paths(list_regions, health),
    components(schemas(Region, Country, RegionsPage, ApiError, ErrorBody)),
    tags((name = "regions", description = "Reference regions lookup"))
)]
struct ApiDoc;

#[derive(Clone, Debug)]
pub struct StubState {
    pub regions: Arc<Vec<Region>>,
    pub default_page_size: usize,
}

impl Default for StubState {
    fn default() -> Self {
        Self::new(fixture())
    }
}

impl StubState {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            regions: Arc::new(regions),
            default_page_size: 15,
        }
    }
}

/// Accepted parameters after validation.
#[derive(Debug, PartialEq, Eq)]
pub struct Listing {
    pub q: Option<String>,
    pub country_code: Option<String>,
    pub page: usize,
    pub page_size: usize,
}

/// Checks parameters in order q, country_code, page, page_size and reports
/// the first rule broken.
pub fn validate(query: &RegionsQuery, default_page_size: usize) -> Result<Listing, &'static str> {
    if let Some(q) = &query.q {
        let len = q.chars().count();
        if len < Q_MIN_CHARS {
            return Err(messages::Q_TOO_SHORT);
        }
        if len > Q_MAX_CHARS {
            return Err(messages::Q_TOO_LONG);
        }
    }

    if let Some(code) = &query.country_code {
        if !COUNTRY_CODES.contains(&code.as_str()) {
            return Err(messages::COUNTRY_CODE);
        }
    }

    let page = match &query.page {
        None => 1,
        Some(raw) => {
            let page: i64 = raw.trim().parse().map_err(|_| messages::PAGE_NOT_INTEGER)?;
            if page <= 0 {
                return Err(messages::PAGE_NOT_POSITIVE);
            }
            usize::try_from(page).unwrap_or(usize::MAX)
        }
    };

    let page_size = match &query.page_size {
        None => default_page_size,
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(size) if PAGE_SIZES.contains(&size) => size,
            _ => return Err(messages::PAGE_SIZE),
        },
    };

    Ok(Listing {
        q: query.q.clone(),
        country_code: query.country_code.clone(),
        page,
        page_size,
    })
}

/// Filters first, then pages; `total` is the filtered count.
pub fn select(regions: &[Region], listing: &Listing) -> RegionsPage {
    let needle = listing.q.as_ref().map(|q| q.to_lowercase());
    let matching: Vec<&Region> = regions
        .iter()
        .filter(|r| listing.country_code.as_ref().map_or(true, |c| r.country.code == *c))
        .filter(|r| needle.as_ref().map_or(true, |n| r.name.to_lowercase().contains(n.as_str())))
        .collect();

    let offset = (listing.page - 1).saturating_mul(listing.page_size);
    let items = matching
        .iter()
        .skip(offset)
        .take(listing.page_size)
        .map(|r| (*r).clone())
        .collect();

    RegionsPage {
        total: matching.len() as u64,
        items,
    }
}

/// Regions listing with in-body validation errors
#[utoipa::path(
    get,
    path = "/1.0/regions",
    tag = "regions",
    params(RegionsQuery),
    responses(
        (status = 200, description = "Page of regions, or `{error: {message}}` when a parameter is rejected", body = RegionsPage),
    )
)]
pub async fn list_regions(State(state): State<StubState>, Query(query): Query<RegionsQuery>) -> Response {
    match validate(&query, state.default_page_size) {
        Ok(listing) => Json(select(&state.regions, &listing)).into_response(),
        Err(message) => {
            tracing::debug!(?query, reason = message, "rejected");
            Json(ApiError::new(message)).into_response()
        }
    }
}

/// Healthcheck
#[utoipa::path(get, path = "/health", tag = "meta")]
pub async fn health(State(state): State<StubState>) -> impl IntoResponse {
    let json = serde_json::json!({
        "status": "ok",
        "regions": state.regions.len(),
        "default_page_size": state.default_page_size,
    });
    (StatusCode::OK, Json(json))
}

pub fn router(state: StubState) -> Router {
    // HandleErrorLayer has to sit outside the timeout, which is the layer that can fail
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(HandleErrorLayer::new(|e: BoxError| async move {
            if e.is::<tower::timeout::error::Elapsed>() {
                (StatusCode::REQUEST_TIMEOUT, "request timed out".to_string())
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
            }
        }))
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .into_inner();

    Router::new()
        .route("/health", get(health))
        .route(REGIONS_PATH, get(list_regions))
        .with_state(state)
        .layer(middleware)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

pub async fn serve(listener: tokio::net::TcpListener, state: StubState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("regions stub listening on http://{}{}", addr, REGIONS_PATH);
    }
    axum::serve(listener, router(state)).await
}

const FIXTURE: &[(u64, &str, &str, &str)] = &[
    (1, "Москва", "moscow", "ru"),
    (2, "Санкт-Петербург", "spb", "ru"),
    (3, "Новосибирск", "novosibirsk", "ru"),
    (4, "Екатеринбург", "ekaterinburg", "ru"),
    (5, "Казань", "kazan", "ru"),
    (6, "Нижний Новгород", "n_novgorod", "ru"),
    (7, "Великий Новгород", "v_novgorod", "ru"),
    (8, "Новокузнецк", "novokuznetsk", "ru"),
    (9, "Омск", "omsk", "ru"),
    (10, "Самара", "samara", "ru"),
    (11, "Ростов-на-Дону", "rostov", "ru"),
    (12, "Уфа", "ufa", "ru"),
    (13, "Красноярск", "krasnoyarsk", "ru"),
    (14, "Пермь", "perm", "ru"),
    (15, "Воронеж", "voronezh", "ru"),
    (16, "Астана", "astana", "kz"),
    (17, "Алматы", "almaty", "kz"),
    (18, "Шымкент", "shymkent", "kz"),
    (19, "Караганда", "karaganda", "kz"),
    (20, "Бишкек", "bishkek", "kg"),
    (21, "Ош", "osh", "kg"),
    (22, "Прага", "praha", "cz"),
    (23, "Брно", "brno", "cz"),
];

fn country_name(code: &str) -> &'static str {
    match code {
        "ru" => "Россия",
        "kz" => "Казахстан",
        "kg" => "Кыргызстан",
        "cz" => "Чехия",
        _ => "",
    }
}

pub fn fixture() -> Vec<Region> {
    FIXTURE
        .iter()
        .map(|&(id, name, code, country)| Region {
            id: Some(id),
            name: name.to_string(),
            code: Some(code.to_string()),
            country: Country {
                code: country.to_string(),
                name: Some(country_name(country).to_string()),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rejected(query: RegionsQuery) -> &'static str {
        validate(&query, 15).expect_err("query should be rejected")
    }

    #[test]
    fn q_length_counts_characters_not_bytes() {
        assert_eq!(rejected(RegionsQuery::new().q("")), messages::Q_TOO_SHORT);
        assert_eq!(rejected(RegionsQuery::new().q("но")), messages::Q_TOO_SHORT);
        assert!(validate(&RegionsQuery::new().q("нов"), 15).is_ok());
        assert!(validate(&RegionsQuery::new().q("ж".repeat(30)), 15).is_ok());
        assert_eq!(rejected(RegionsQuery::new().q("a".repeat(31))), messages::Q_TOO_LONG);
    }

    #[test]
    fn page_rules() {
        assert_eq!(rejected(RegionsQuery::new().page(0)), messages::PAGE_NOT_POSITIVE);
        assert_eq!(rejected(RegionsQuery::new().page(-1)), messages::PAGE_NOT_POSITIVE);
        assert_eq!(rejected(RegionsQuery::new().page(1.5)), messages::PAGE_NOT_INTEGER);
        assert_eq!(rejected(RegionsQuery::new().page("one")), messages::PAGE_NOT_INTEGER);
    }

    #[test]
    fn enumerated_parameters() {
        assert_eq!(rejected(RegionsQuery::new().country_code("asd")), messages::COUNTRY_CODE);
        assert_eq!(rejected(RegionsQuery::new().page_size(20)), messages::PAGE_SIZE);
        assert_eq!(rejected(RegionsQuery::new().page_size(0)), messages::PAGE_SIZE);
        for size in PAGE_SIZES {
            assert_eq!(validate(&RegionsQuery::new().page_size(size), 15).unwrap().page_size, size);
        }
    }

    #[test]
    fn first_broken_rule_wins() {
        let query = RegionsQuery::new().q("a").page(0).page_size(7);
        assert_eq!(rejected(query), messages::Q_TOO_SHORT);
    }

    #[test]
    fn defaults_apply_when_absent() {
        let listing = validate(&RegionsQuery::new(), 15).unwrap();
        assert_eq!(listing, Listing { q: None, country_code: None, page: 1, page_size: 15 });
    }

    #[test]
    fn select_filters_then_pages() {
        let regions = fixture();
        let listing = validate(&RegionsQuery::new().country_code("ru").page(2).page_size(10), 15).unwrap();
        let page = select(&regions, &listing);
        assert_eq!(page.total, 15);
        assert_eq!(page.items.len(), 5);
        assert!(page.items.iter().all(|r| r.country.code == "ru"));

        let beyond = validate(&RegionsQuery::new().page(100), 15).unwrap();
        let page = select(&regions, &beyond);
        assert_eq!(page.total, regions.len() as u64);
        assert!(page.items.is_empty());
    }

    #[test]
    fn select_matches_names_ignoring_case() {
        let listing = validate(&RegionsQuery::new().q("НОВ"), 15).unwrap();
        let names: Vec<String> = select(&fixture(), &listing).items.into_iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec!["Новосибирск", "Нижний Новгород", "Великий Новгород", "Новокузнецк"]
        );
    }
}
