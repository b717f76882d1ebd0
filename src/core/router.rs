use async_graphql::http::GraphiQLSource;
use async_graphql_axum::GraphQL;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post_service};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::core::config::{AppConfig, GraphQLConfig};
use crate::core::graphql::CatalogSchema;
use crate::core::middleware;

pub const GRAPHQL_PATH: &str = "/graphql";

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Assemble the HTTP surface: the GraphQL endpoint plus a health check
pub fn build_router(schema: CatalogSchema, app: &AppConfig, graphql: &GraphQLConfig) -> Router {
    let endpoint = if graphql.graphiql_enabled {
        get(graphiql).post_service(GraphQL::new(schema))
    } else {
        post_service(GraphQL::new(schema))
    };

    Router::new()
        .route(GRAPHQL_PATH, endpoint)
        .route("/health", get(health_check))
        .layer(RequestBodyLimitLayer::new(app.max_request_body_size))
        .layer(middleware::cors_layer(&app.cors_allowed_origins))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}
