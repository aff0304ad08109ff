//! Address lookup endpoints
//!
//! `GET /api/{addr}` returns the full JSON result; `GET /api/{addr}/{filter}`
//! returns the selected fields joined by `|`. `{addr}` is an IP literal, a
//! hostname, or `self`/`me` for the caller's own address.

use std::sync::Arc;

use actix_web::http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde::Deserialize;
use tracing::{debug, error, trace};

use crate::cache::CacheStatus;
use crate::errors::GeoError;
use crate::services::{LookupService, ResponseShape};

pub const X_CACHE: &str = "x-cache";
const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Deserialize)]
pub struct LookupPath {
    pub addr: String,
    pub filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    pub pretty: Option<String>,
}

pub struct LookupHandler;

impl LookupHandler {
    pub async fn lookup(
        req: HttpRequest,
        path: web::Path<LookupPath>,
        service: web::Data<Arc<LookupService>>,
    ) -> HttpResponse {
        let LookupPath { addr, filter } = path.into_inner();

        // 查询串解析失败时按未设置处理
        let query = web::Query::<LookupQuery>::from_query(req.query_string())
            .map(web::Query::into_inner)
            .unwrap_or_default();
        let shape = ResponseShape::from_request(filter.as_deref(), query.pretty.as_deref());

        let outcome = match service.lookup(&addr, req.peer_addr()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_not_found() {
                    debug!("Lookup for {:?} not found: {}", addr, e);
                } else {
                    error!("Lookup for {:?} failed: {}", addr, e);
                }
                return Self::error_response(&e, CacheStatus::Miss);
            }
        };

        trace!("Lookup for {:?}: {}", addr, outcome.cache_status);

        match shape.render(outcome.result.as_ref()) {
            Ok(body) => HttpResponse::Ok()
                .insert_header((CONTENT_TYPE, JSON_CONTENT_TYPE))
                .insert_header((
                    HeaderName::from_static(X_CACHE),
                    outcome.cache_status.as_header_value(),
                ))
                .body(body),
            Err(e) => {
                error!("Failed to render lookup result for {:?}: {}", addr, e);
                Self::error_response(&e, outcome.cache_status)
            }
        }
    }

    fn error_response(err: &GeoError, cache_status: CacheStatus) -> HttpResponse {
        let mut response = err.error_response();
        response.headers_mut().insert(
            HeaderName::from_static(X_CACHE),
            HeaderValue::from_static(cache_status.as_header_value()),
        );
        response
    }
}

/// Lookup 路由配置
pub fn lookup_routes() -> actix_web::Scope {
    web::scope("/api")
        .route("/{addr}", web::get().to(LookupHandler::lookup))
        .route("/{addr}", web::head().to(LookupHandler::lookup))
        .route("/{addr}/{filter}", web::get().to(LookupHandler::lookup))
        .route("/{addr}/{filter}", web::head().to(LookupHandler::lookup))
}
