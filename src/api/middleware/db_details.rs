//! Database details middleware
//!
//! 为每个响应附加当前 GeoIP 数据库的版本信息：
//! `X-Maxmind-Build: <ipVersion>-<buildEpoch>` 和 `X-Maxmind-Type`。
//! 尚未加载任何数据库时不输出这两个头。

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::warn;

use crate::services::MetadataGuard;

pub const X_MAXMIND_BUILD: &str = "x-maxmind-build";
pub const X_MAXMIND_TYPE: &str = "x-maxmind-type";

/// DatabaseDetails 中间件工厂
#[derive(Clone)]
pub struct DatabaseDetails {
    metadata: Arc<MetadataGuard>,
}

impl DatabaseDetails {
    pub fn new(metadata: Arc<MetadataGuard>) -> Self {
        Self { metadata }
    }
}

impl<S, B> Transform<S, ServiceRequest> for DatabaseDetails
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = DatabaseDetailsService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(DatabaseDetailsService {
            service: Rc::new(service),
            metadata: self.metadata.clone(),
        }))
    }
}

pub struct DatabaseDetailsService<S> {
    service: Rc<S>,
    metadata: Arc<MetadataGuard>,
}

impl<S, B> Service<ServiceRequest> for DatabaseDetailsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        // 请求进入时取快照，处理期间发生的重载不影响本次响应
        let snapshot = self.metadata.current();

        Box::pin(async move {
            let mut response = srv.call(req).await?;

            if let Some(metadata) = snapshot {
                let headers = response.headers_mut();
                match HeaderValue::from_str(&metadata.build_header()) {
                    Ok(value) => {
                        headers.insert(HeaderName::from_static(X_MAXMIND_BUILD), value);
                    }
                    Err(e) => warn!("Invalid X-Maxmind-Build header value: {}", e),
                }
                match HeaderValue::from_str(&metadata.database_type) {
                    Ok(value) => {
                        headers.insert(HeaderName::from_static(X_MAXMIND_TYPE), value);
                    }
                    Err(e) => warn!("Invalid X-Maxmind-Type header value: {}", e),
                }
            }

            Ok(response)
        })
    }
}
