//! Request span middleware
//!
//! 每个请求一个 tracing span，带上 UUID、方法和路径，span 内的日志
//! （包括 lookup 的错误日志）都能按 request_id 关联；UUID 通过
//! X-Request-ID 响应头返回给客户端。请求结束时在 debug 级别记录状态和耗时。

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::time::Instant;
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// RequestSpan 中间件工厂
#[derive(Clone, Default)]
pub struct RequestSpan;

impl<S, B> Transform<S, ServiceRequest> for RequestSpan
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestSpanService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestSpanService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestSpanService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestSpanService<S>
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
        let start = Instant::now();

        let request_id = Uuid::new_v4().to_string();

        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %req.method(),
            path = %req.path(),
        );

        Box::pin(
            async move {
                let result = srv.call(req).await;

                match result {
                    Ok(mut response) => {
                        debug!(
                            status = response.status().as_u16(),
                            elapsed_us = start.elapsed().as_micros() as u64,
                            "request finished"
                        );
                        if let Ok(value) = HeaderValue::from_str(&request_id) {
                            response
                                .headers_mut()
                                .insert(HeaderName::from_static(X_REQUEST_ID), value);
                        }
                        Ok(response)
                    }
                    Err(e) => {
                        debug!(
                            elapsed_us = start.elapsed().as_micros() as u64,
                            "request failed: {}",
                            e
                        );
                        Err(e)
                    }
                }
            }
            .instrument(span),
        )
    }
}
