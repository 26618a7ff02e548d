use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use http::{Request, Response};
use tower::{Layer, Service};
use tracing::{info, warn};

use crate::server::routes::RouteTable;

/// A Tower layer that logs gRPC requests, tagged through the route table.
#[derive(Clone)]
pub struct GrpcLoggingLayer {
    routes: Arc<RouteTable>,
}

impl GrpcLoggingLayer {
    #[must_use]
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self { routes }
    }
}

impl<S> Layer<S> for GrpcLoggingLayer {
    type Service = GrpcLoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GrpcLoggingService {
            inner,
            routes: self.routes.clone(),
        }
    }
}

#[derive(Clone)]
pub struct GrpcLoggingService<S> {
    inner: S,
    routes: Arc<RouteTable>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for GrpcLoggingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let start = Instant::now();
        let path = req.uri().path().to_string();

        // CORS preflights and unknown paths have no route; tonic answers the
        // latter with UNIMPLEMENTED
        let (operation, kind) = match self.routes.resolve(req.method(), &path) {
            Some(route) => {
                info!(
                    grpc.path = %path,
                    operation = %route.operation,
                    kind = %route.kind,
                    "gRPC request started"
                );
                (route.operation, route.kind.to_string())
            }
            None => {
                warn!(
                    http.method = %req.method(),
                    grpc.path = %path,
                    "Unrouted request"
                );
                ("unrouted", String::from("none"))
            }
        };

        let mut inner = self.inner.clone();
        Box::pin(async move {
            let result = inner.call(req).await;
            let duration_ms = start.elapsed().as_millis();

            match &result {
                Ok(response) => {
                    let status = response
                        .headers()
                        .get("grpc-status")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("0");
                    info!(
                        operation = %operation,
                        kind = %kind,
                        grpc.status = %status,
                        duration_ms = %duration_ms,
                        "gRPC request completed"
                    );
                }
                Err(_) => {
                    info!(
                        operation = %operation,
                        kind = %kind,
                        grpc.status = "error",
                        duration_ms = %duration_ms,
                        "gRPC request failed"
                    );
                }
            }

            result
        })
    }
}
