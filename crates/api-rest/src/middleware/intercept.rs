//! Interception of controller endpoints.
//!
//! [`InterceptLayer`] runs the hook chain around one endpoint. The handler's
//! response is always returned as is; error responses are recognized by the
//! [`FailureInfo`] extension that [`ApiError`](crate::error::ApiError) and
//! [`handle_panic`] attach, and reported to the hooks as failures.

use crate::middleware::error_handler::handle_panic;
use aop_logging_interceptor::{
    FailureInfo, InterceptorChain, InvocationError, JoinPoint, RequestMetadata, RequestScope,
};
use axum::{
    extract::{ConnectInfo, OriginalUri, Request},
    response::Response,
    routing::MethodRouter,
    Router,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Layer running the hook chain around one endpoint
#[derive(Clone)]
pub struct InterceptLayer {
    chain: Arc<InterceptorChain>,
    join_point: Arc<JoinPoint>,
}

impl InterceptLayer {
    /// Create a layer describing calls to `join_point`
    pub fn new(chain: Arc<InterceptorChain>, join_point: JoinPoint) -> Self {
        Self {
            chain,
            join_point: Arc::new(join_point),
        }
    }
}

impl<S> Layer<S> for InterceptLayer {
    type Service = InterceptService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InterceptService {
            inner,
            chain: self.chain.clone(),
            join_point: self.join_point.clone(),
        }
    }
}

/// Service running the hook chain around its inner service
#[derive(Clone)]
pub struct InterceptService<S> {
    inner: S,
    chain: Arc<InterceptorChain>,
    join_point: Arc<JoinPoint>,
}

impl<S> Service<Request> for InterceptService<S>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        // The instance that was polled ready handles this request
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let chain = self.chain.clone();
        let join_point = self.join_point.clone();

        Box::pin(async move {
            let remote_addr = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr);
            let mut metadata = RequestMetadata::from_request(&req).with_remote_addr(remote_addr);
            // Nested routers see the path with their prefix stripped
            if let Some(OriginalUri(uri)) = req.extensions().get::<OriginalUri>() {
                metadata.uri = uri.clone();
            }
            let mut scope = RequestScope::new(metadata);

            let outcome = chain
                .proceed(&join_point, &mut scope, |context| async move {
                    req.extensions_mut().insert(context);

                    let response = match AssertUnwindSafe(inner.call(req)).catch_unwind().await {
                        Ok(Ok(response)) => response,
                        Ok(Err(infallible)) => match infallible {},
                        Err(panic) => handle_panic(panic),
                    };

                    match response.extensions().get::<FailureInfo>().cloned() {
                        Some(failure) => Err(RaisedFailure { failure, response }),
                        None => Ok(response),
                    }
                })
                .await;

            Ok(match outcome {
                Ok(response) => response,
                Err(raised) => raised.response,
            })
        })
    }
}

/// Error response observed on the way out of a handler
struct RaisedFailure {
    failure: FailureInfo,
    response: Response,
}

impl fmt::Debug for RaisedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaisedFailure")
            .field("failure", &self.failure)
            .field("status", &self.response.status())
            .finish()
    }
}

impl fmt::Display for RaisedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.failure.message())
    }
}

impl std::error::Error for RaisedFailure {}

impl InvocationError for RaisedFailure {
    fn type_name(&self) -> &str {
        self.failure.type_name()
    }

    fn trace(&self) -> Vec<String> {
        self.failure.trace().to_vec()
    }
}

/// Handler method of a controller, as reported in logs
#[derive(Debug, Clone)]
pub struct Endpoint {
    method: &'static str,
    args: Vec<&'static str>,
}

impl Endpoint {
    /// Create an endpoint for the handler named `method`
    pub fn new(method: &'static str) -> Self {
        Self {
            method,
            args: Vec::new(),
        }
    }

    /// Record a handler argument of type `T`
    pub fn arg<T: ?Sized>(mut self) -> Self {
        self.args.push(std::any::type_name::<T>());
        self
    }

    fn join_point(&self, declaring_type: &'static str) -> JoinPoint {
        JoinPoint::controller(declaring_type, self.method).with_arg_types(self.args.iter().copied())
    }
}

/// Router builder for the endpoints of controller type `C`.
///
/// ```rust,no_run
/// use aop_logging_api_rest::middleware::{Controller, Endpoint};
/// use aop_logging_interceptor::InterceptorChain;
/// use axum::{routing::get, Router};
/// use std::sync::Arc;
///
/// struct PingController;
///
/// let chain = Arc::new(InterceptorChain::new());
/// let router: Router = Controller::of::<PingController>(chain)
///     .route("/ping", Endpoint::new("ping"), get(|| async { "pong" }))
///     .into_router();
/// ```
pub struct Controller<S = ()> {
    declaring_type: &'static str,
    chain: Arc<InterceptorChain>,
    router: Router<S>,
}

impl<S> Controller<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Start a router for the endpoints of `C`
    pub fn of<C>(chain: Arc<InterceptorChain>) -> Self {
        Self {
            declaring_type: std::any::type_name::<C>(),
            chain,
            router: Router::new(),
        }
    }

    /// Add an intercepted route.
    ///
    /// Several endpoints may share a path with different HTTP methods. A
    /// method none of them handles gets the 405 fallback, which no hook sees.
    pub fn route(mut self, path: &str, endpoint: Endpoint, method_router: MethodRouter<S>) -> Self {
        let layer = InterceptLayer::new(self.chain.clone(), endpoint.join_point(self.declaring_type));
        self.router = self.router.route(path, method_router.route_layer(layer));
        self
    }

    /// Finish building
    pub fn into_router(self) -> Router<S> {
        self.router
    }
}
