//! Hook chain run around intercepted calls.
//!
//! The request-handling layer calls [`InterceptorChain::proceed`] with a
//! description of the call, the per-request scope and the deferred call
//! itself. Matching hooks run before the call in registration order and
//! after it in reverse order. The call's result is returned unchanged, and
//! the scope's correlation context is always emptied on the way out, even
//! when the returned future is dropped before completion.

use crate::context::{CorrelationSnapshot, RequestScope};
use crate::hooks::{
    AdvancedLoggingInterceptor, BasicLoggingInterceptor, ExceptionContextInterceptor,
    ServiceLoggingInterceptor,
};
use crate::join_point::{simple_class_name, JoinPoint, Pointcut};
use aop_logging_common::{AppConfig, InterceptionMode};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, Instrument};

/// Error type of an intercepted call.
///
/// Hooks only observe the error through [`FailureInfo`]; the value itself
/// is handed back to the caller untouched.
pub trait InvocationError: StdError + 'static {
    /// Type name reported in error-context records
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The error's message followed by each cause in its `source()` chain
    fn trace(&self) -> Vec<String> {
        let mut trace = vec![self.to_string()];
        let mut source = self.source();
        while let Some(cause) = source {
            trace.push(cause.to_string());
            source = cause.source();
        }
        trace
    }
}

impl InvocationError for std::io::Error {}

/// What hooks see of a failed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureInfo {
    type_name: String,
    message: String,
    trace: Vec<String>,
}

impl FailureInfo {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>, trace: Vec<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            trace,
        }
    }

    /// Describe an error raised by an intercepted call
    pub fn of<E: InvocationError>(error: &E) -> Self {
        Self::new(error.type_name(), error.to_string(), error.trace())
    }

    /// Fully qualified failure type name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn simple_type_name(&self) -> &str {
        simple_class_name(&self.type_name)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Multi-line diagnostic trace: the failure, then one line per cause
    pub fn render_trace(&self) -> String {
        let mut rendered = format!("{}: {}", self.type_name, self.message);
        for cause in self.trace.iter().skip(1) {
            rendered.push_str("\n    caused by: ");
            rendered.push_str(cause);
        }
        rendered
    }
}

impl fmt::Display for FailureInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.simple_type_name(), self.message)
    }
}

/// Before / after-returning / after-throwing hook
pub trait InterceptorHook: Send + Sync {
    /// Name used in registration logs
    fn name(&self) -> &'static str;

    /// Component kinds this hook is attached to
    fn pointcut(&self) -> Pointcut;

    /// Runs before the call
    fn before(&self, _join_point: &JoinPoint, _scope: &mut RequestScope) {}

    /// Runs after the call returned successfully
    fn after_returning(&self, _join_point: &JoinPoint, _scope: &RequestScope, _elapsed: Duration) {}

    /// Runs after the call failed
    fn after_throwing(
        &self,
        _join_point: &JoinPoint,
        _scope: &RequestScope,
        _elapsed: Duration,
        _failure: &FailureInfo,
    ) {
    }
}

/// Ordered list of registered hooks
#[derive(Clone, Default)]
pub struct InterceptorChain {
    hooks: Vec<Arc<dyn InterceptorHook>>,
}

impl InterceptorChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the chain selected by the configuration.
    ///
    /// - `advanced` mode: correlation/performance logging plus exception context on controllers
    /// - `basic` mode: entry/exit logging on controllers
    /// - `service_layer`: debug logging on services
    pub fn from_config(config: &AppConfig) -> Self {
        let mut chain = Self::new();

        match config.interception.mode {
            InterceptionMode::Advanced => {
                chain.register(Arc::new(AdvancedLoggingInterceptor::new(
                    &config.logging,
                    &config.correlation,
                )));
                chain.register(Arc::new(ExceptionContextInterceptor::new()));
            }
            InterceptionMode::Basic => {
                chain.register(Arc::new(BasicLoggingInterceptor::new()));
            }
        }

        if config.interception.service_layer {
            chain.register(Arc::new(ServiceLoggingInterceptor::new()));
        }

        chain
    }

    /// Append a hook
    pub fn with_hook(mut self, hook: impl InterceptorHook + 'static) -> Self {
        self.register(Arc::new(hook));
        self
    }

    /// Append a shared hook
    pub fn register(&mut self, hook: Arc<dyn InterceptorHook>) {
        debug!(hook = hook.name(), "Registered interceptor hook");
        self.hooks.push(hook);
    }

    /// Registered hook names, in registration order
    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run `call` with every hook whose pointcut matches `join_point`.
    ///
    /// `call` receives a snapshot of the correlation context as populated
    /// by the `before` hooks and runs inside a span carrying its entries.
    pub async fn proceed<T, E, F, Fut>(
        &self,
        join_point: &JoinPoint,
        scope: &mut RequestScope,
        call: F,
    ) -> Result<T, E>
    where
        F: FnOnce(CorrelationSnapshot) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: InvocationError,
    {
        let hooks: Vec<&Arc<dyn InterceptorHook>> = self
            .hooks
            .iter()
            .filter(|hook| hook.pointcut().matches(join_point.component()))
            .collect();

        let mut scope = ScopeGuard::new(scope);
        let started = Instant::now();

        for hook in &hooks {
            hook.before(join_point, &mut scope);
        }

        let snapshot = scope.correlation().snapshot();
        let span = snapshot.span();
        let result = call(snapshot).instrument(span).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(_) => {
                for hook in hooks.iter().rev() {
                    hook.after_returning(join_point, &scope, elapsed);
                }
            }
            Err(error) => {
                let failure = FailureInfo::of(error);
                for hook in hooks.iter().rev() {
                    hook.after_throwing(join_point, &scope, elapsed, &failure);
                }
            }
        }

        result
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("hooks", &self.hook_names())
            .finish()
    }
}

/// Clears the scope's correlation context when dropped.
struct ScopeGuard<'a> {
    scope: &'a mut RequestScope,
}

impl<'a> ScopeGuard<'a> {
    fn new(scope: &'a mut RequestScope) -> Self {
        Self { scope }
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = RequestScope;

    fn deref(&self) -> &RequestScope {
        self.scope
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut RequestScope {
        self.scope
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.scope.correlation_mut().clear();
    }
}
