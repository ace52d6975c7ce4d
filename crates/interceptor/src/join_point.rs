//! Descriptions of intercepted calls.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;

// Module path prefixes, e.g. `axum::extract::path::` in `axum::extract::path::Path<u64>`
static MODULE_PATH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[A-Za-z_][A-Za-z0-9_]*::)+").unwrap()
});

/// Kind of component a call belongs to. Pointcuts match on this tag only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Request handler
    Controller,
    /// Service-layer component
    Service,
    /// Persistence component
    Repository,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Controller => write!(f, "controller"),
            Self::Service => write!(f, "service"),
            Self::Repository => write!(f, "repository"),
        }
    }
}

/// The set of component kinds a hook applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointcut(&'static [ComponentKind]);

impl Pointcut {
    /// Every request handler
    pub const CONTROLLERS: Pointcut = Pointcut(&[ComponentKind::Controller]);

    /// Every service-layer component
    pub const SERVICES: Pointcut = Pointcut(&[ComponentKind::Service]);

    /// Match any of the given component kinds
    pub const fn within(kinds: &'static [ComponentKind]) -> Self {
        Self(kinds)
    }

    /// Check whether calls on the given component kind are matched
    pub fn matches(&self, kind: ComponentKind) -> bool {
        self.0.contains(&kind)
    }
}

/// One intercepted call: declaring type, method name, component kind and
/// argument type names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPoint {
    component: ComponentKind,
    declaring_type: Cow<'static, str>,
    method: Cow<'static, str>,
    args: Vec<&'static str>,
}

impl JoinPoint {
    /// Create a join point without arguments
    pub fn new(
        component: ComponentKind,
        declaring_type: impl Into<Cow<'static, str>>,
        method: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            component,
            declaring_type: declaring_type.into(),
            method: method.into(),
            args: Vec::new(),
        }
    }

    /// Create a join point on a request handler
    pub fn controller(
        declaring_type: impl Into<Cow<'static, str>>,
        method: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(ComponentKind::Controller, declaring_type, method)
    }

    /// Create a join point on a service-layer component
    pub fn service(
        declaring_type: impl Into<Cow<'static, str>>,
        method: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(ComponentKind::Service, declaring_type, method)
    }

    /// Record an argument of type `T`
    pub fn arg<T: ?Sized>(mut self) -> Self {
        self.args.push(std::any::type_name::<T>());
        self
    }

    /// Record arguments by type name
    pub fn with_arg_types(mut self, args: impl IntoIterator<Item = &'static str>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn component(&self) -> ComponentKind {
        self.component
    }

    /// Fully qualified declaring type name
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Declaring type name without its module path
    pub fn class_name(&self) -> &str {
        simple_class_name(&self.declaring_type)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Argument type names as recorded
    pub fn args(&self) -> &[&'static str] {
        &self.args
    }

    /// `Class.method`, as used in error-context records
    pub fn qualified_method(&self) -> String {
        format!("{}.{}", self.class_name(), self.method)
    }

    /// Argument type summary, e.g. `[Path<u64>, Json<CreateOrderRequest>]`
    pub fn argument_summary(&self) -> String {
        format_arguments(&self.args)
    }
}

impl fmt::Display for JoinPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}()", self.class_name(), self.method)
    }
}

/// Reduce a fully qualified type name to its last segment.
///
/// Both `.` and `::` separators are recognized.
///
/// # Examples
///
/// ```
/// use aop_logging_interceptor::simple_class_name;
///
/// assert_eq!(simple_class_name("com.example.service.OrderService"), "OrderService");
/// assert_eq!(simple_class_name("shop::routes::OrderController"), "OrderController");
/// ```
pub fn simple_class_name(full_name: &str) -> &str {
    full_name
        .rsplit(|c| c == '.' || c == ':')
        .next()
        .unwrap_or(full_name)
}

/// Strip module paths from every path in a type name, generic parameters included.
pub fn simplify_type_name(type_name: &str) -> Cow<'_, str> {
    MODULE_PATH_REGEX.replace_all(type_name, "")
}

/// Format argument type names for logging
pub fn format_arguments(args: &[&str]) -> String {
    let simplified: Vec<Cow<'_, str>> = args.iter().map(|arg| simplify_type_name(arg)).collect();
    format!("[{}]", simplified.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct CreateOrderRequest;

    #[test]
    fn test_simple_class_name() {
        assert_eq!(simple_class_name("com.example.service.OrderService"), "OrderService");
        assert_eq!(simple_class_name("shop::api::OrderController"), "OrderController");
        assert_eq!(simple_class_name("OrderService"), "OrderService");
        assert_eq!(simple_class_name(""), "");
    }

    #[test]
    fn test_simplify_type_name() {
        assert_eq!(simplify_type_name("axum::extract::path::Path<u64>"), "Path<u64>");
        assert_eq!(
            simplify_type_name("axum::json::Json<shop::dto::CreateOrderRequest>"),
            "Json<CreateOrderRequest>"
        );
        assert_eq!(
            simplify_type_name("core::option::Option<alloc::string::String>"),
            "Option<String>"
        );
        assert_eq!(simplify_type_name("&str"), "&str");
    }

    #[test]
    fn test_format_arguments() {
        assert_eq!(format_arguments(&[]), "[]");
        assert_eq!(
            format_arguments(&["u64", "alloc::string::String"]),
            "[u64, String]"
        );
    }

    #[test]
    fn test_join_point_accessors() {
        let join_point = JoinPoint::controller("shop::api::OrderController", "create_order")
            .arg::<u64>()
            .arg::<CreateOrderRequest>();

        assert_eq!(join_point.component(), ComponentKind::Controller);
        assert_eq!(join_point.class_name(), "OrderController");
        assert_eq!(join_point.method(), "create_order");
        assert_eq!(join_point.qualified_method(), "OrderController.create_order");
        assert_eq!(join_point.args().len(), 2);
        assert_eq!(join_point.argument_summary(), "[u64, CreateOrderRequest]");
        assert_eq!(join_point.to_string(), "OrderController.create_order()");
    }

    #[test]
    fn test_pointcut_matching() {
        assert!(Pointcut::CONTROLLERS.matches(ComponentKind::Controller));
        assert!(!Pointcut::CONTROLLERS.matches(ComponentKind::Service));
        assert!(Pointcut::SERVICES.matches(ComponentKind::Service));

        let both = Pointcut::within(&[ComponentKind::Controller, ComponentKind::Repository]);
        assert!(both.matches(ComponentKind::Repository));
        assert!(!both.matches(ComponentKind::Service));
    }

    proptest! {
        #[test]
        fn test_simple_class_name_is_last_segment(
            segments in proptest::collection::vec("[a-zA-Z][a-zA-Z0-9]{0,8}", 1..6)
        ) {
            let full_name = segments.join(".");
            let expected = segments.last().unwrap();
            prop_assert_eq!(simple_class_name(&full_name), expected.as_str());
        }
    }
}
