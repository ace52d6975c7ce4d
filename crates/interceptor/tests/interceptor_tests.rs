//! Integration tests for the built-in hooks running through the chain.

use aop_logging_common::PERFORMANCE_TARGET;
use aop_logging_interceptor::{InterceptorChain, JoinPoint, RequestScope};
use aop_logging_testing::*;
use std::time::Duration;
use tracing::Level;

fn advanced_chain() -> InterceptorChain {
    InterceptorChain::from_config(&create_test_config())
}

#[tokio::test]
async fn test_successful_call_logs_start_completion_and_performance() {
    let (logs, _guard) = capture_logs();
    let chain = advanced_chain();
    let mut scope = RequestScope::new(create_test_request());

    let result: Result<&str, MockError> = chain
        .proceed(
            &create_controller_join_point("get_order"),
            &mut scope,
            |_| async { Ok("order-7") },
        )
        .await;

    assert_eq!(result.unwrap(), "order-7");
    assert!(scope.correlation().is_empty());

    let started = logs.find("Starting: OrderController.get_order()").unwrap();
    let request_id = started.field("request_id").unwrap().to_string();
    assert_eq!(request_id.len(), 8);
    assert!(started.message.starts_with(&format!("→ [{}]", request_id)));

    let completed = logs.find("Completed: OrderController.get_order() in").unwrap();
    assert_eq!(completed.level, Level::INFO);
    assert_eq!(completed.field("request_id"), Some(request_id.as_str()));

    let performance = logs.events_for_target(PERFORMANCE_TARGET);
    assert_eq!(performance.len(), 1);
    assert_eq!(performance[0].level, Level::INFO);
    let payload = performance[0].json_payload().unwrap();
    assert_eq!(payload["class"], "OrderController");
    assert_eq!(payload["method"], "get_order");
    assert_eq!(payload["success"], true);
    assert_eq!(payload["requestId"], request_id.as_str());
    assert!(payload.get("slow").is_none());
}

#[tokio::test]
async fn test_slow_call_is_reported_at_warn() {
    let (logs, _guard) = capture_logs();
    let chain = InterceptorChain::from_config(&AppConfigBuilder::new().with_slow_threshold_ms(1).build());
    let mut scope = RequestScope::new(create_test_request());

    let _: Result<(), MockError> = chain
        .proceed(
            &create_controller_join_point("latency_report"),
            &mut scope,
            |_| async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(())
            },
        )
        .await;

    let slow = logs.find("SLOW METHOD DETECTED").unwrap();
    assert_eq!(slow.level, Level::WARN);
    assert_eq!(slow.target, PERFORMANCE_TARGET);

    let payload = slow.json_payload().unwrap();
    assert_eq!(payload["slow"], true);
    assert!(payload["executionTimeMs"].as_u64().unwrap() >= 20);
}

#[tokio::test]
async fn test_failed_call_logs_error_context_and_trace() {
    let (logs, _guard) = capture_logs();
    let chain = advanced_chain();
    let mut scope = RequestScope::new(create_test_request());

    let result: Result<(), MockError> = chain
        .proceed(
            &create_controller_join_point("create_order"),
            &mut scope,
            |_| async { Err(MockError::checkout("disk full")) },
        )
        .await;

    assert!(matches!(result, Err(MockError::Checkout { .. })));
    assert!(scope.correlation().is_empty());

    let request_id = logs
        .find("Starting: OrderController.create_order()")
        .and_then(|event| event.field("request_id").map(str::to_string))
        .unwrap();

    let failed = logs
        .find("Failed: OrderController.create_order() after")
        .unwrap();
    assert_eq!(failed.level, Level::ERROR);
    assert!(failed.message.ends_with("- checkout failed"));

    let context = logs.find("Exception Context").unwrap().json_payload().unwrap();
    assert_eq!(context["requestId"], request_id.as_str());
    assert_eq!(context["method"], "OrderController.create_order");
    assert_eq!(context["exceptionType"], "aop_logging_testing::mocks::MockError");
    assert_eq!(context["userId"], "u42");
    assert_eq!(context["clientIp"], "203.0.113.7");

    let trace = logs.find("Stack trace:").unwrap();
    assert!(trace.message.contains("checkout failed"));
    assert!(trace.message.contains("caused by: disk full"));

    let performance = logs.events_for_target(PERFORMANCE_TARGET);
    assert_eq!(performance.len(), 1);
    assert_eq!(performance[0].json_payload().unwrap()["success"], false);
}

#[tokio::test]
async fn test_exception_context_logged_before_failure_line() {
    let (logs, _guard) = capture_logs();
    let mut scope = RequestScope::new(create_test_request());

    let _: Result<(), MockError> = advanced_chain()
        .proceed(
            &create_controller_join_point("get_order"),
            &mut scope,
            |_| async { Err(MockError::NotFound(7)) },
        )
        .await;

    let messages = logs.messages();
    let context = messages
        .iter()
        .position(|m| m.starts_with("Exception Context"))
        .unwrap();
    let failed = messages.iter().position(|m| m.contains("Failed:")).unwrap();
    assert!(context < failed);
}

#[tokio::test]
async fn test_invalid_user_header_warns_and_call_proceeds() {
    let (logs, _guard) = capture_logs();
    let request = RequestMetadataBuilder::get("/orders")
        .with_raw_header("x-user-id", b"\xfeuser")
        .with_remote_addr("127.0.0.1:4000")
        .build();
    let mut scope = RequestScope::new(request);

    let result: Result<u32, MockError> = advanced_chain()
        .proceed(
            &create_controller_join_point("list_orders"),
            &mut scope,
            |context| async move {
                assert!(context.request_id().is_some());
                assert_eq!(context.session_id(), Some("no-session"));
                assert_eq!(context.user_id(), None);
                Ok(3)
            },
        )
        .await;

    assert_eq!(result.unwrap(), 3);
    let warning = logs.find("Failed to setup full correlation context").unwrap();
    assert_eq!(warning.level, Level::WARN);
    assert!(logs.contains_message("Completed: OrderController.list_orders()"));
}

#[tokio::test]
async fn test_request_details_only_when_enabled() {
    let (logs, _guard) = capture_logs();
    let join_point = create_controller_join_point("get_order").arg::<u64>();

    let mut scope = RequestScope::new(create_test_request());
    let _: Result<(), MockError> = advanced_chain()
        .proceed(&join_point, &mut scope, |_| async { Ok(()) })
        .await;
    assert!(!logs.contains_message("Request Details"));

    let chain = InterceptorChain::from_config(
        &AppConfigBuilder::new().with_request_logging(true, true).build(),
    );
    let mut scope = RequestScope::new(create_test_request());
    let _: Result<(), MockError> = chain
        .proceed(&join_point, &mut scope, |_| async { Ok(()) })
        .await;

    let details = logs.find("Request Details").unwrap();
    assert_eq!(details.level, Level::DEBUG);
    let payload = details.json_payload().unwrap();
    assert_eq!(payload["method"], "GET");
    assert_eq!(payload["uri"], "/orders/7");
    assert_eq!(payload["queryString"], "verbose=true");
    assert_eq!(payload["headers"]["accept"], "application/json");
    assert_eq!(payload["arguments"], "[u64]");
}

#[tokio::test]
async fn test_unreadable_header_skips_request_details_and_call_proceeds() {
    let (logs, _guard) = capture_logs();
    let chain = InterceptorChain::from_config(
        &AppConfigBuilder::new().with_request_logging(true, false).build(),
    );
    let request = RequestMetadataBuilder::get("/orders/7")
        .with_user("u42")
        .with_raw_header("x-note", b"caf\xc3\xa9")
        .with_remote_addr("127.0.0.1:4000")
        .build();
    let mut scope = RequestScope::new(request);

    let result: Result<&str, MockError> = chain
        .proceed(
            &create_controller_join_point("get_order"),
            &mut scope,
            |context| async move {
                assert_eq!(context.user_id(), Some("u42"));
                Ok("order-7")
            },
        )
        .await;

    assert_eq!(result.unwrap(), "order-7");
    let warning = logs.find("Failed to log request details").unwrap();
    assert_eq!(warning.level, Level::WARN);
    assert!(warning.message.contains("x-note"));
    assert!(!logs.contains_message("Request Details"));
    assert!(logs.contains_message("Starting: OrderController.get_order()"));
    assert!(logs.contains_message("Completed: OrderController.get_order() in"));
    assert!(scope.correlation().is_empty());
}

#[tokio::test]
async fn test_events_inside_call_carry_correlation_fields() {
    let (logs, _guard) = capture_logs();
    let mut scope = RequestScope::new(create_test_request());

    let request_id: Result<String, MockError> = advanced_chain()
        .proceed(
            &create_controller_join_point("get_order"),
            &mut scope,
            |context| async move {
                tracing::info!("loading order");
                Ok(context.request_id().unwrap_or_default().to_string())
            },
        )
        .await;

    let event = logs.find("loading order").unwrap();
    assert_eq!(event.span_field("request_id"), Some(request_id.unwrap().as_str()));
    assert_eq!(event.span_field("user_id"), Some("u42"));
    assert_eq!(event.span_field("session_id"), Some("s-123"));
    assert_eq!(event.span_field("client_ip"), Some("203.0.113.7"));
}

#[tokio::test]
async fn test_concurrent_requests_have_isolated_contexts() {
    let chain = advanced_chain();
    let join_point = create_controller_join_point("get_order");
    let mut first_scope = RequestScope::new(create_test_request());
    let mut second_scope = RequestScope::new(create_anonymous_request());

    let (first, second) = tokio::join!(
        chain.proceed(&join_point, &mut first_scope, |context| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, MockError>(context)
        }),
        chain.proceed(&join_point, &mut second_scope, |context| async move {
            Ok::<_, MockError>(context)
        }),
    );

    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first.request_id(), second.request_id());
    assert_eq!(first.user_id(), Some("u42"));
    assert_eq!(second.user_id(), Some("anonymous"));
    assert_eq!(second.client_ip(), Some("198.51.100.4"));
    assert!(first_scope.correlation().is_empty());
    assert!(second_scope.correlation().is_empty());
}

#[tokio::test]
async fn test_basic_mode_logs_entry_and_exit_only() {
    let (logs, _guard) = capture_logs();
    let chain = InterceptorChain::from_config(&AppConfigBuilder::new().basic().build());
    let mut scope = RequestScope::new(create_test_request());

    let _: Result<(), MockError> = chain
        .proceed(&create_controller_join_point("list_orders"), &mut scope, |context| async move {
            assert!(context.is_empty());
            Ok(())
        })
        .await;

    assert!(logs.contains_message("→ Entering: OrderController.list_orders()"));
    assert!(logs.contains_message("← Exiting: OrderController.list_orders()"));
    assert!(logs.events_for_target(PERFORMANCE_TARGET).is_empty());

    let _: Result<(), MockError> = chain
        .proceed(&create_controller_join_point("get_order"), &mut scope, |_| async {
            Err(MockError::NotFound(7))
        })
        .await;

    assert!(logs.contains_message("✗ Exception in: OrderController.get_order() - order 7 not found"));
    assert!(logs.contains_message(
        "Exception thrown in OrderController.get_order(): MockError - order 7 not found"
    ));
}

#[tokio::test]
async fn test_service_layer_hook() {
    let (logs, _guard) = capture_logs();
    let chain = InterceptorChain::from_config(&AppConfigBuilder::new().with_service_layer().build());
    let mut scope = RequestScope::detached();

    let _: Result<(), MockError> = chain
        .proceed(&create_service_join_point("find_order"), &mut scope, |_| async {
            Err(MockError::NotFound(9))
        })
        .await;

    assert_eq!(
        logs.find("Service → OrderService.find_order()").unwrap().level,
        Level::DEBUG
    );
    let failed = logs.find("Service ✗ OrderService.find_order() failed after").unwrap();
    assert_eq!(failed.level, Level::ERROR);
    assert!(!logs.contains_message("Starting:"));
}

#[tokio::test]
async fn test_controller_hooks_skip_service_calls() {
    let controller_hook = RecordingHook::controllers("controller");
    let service_hook = RecordingHook::new("service", aop_logging_interceptor::Pointcut::SERVICES)
        .sharing(&controller_hook);
    let chain = InterceptorChain::new()
        .with_hook(FixedRequestIdHook("abc12345"))
        .with_hook(controller_hook.clone())
        .with_hook(service_hook);
    let mut scope = RequestScope::detached();

    let context = chain
        .proceed(
            &JoinPoint::service("shop::OrderService", "count"),
            &mut scope,
            |context| async move { Ok::<_, MockError>(context) },
        )
        .await
        .unwrap();

    assert!(context.request_id().is_none());
    assert_eq!(
        controller_hook.get_calls(),
        [
            "service:before:OrderService.count",
            "service:after_returning:OrderService.count"
        ]
    );
}
