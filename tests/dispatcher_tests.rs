//! End-to-end dispatch tests: route table → context → parameter binding →
//! handler → response.
//!
//! # Key Test Cases
//!
//! - routed verbs always reach their handler; unknown paths are 404 and
//!   unbound verbs 405
//! - malformed JSON bodies short-circuit non-`GET` targets with 400
//! - handler errors and panics go through the error hook, else 500
//! - base path and extra verbs from configuration

mod common;

use apidispatch::dispatcher::Dispatcher;
use apidispatch::endpoint::{Capabilities, Endpoint, Gettable, HandlerResult};
use apidispatch::error::{DispatchError, HandlerFailure};
use apidispatch::params::{Args, ParamSpec};
use apidispatch::request::Request;
use apidispatch::response::{BufferedTransport, Response, Status};
use apidispatch::DispatchConfig;
use common::endpoints::{FaultyEndpoint, Forbidden, UserCollection, UserEndpoint};
use common::log_capture;
use http::Method;
use serde_json::json;
use std::sync::Arc;

fn dispatcher() -> (Dispatcher, Arc<UserEndpoint>, Arc<UserCollection>) {
    let users = Arc::new(UserEndpoint::default());
    let collection = Arc::new(UserCollection::default());
    let mut d = Dispatcher::new();
    d.register_endpoint(Arc::clone(&users)).unwrap();
    d.register_endpoint(Arc::clone(&collection)).unwrap();
    d.register_endpoint(Arc::new(FaultyEndpoint)).unwrap();
    (d, users, collection)
}

fn realize(resp: Response) -> BufferedTransport {
    let mut t = BufferedTransport::new();
    resp.realize(&mut t).unwrap();
    t
}

#[test]
fn test_registered_verbs_reach_handler() {
    let (d, users, _) = dispatcher();
    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let req = Request::builder().method(method.clone()).uri("/users/5").build();
        let status = d.dispatch(&req).status();
        assert!(
            status != Status::NotFound && status != Status::MethodNotAllowed,
            "{method} answered {status}"
        );
    }
    assert_eq!(users.calls(), 3);
}

#[test]
fn test_unknown_path_is_404_and_unbound_verb_is_405() {
    let (d, users, _) = dispatcher();

    let resp = d.dispatch(&Request::builder().uri("/accounts/5").build());
    assert_eq!(resp.status(), Status::NotFound);
    let t = realize(resp);
    assert_eq!(t.status(), Some(Status::NotFound));
    assert!(t.body().is_empty());

    let req = Request::builder().method(Method::POST).uri("/users/5").build();
    assert_eq!(d.dispatch(&req).status(), Status::MethodNotAllowed);

    let req = Request::builder().method(Method::DELETE).uri("/users").build();
    assert_eq!(d.dispatch(&req).status(), Status::MethodNotAllowed);

    assert_eq!(users.calls(), 0);
}

#[test]
fn test_parameter_sources_and_precedence() {
    let (d, _, _) = dispatcher();

    // capture beats body and query
    let req = Request::builder()
        .method(Method::PUT)
        .uri("/users/5?user_id=7&displayName=query")
        .json(&json!({ "userid": 6, "display_name": "body" }))
        .build();
    let resp = d.dispatch(&req);
    assert_eq!(
        resp.json_data(),
        Some(&json!({ "user_id": 5, "display_name": "body" }))
    );

    // body beats query
    let req = Request::builder()
        .method(Method::POST)
        .uri("/users?displayName=query")
        .json(&json!({ "displayname": "body" }))
        .build();
    let resp = d.dispatch(&req);
    assert_eq!(resp.status(), Status::Created);
    assert_eq!(resp.json_data(), Some(&json!({ "display_name": "body" })));

    // query alone, under the camelCase name
    let req = Request::builder().uri("/users?pageSize=50").build();
    assert_eq!(
        d.dispatch(&req).json_data(),
        Some(&json!({ "page": 1, "page_size": 50 }))
    );
}

#[test]
fn test_defaults_and_failed_coercion() {
    let (d, _, _) = dispatcher();
    let req = Request::builder().uri("/users/abc").build();
    assert_eq!(
        d.dispatch(&req).json_data(),
        Some(&json!({ "user_id": 0, "display_name": "anonymous" }))
    );

    let req = Request::builder().uri("/users/42").build();
    assert_eq!(
        d.dispatch(&req).json_data(),
        Some(&json!({ "user_id": 42, "display_name": "anonymous" }))
    );
}

#[test]
fn test_form_body_variables() {
    let (d, _, _) = dispatcher();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/users?display_name=query")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("display_name=Ada+Lovelace")
        .build();
    assert_eq!(
        d.dispatch(&req).json_data(),
        Some(&json!({ "display_name": "Ada Lovelace" }))
    );
}

#[test]
fn test_malformed_json_short_circuits() {
    let (d, _, collection) = dispatcher();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header("Content-Type", "application/json")
        .body("not valid json")
        .build();

    assert!(matches!(
        d.try_dispatch(&req),
        Err(DispatchError::MalformedRequestBody)
    ));

    let t = realize(d.dispatch(&req));
    assert_eq!(t.status(), Some(Status::BadRequest));
    assert_eq!(t.body_json(), Some(json!({ "error": "malformed_json" })));
    assert_eq!(collection.created.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn test_json_null_and_non_object_bodies_are_malformed() {
    let (d, users, _) = dispatcher();
    for body in ["null", "[1, 2]", "\"text\"", "12", ""] {
        let req = Request::builder()
            .method(Method::PUT)
            .uri("/users/1")
            .header("Content-Type", "application/json; charset=utf-8")
            .body(body)
            .build();
        assert!(req.context().has_malformed_json(), "body {body:?}");
        assert_eq!(d.dispatch(&req).status(), Status::BadRequest);
    }
    assert_eq!(users.calls(), 0);
}

#[test]
fn test_malformed_json_is_ignored_for_get_and_other_types() {
    let (d, users, _) = dispatcher();
    let req = Request::builder()
        .uri("/users/1")
        .header("Content-Type", "application/json")
        .body("{oops")
        .build();
    assert_eq!(d.dispatch(&req).status(), Status::Ok);

    let req = Request::builder()
        .method(Method::PUT)
        .uri("/users/1")
        .header("Content-Type", "text/plain")
        .body("{oops")
        .build();
    assert!(!req.context().has_malformed_json());
    assert_eq!(d.dispatch(&req).status(), Status::Ok);
    assert_eq!(users.calls(), 2);
}

#[test]
fn test_handler_error_without_hook_is_500() {
    let (d, _, _) = dispatcher();
    let t = realize(d.dispatch(&Request::builder().uri("/faulty/error").build()));
    assert_eq!(t.status(), Some(Status::InternalServerError));
    assert_eq!(t.body_json(), Some(json!({ "error": "unhandled_exception" })));
}

#[test]
fn test_handler_panic_is_500() {
    let (d, _, _) = dispatcher();
    let req = Request::builder().uri("/faulty/panic").build();
    match d.try_dispatch(&req) {
        Err(DispatchError::HandlerFailure(HandlerFailure::Panic(msg))) => {
            assert_eq!(msg, "handler exploded");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    let t = realize(d.dispatch(&req));
    assert_eq!(t.status(), Some(Status::InternalServerError));
    assert_eq!(t.body_json(), Some(json!({ "error": "unhandled_exception" })));
}

#[test]
fn test_error_hook_response_used_verbatim() {
    let (d, _, _) = dispatcher();
    let d = d.with_error_handler(|failure| {
        failure.downcast_ref::<Forbidden>().map(|f| {
            Response::json_error(Status::Forbidden, "forbidden", Some(f.0.as_str()))
                .with_header("X-Reason", "policy")
        })
    });

    let t = realize(d.dispatch(&Request::builder().uri("/faulty/forbidden").build()));
    assert_eq!(t.status(), Some(Status::Forbidden));
    assert_eq!(t.header("X-Reason"), Some("policy"));
    assert_eq!(
        t.body_json(),
        Some(json!({ "error": "forbidden", "errorDetails": "admin only" }))
    );

    // hook declines: generic 500
    let resp = d.dispatch(&Request::builder().uri("/faulty/error").build());
    assert_eq!(resp.status(), Status::InternalServerError);
}

#[test]
fn test_error_hook_sees_panics() {
    let (mut d, _, _) = dispatcher();
    d.set_error_handler(|failure| match failure {
        HandlerFailure::Panic(_) => Some(Response::new(Status::NotImplemented)),
        HandlerFailure::Error(_) => None,
    });
    let resp = d.dispatch(&Request::builder().uri("/faulty/panic").build());
    assert_eq!(resp.status(), Status::NotImplemented);
}

#[test]
fn test_error_hook_not_used_for_routing_errors() {
    let (d, _, _) = dispatcher();
    let d = d.with_error_handler(|_| Some(Response::new(Status::Forbidden)));
    assert_eq!(
        d.dispatch(&Request::builder().uri("/missing").build()).status(),
        Status::NotFound
    );
}

struct Patchable;

impl Gettable for Patchable {
    fn get(&self, _args: Args) -> HandlerResult {
        Ok(Response::new(Status::Ok))
    }
}

impl Endpoint for Patchable {
    fn route_pattern(&self) -> &str {
        "/things/{thing_id:\\d+}"
    }

    fn capabilities(self: Arc<Self>) -> Capabilities {
        Capabilities::for_endpoint::<Self>().get(&self).verb(
            Method::PATCH,
            vec![ParamSpec::int("thing_id", 0)],
            |args| {
                Ok(Response::json(
                    Status::Ok,
                    json!({ "patched": args.int("thing_id") }),
                ))
            },
        )
    }
}

#[test]
fn test_extra_verb_requires_configuration() {
    let mut plain = Dispatcher::new();
    plain.register_endpoint(Arc::new(Patchable)).unwrap();
    let req = Request::builder().method(Method::PATCH).uri("/things/3").build();
    assert_eq!(plain.dispatch(&req).status(), Status::MethodNotAllowed);

    let config = DispatchConfig::from_yaml_str("extra_verbs: [PATCH]").unwrap();
    let mut configured = Dispatcher::from_config(&config).unwrap();
    assert!(configured.verbs().contains(&Method::PATCH));
    configured.register_endpoint(Arc::new(Patchable)).unwrap();
    assert_eq!(
        configured.dispatch(&req).json_data(),
        Some(&json!({ "patched": 3 }))
    );
}

#[test]
fn test_base_path_from_config() {
    let config = DispatchConfig {
        base_path: "/api".to_string(),
        ..DispatchConfig::default()
    };
    let mut d = Dispatcher::from_config(&config).unwrap();
    d.register_endpoint(Arc::new(UserEndpoint::default())).unwrap();

    assert_eq!(
        d.dispatch(&Request::builder().uri("/api/users/7").build()).status(),
        Status::Ok
    );
    assert_eq!(
        d.dispatch(&Request::builder().uri("/users/7").build()).status(),
        Status::NotFound
    );
}

#[test]
fn test_constraint_mismatch_is_404() {
    let mut d = Dispatcher::new();
    d.register_endpoint(Arc::new(Patchable)).unwrap();
    assert_eq!(
        d.dispatch(&Request::builder().uri("/things/abc").build()).status(),
        Status::NotFound
    );
}

#[test]
fn test_invalid_pattern_rejected_at_registration() {
    struct Broken;
    impl Gettable for Broken {
        fn get(&self, _args: Args) -> HandlerResult {
            Ok(Response::new(Status::Ok))
        }
    }
    impl Endpoint for Broken {
        fn route_pattern(&self) -> &str {
            "/broken/{id:(}"
        }
        fn capabilities(self: Arc<Self>) -> Capabilities {
            Capabilities::for_endpoint::<Self>().get(&self)
        }
    }

    let mut d = Dispatcher::new();
    assert!(d.register_endpoint(Arc::new(Broken)).is_err());
    assert!(d.routes().is_empty());
}

#[test]
fn test_serve_writes_to_transport() {
    let (d, _, _) = dispatcher();
    let mut t = BufferedTransport::new();
    d.serve(&Request::builder().uri("/users/9").build(), &mut t)
        .unwrap();
    assert_eq!(t.status(), Some(Status::Ok));
    assert_eq!(t.header("content-type"), Some("application/json"));
    assert_eq!(
        t.body_json(),
        Some(json!({ "user_id": 9, "display_name": "anonymous" }))
    );
}

#[test]
fn test_dispatcher_shared_across_threads() {
    let (d, users, _) = dispatcher();
    let d = Arc::new(d);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let d = Arc::clone(&d);
            std::thread::spawn(move || {
                let req = Request::builder().uri(&format!("/users/{i}")).build();
                d.dispatch(&req).json_data().cloned()
            })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        let data = h.join().unwrap().unwrap();
        assert_eq!(data["user_id"], json!(i));
    }
    assert_eq!(users.calls(), 4);
}

#[test]
fn test_dispatch_logs_carry_request_id() {
    let (d, _, _) = dispatcher();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header("Content-Type", "application/json")
        .body("nope")
        .build();
    let id = req.request_id().to_string();
    let (resp, logs) = log_capture::capture(|| d.dispatch(&req));
    assert_eq!(resp.status(), Status::BadRequest);
    assert!(logs.contains("Malformed JSON body"), "{logs}");
    assert!(logs.contains(&id), "{logs}");
}

struct CurrentUser;

impl Gettable for CurrentUser {
    fn get(&self, _args: Args) -> HandlerResult {
        Ok(Response::json(Status::Ok, json!({ "me": true })))
    }
}

impl Endpoint for CurrentUser {
    fn route_pattern(&self) -> &str {
        "/users/me"
    }

    fn capabilities(self: Arc<Self>) -> Capabilities {
        Capabilities::for_endpoint::<Self>().get(&self)
    }
}

#[test]
fn test_unsupported_verb_on_earlier_endpoint_is_405_not_fallthrough() {
    let users = Arc::new(UserEndpoint::default());
    let mut d = Dispatcher::new();
    d.register_endpoint(Arc::new(CurrentUser)).unwrap();
    d.register_endpoint(Arc::clone(&users)).unwrap();

    let req = Request::builder()
        .method(Method::PUT)
        .uri("/users/me")
        .json(&json!({ "displayName": "x" }))
        .build();
    assert_eq!(d.dispatch(&req).status(), Status::MethodNotAllowed);

    let req = Request::builder().uri("/users/me").build();
    let t = realize(d.dispatch(&req));
    assert_eq!(t.body_json(), Some(json!({ "me": true })));

    let req = Request::builder().method(Method::PUT).uri("/users/5").build();
    assert_ne!(d.dispatch(&req).status(), Status::MethodNotAllowed);
    assert_eq!(users.calls(), 1);
}
