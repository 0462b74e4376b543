//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences. Operations that succeed
//! without a payload are recorded as `true`.

use rt_core::{
    ApiError, Auth, Comment, CreateTicket, Fields, HttpBody, HttpMethod, HttpRequest, HttpResponse, ResourceId,
    RtClient, UpdateTicket,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> RtClient {
    RtClient::new(BASE_URL, Auth::token("vector-token"))
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn id(case: &Value) -> ResourceId {
    match &case["input_id"] {
        Value::Number(n) => ResourceId::from(n.as_u64().unwrap()),
        Value::String(s) => ResourceId::from(s.as_str()),
        other => panic!("bad input_id: {other}"),
    }
}

fn fields(value: &Value) -> Fields {
    value.as_object().cloned().map(Fields::from).unwrap_or_default()
}

fn text<'a>(case: &'a Value, key: &str) -> &'a str {
    case[key].as_str().unwrap_or_else(|| panic!("missing {key}"))
}

fn build(c: &RtClient, case: &Value) -> HttpRequest {
    let input = fields(&case["input"]);
    let custom = fields(&case["input_custom_fields"]);
    match text(case, "operation") {
        "get_queues" => c.build_get_queues(),
        "get_queue" => c.build_get_queue(&id(case)),
        "create_queue" => c.build_create_queue(text(case, "input_name"), &input).unwrap(),
        "update_queue" => c.build_update_queue(&id(case), &input).unwrap(),
        "disable_queue" => c.build_disable_queue(&id(case)),
        "get_ticket" => c.build_get_ticket(&id(case)),
        "get_ticket_history" => c.build_get_ticket_history(&id(case)),
        "create_ticket" => {
            let input = CreateTicket {
                subject: text(case, "input_subject").to_string(),
                queue: text(case, "input_queue").to_string(),
                fields: input,
                custom_fields: custom,
            };
            c.build_create_ticket(&input).unwrap()
        }
        "update_ticket" => {
            let input = UpdateTicket {
                fields: input,
                custom_fields: custom,
            };
            c.build_update_ticket(&id(case), &input).unwrap()
        }
        "post_comment" => {
            let comment = Comment {
                content: text(case, "input_content").to_string(),
                content_type: text(case, "input_content_type").to_string(),
                fields: input,
                custom_fields: custom,
            };
            c.build_post_comment(&id(case), &comment).unwrap()
        }
        "delete_ticket" => c.build_delete_ticket(&id(case)),
        "raw_search" => c.build_raw_search(text(case, "input_query")),
        "get_asset" => c.build_get_asset(&id(case)),
        "create_asset" => c.build_create_asset(text(case, "input_name"), &input).unwrap(),
        "update_asset" => c.build_update_asset(&id(case), &input).unwrap(),
        "delete_asset" => c.build_delete_asset(&id(case)),
        "get_user" => c.build_get_user(&id(case)),
        "get_user_history" => c.build_get_user_history(&id(case)),
        "create_user" => c.build_create_user(text(case, "input_name"), &input).unwrap(),
        "update_user" => c.build_update_user(&id(case), &input).unwrap(),
        "disable_user" => c.build_disable_user(&id(case)),
        other => panic!("unknown operation: {other}"),
    }
}

fn parse(c: &RtClient, operation: &str, response: HttpResponse) -> Result<Value, ApiError> {
    let done = |r: Result<(), ApiError>| r.map(|()| Value::Bool(true));
    match operation {
        "get_queues" => c.parse_get_queues(response),
        "get_queue" => c.parse_get_queue(response),
        "create_queue" => done(c.parse_create_queue(response)),
        "update_queue" => done(c.parse_update_queue(response)),
        "disable_queue" => done(c.parse_disable_queue(response)),
        "get_ticket" => c.parse_get_ticket(response),
        "get_ticket_history" => c.parse_get_ticket_history(response),
        "create_ticket" => c.parse_create_ticket(response).map(Value::String),
        "update_ticket" => done(c.parse_update_ticket(response)),
        "post_comment" => done(c.parse_post_comment(response)),
        "delete_ticket" => done(c.parse_delete_ticket(response)),
        "raw_search" => c.parse_raw_search(response),
        "get_asset" => c.parse_get_asset(response),
        "create_asset" => done(c.parse_create_asset(response)),
        "update_asset" => done(c.parse_update_asset(response)),
        "delete_asset" => done(c.parse_delete_asset(response)),
        "get_user" => c.parse_get_user(response),
        "get_user_history" => c.parse_get_user_history(response),
        "create_user" => done(c.parse_create_user(response)),
        "update_user" => done(c.parse_update_user(response)),
        "disable_user" => done(c.parse_disable_user(response)),
        other => panic!("unknown operation: {other}"),
    }
}

fn run_vectors(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = text(case, "name");
        let expected_req = &case["expected_request"];

        // Verify build
        let req = build(&c, case);
        assert_eq!(req.method, parse_method(text(expected_req, "method")), "{name}: method");
        assert_eq!(req.path, format!("{BASE_URL}{}", text(expected_req, "path")), "{name}: path");
        assert_eq!(req.header("Authorization"), Some("token vector-token"), "{name}: auth");

        let expected_query: Vec<(String, String)> = expected_req["query"]
            .as_array()
            .map(|pairs| {
                pairs
                    .iter()
                    .map(|p| (p[0].as_str().unwrap().to_string(), p[1].as_str().unwrap().to_string()))
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(req.query, expected_query, "{name}: query");

        match (&req.body, expected_req.get("body")) {
            (Some(HttpBody::Json(body)), Some(expected)) => {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(&body, expected, "{name}: body");
            }
            (None, None) => {}
            (body, expected) => panic!("{name}: body mismatch: {body:?} vs {expected:?}"),
        }

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse::new(sim["status"].as_u64().unwrap() as u16, text(sim, "body"));
        let result = parse(&c, text(case, "operation"), response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "NotFound" => assert!(matches!(err, ApiError::NotFound { .. }), "{name}: expected NotFound"),
                "UnexpectedStatus" => assert!(
                    matches!(err, ApiError::UnexpectedStatus { .. }),
                    "{name}: expected UnexpectedStatus, got {err:?}"
                ),
                "MissingField" => assert!(matches!(err, ApiError::MissingField(_)), "{name}: expected MissingField"),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let value = result.unwrap_or_else(|e| panic!("{name}: {e}"));
            assert_eq!(value, case["expected_result"], "{name}: parsed result");
        }
    }
}

#[test]
fn queue_test_vectors() {
    run_vectors(include_str!("../../test-vectors/queue.json"));
}

#[test]
fn ticket_test_vectors() {
    run_vectors(include_str!("../../test-vectors/ticket.json"));
}

#[test]
fn asset_test_vectors() {
    run_vectors(include_str!("../../test-vectors/asset.json"));
}

#[test]
fn user_test_vectors() {
    run_vectors(include_str!("../../test-vectors/user.json"));
}
