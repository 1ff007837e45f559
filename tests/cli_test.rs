use buildmyrig::core::advisor::{
    MSG_BUILDS_FOUND, MSG_LOAD_MORE_FAILED, MSG_RECOMMEND_FAILED, MSG_UNEXPECTED,
};
use httpmock::prelude::*;
use std::process::{Command, Output};

fn buildmyrig(server: &MockServer, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_buildmyrig"))
        .arg("--base-url")
        .arg(server.base_url())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run buildmyrig")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn toast(message: &str) -> String {
    format!("❌ {}", message)
}

fn parts_page(range: std::ops::Range<usize>) -> serde_json::Value {
    serde_json::Value::Array(
        range
            .map(|i| {
                serde_json::json!({
                    "id": i,
                    "name": format!("cpu model {}", i),
                    "category": "cpu",
                    "price": 100.0 + i as f64,
                    "brand": "AMD",
                    "performance_score": 90
                })
            })
            .collect(),
    )
}

#[test]
fn test_parts_keeps_loaded_page_when_next_page_is_missing() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/parts/cpu")
            .query_param("limit", "20")
            .query_param("offset", "0");
        then.status(200).json_body(parts_page(0..20));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/parts/cpu")
            .query_param("offset", "20");
        then.status(404)
            .json_body(serde_json::json!({"detail": "No parts found in category 'cpu'"}));
    });

    let output = buildmyrig(&server, &["parts", "cpu", "--pages", "3"]);

    first.assert();
    second.assert();
    let out = stdout(&output);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(out.contains("Showing 20 parts"), "stdout: {}", out);
    assert!(out.contains("cpu model 0"));
    assert!(out.contains("cpu model 19"));
    assert!(out.contains("[Load More Parts]"));
    assert_eq!(err.matches(&toast(MSG_LOAD_MORE_FAILED)).count(), 1, "stderr: {}", err);
    assert!(!err.contains(MSG_UNEXPECTED));
    assert!(err.contains("category, sort order or brand filter"));
}

#[test]
fn test_parts_pages_append_until_short_page() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/parts/cpu")
            .query_param("offset", "0")
            .query_param("sort_by", "price")
            .query_param("sort_order", "asc");
        then.status(200).json_body(parts_page(0..20));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/parts/cpu")
            .query_param("offset", "20")
            .query_param("sort_by", "price")
            .query_param("sort_order", "asc");
        then.status(200).json_body(parts_page(20..25));
    });

    let output = buildmyrig(&server, &["parts", "cpu", "--sort-by", "price", "--pages", "3"]);

    first.assert();
    second.assert();
    let out = stdout(&output);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(out.contains("Showing 25 parts"), "stdout: {}", out);
    assert!(out.contains("cpu model 24"));
    assert!(!out.contains("[Load More Parts]"));
}

#[test]
fn test_recommend_json_prints_builds_array() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/recommend").json_body(serde_json::json!({
            "budget": 1500,
            "use_case": "gaming",
            "brand_preferences": {"cpu": "AMD"}
        }));
        then.status(200).json_body(serde_json::json!({
            "builds": [
                {"parts": [{"category": "cpu", "name": "AMD Ryzen 5 5600X", "price": 199.99}], "total_price": 199.99, "bang_for_buck_score": 0.4},
                {"parts": [{"category": "cpu", "name": "AMD Ryzen 7 5800X", "price": 299.99}], "total_price": 299.99, "bang_for_buck_score": 0.3}
            ],
            "message": "Found 2 optimized build(s) for your gaming setup"
        }));
    });

    let output = buildmyrig(
        &server,
        &["recommend", "--budget", "1500", "--cpu-brand", "AMD", "--json"],
    );

    api_mock.assert();
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let printed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let builds = printed.as_array().unwrap();
    assert_eq!(builds.len(), 2);
    assert_eq!(builds[0]["parts"][0]["name"], "AMD Ryzen 5 5600X");
    assert_eq!(builds[1]["total_price"], 299.99);
    assert!(stderr(&output).contains(&format!("✅ {}", MSG_BUILDS_FOUND)));
}

#[test]
fn test_recommend_server_error_exits_with_retry_code() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/recommend");
        then.status(500).body("Internal Server Error");
    });

    let output = buildmyrig(&server, &["recommend", "--budget", "900"]);

    api_mock.assert();
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).is_empty());
    assert_eq!(err.matches(&toast(MSG_RECOMMEND_FAILED)).count(), 1, "stderr: {}", err);
    assert!(!err.contains(MSG_UNEXPECTED));
    assert!(err.contains("budget, use case or brand preference"));
}

#[test]
fn test_unreported_failure_gets_generic_notification() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/recommend");
        then.status(200).json_body(serde_json::json!({"builds": []}));
    });

    let output = buildmyrig(&server, &["recommend", "--budget", "0"]);

    api_mock.assert_hits(0);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(err.matches(&toast(MSG_UNEXPECTED)).count(), 1, "stderr: {}", err);
}
