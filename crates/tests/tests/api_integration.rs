use axum::body::Body;
use axum::http::{Request, StatusCode};
use hydro_tests::{app, app_with_origins, form_post, json_post, send, send_for_headers};
use serde_json::json;

const RAINFALL: &str = "过去24小时桂林市普降大到暴雨，部分县区局部降大暴雨，最大日雨量165.5毫米。";
const WATER_LEVEL: &str = "漓江桂林水文站水位142.20米，流量154立方米每秒，未超警。";
const FORECAST: &str = "预计未来24小时漓江桂林市城区至阳朔县城河段水位将继续上涨1.5～2米，桂江平乐县城河段上涨约1米，不会超警。";
const FLOOD_RISK: &str =
    "部分中小河流可能出现超警洪水，主要集中在全州、恭城、永福、临桂、阳朔等县区。";
const FALLBACK: &str = "抱歉，我暂时无法回答该问题。请尝试“雨量”、“水位”、“未来趋势”等关键词。";
const PROMPT: &str = "请提供问题文本（字段 q）。";

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(
        app(),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "hydro-briefing");
    assert!(body["metrics"]["requests_total"].is_u64());
}

#[tokio::test]
async fn rainfall_question_gets_rainfall_reply() {
    let (status, body) = send(
        app(),
        json_post("/api/briefing", json!({ "q": "最近雨量怎么样" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "reply": RAINFALL }));
}

#[tokio::test]
async fn station_question_gets_water_level_reply() {
    let (status, body) = send(
        app(),
        json_post("/api/briefing", json!({ "q": "桂林水文站水位多少" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "reply": WATER_LEVEL }));
}

#[tokio::test]
async fn forecast_and_risk_topics_resolve_in_order() {
    let (_, forecast) = send(app(), json_post("/api/briefing", json!({ "q": "未来洪水风险" }))).await;
    assert_eq!(forecast["reply"], FORECAST);

    let (_, risk) = send(app(), json_post("/api/briefing", json!({ "q": "会不会超警" }))).await;
    assert_eq!(risk["reply"], FLOOD_RISK);
}

#[tokio::test]
async fn rainfall_wins_over_water_level() {
    let (_, body) = send(
        app(),
        json_post("/api/briefing", json!({ "q": "水位和雨量" })),
    )
    .await;

    assert_eq!(body["reply"], RAINFALL);
}

#[tokio::test]
async fn empty_or_missing_q_is_not_ok_but_still_200() {
    for payload in [json!({ "q": "" }), json!({ "q": "   " }), json!({}), json!({ "q": null })] {
        let (status, body) = send(app(), json_post("/api/briefing", payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": false, "reply": PROMPT }));
    }
}

#[tokio::test]
async fn bodiless_post_is_treated_as_missing_q() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/briefing")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn empty_json_body_is_treated_as_missing_q() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/briefing")
        .header("content-type", "application/json")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": false, "reply": PROMPT }));
}

#[tokio::test]
async fn falsy_q_is_treated_as_missing() {
    for payload in [json!({ "q": false }), json!({ "q": 0 })] {
        let (status, body) = send(app(), json_post("/api/briefing", payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": false, "reply": PROMPT }));
    }
}

#[tokio::test]
async fn unmatched_question_gets_fallback() {
    let (status, body) = send(
        app(),
        json_post("/api/briefing", json!({ "q": "今天天气怎么样" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "reply": FALLBACK }));
}

#[tokio::test]
async fn numeric_q_is_answered() {
    let (_, body) = send(app(), json_post("/api/briefing", json!({ "q": 42 }))).await;
    assert_eq!(body, json!({ "ok": true, "reply": FALLBACK }));
}

#[tokio::test]
async fn form_encoded_body_is_accepted() {
    let (status, body) = send(
        app(),
        form_post(
            "/api/briefing",
            "q=%E6%A1%82%E6%9E%97%E6%B0%B4%E6%96%87%E7%AB%99%E6%B0%B4%E4%BD%8D%E5%A4%9A%E5%B0%91",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], WATER_LEVEL);

    let (_, empty) = send(app(), form_post("/api/briefing", "q=")).await;
    assert_eq!(empty, json!({ "ok": false, "reply": PROMPT }));
}

#[tokio::test]
async fn malformed_json_is_rejected_by_the_framework() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/briefing")
        .header("content-type", "application/json")
        .body(Body::from("{\"q\": "))
        .unwrap();

    let (status, _) = send(app(), request).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn local_briefing_covers_affected_rivers() {
    let (status, body) = send(
        app(),
        json_post("/api/briefing/local", json!({ "q": "哪些河流涨水了" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "local-keyword");
    assert_eq!(
        body["reply"],
        "恭城河、湘江全州县城河段、永福县大邦河、灌阳县秀江、雁山区良丰河等多条河流出现了1～2.6米的涨水。"
    );
}

#[tokio::test]
async fn local_briefing_rejects_empty_query() {
    let (status, body) = send(app(), json_post("/api/briefing/local", json!({ "q": " " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "empty_query");
    assert_eq!(body["message"], "查询文本不能为空");
}

#[tokio::test]
async fn generate_renders_markdown_from_observations() {
    let (status, body) = send(
        app(),
        json_post(
            "/api/briefing/generate",
            json!({
                "water_stations": [{ "name": "阳朔水文站", "level": 107.5, "status": "超警" }],
                "rainfall": [
                    { "station": "白沙", "rainfall_24h": 120.0 },
                    { "station": "兴坪", "rainfall_24h": "86.5" }
                ],
                "weather_info": "未来两天雨势减弱。"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let markdown = body["markdown"].as_str().unwrap();
    assert!(markdown.starts_with("**阳朔洪水预警简报**"));
    assert!(markdown.contains("- **阳朔水文站** (阳朔县): 水位 107.5 m，状态 超警"));
    assert!(markdown.contains("- **白沙**: 24小时累计降雨 120.0 mm"));
    assert!(markdown.contains("- **兴坪**: 24小时累计降雨 86.5 mm"));
    assert!(markdown.contains("未来两天雨势减弱。"));
    assert!(markdown.contains(body["issued_at"].as_str().unwrap()));
}

#[tokio::test]
async fn unknown_route_lists_endpoints() {
    let (status, body) = send(app(), json_post("/api/unknown", json!({}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["available_endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .any(|endpoint| endpoint == "POST /api/briefing"));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let question = "雨".repeat(40 * 1024);
    let (status, _) = send(app(), json_post("/api/briefing", json!({ "q": question }))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

fn get_health(origin: Option<&str>, request_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/health");
    if let Some(origin) = origin {
        builder = builder.header("origin", origin);
    }
    if let Some(request_id) = request_id {
        builder = builder.header("x-request-id", request_id);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn any_origin_is_allowed_by_default() {
    let (_, headers) = send_for_headers(app(), get_health(Some("http://example.org"), None)).await;

    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers.get("access-control-allow-credentials").is_none());
}

#[tokio::test]
async fn listed_origin_is_echoed_with_credentials() {
    let app = app_with_origins(&["http://localhost:5500"]);
    let (_, headers) =
        send_for_headers(app.clone(), get_health(Some("http://localhost:5500"), None)).await;

    assert_eq!(headers["access-control-allow-origin"], "http://localhost:5500");
    assert_eq!(headers["access-control-allow-credentials"], "true");

    let (_, other) = send_for_headers(app, get_health(Some("http://evil.test"), None)).await;
    assert!(other.get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn request_id_is_generated_and_propagated() {
    let (_, generated) = send_for_headers(app(), get_health(None, None)).await;
    let id = generated["x-request-id"].to_str().unwrap();
    assert!(!id.is_empty());

    let (_, echoed) = send_for_headers(app(), get_health(None, Some("briefing-req-7"))).await;
    assert_eq!(echoed["x-request-id"], "briefing-req-7");
}

#[tokio::test]
async fn security_headers_are_set() {
    let (_, headers) = send_for_headers(app(), get_health(None, None)).await;
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn health_counts_briefing_outcomes() {
    let app = app();
    send(app.clone(), json_post("/api/briefing", json!({ "q": "雨量" }))).await;
    send(app.clone(), json_post("/api/briefing", json!({ "q": "你好" }))).await;
    send(app.clone(), json_post("/api/briefing", json!({}))).await;
    send(app.clone(), json_post("/api/briefing/generate", json!({}))).await;

    let (_, body) = send(app, get_health(None, None)).await;
    let metrics = &body["metrics"];
    assert_eq!(metrics["requests_total"], 4);
    assert_eq!(metrics["matched_total"], 1);
    assert_eq!(metrics["fallback_total"], 1);
    assert_eq!(metrics["empty_query_total"], 1);
    assert_eq!(metrics["generated_total"], 1);
}
