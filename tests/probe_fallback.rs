// tests/probe_fallback.rs
use std::time::Duration;

use hot_list_relay::ingest::fallback::DEGRADED_SOURCE_NAME;
use hot_list_relay::ingest::{Popularity, ProbeSettings, SourceDescriptor, SourceProber};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fixture(name: &str) -> Value {
    let p = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    serde_json::from_str(&std::fs::read_to_string(p).unwrap()).unwrap()
}

async fn mount(server: &MockServer, route: &str, rsp: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(rsp)
        .mount(server)
        .await;
}

fn prober(server: &MockServer, routes: &[(&str, &str)], limit: usize) -> SourceProber {
    let sources = routes
        .iter()
        .map(|(route, name)| SourceDescriptor::new(format!("{}{route}", server.uri()), "hot_search", *name))
        .collect();
    SourceProber::new(ProbeSettings::new(sources, limit, Duration::from_secs(2))).unwrap()
}

#[tokio::test]
async fn first_healthy_source_wins_after_failures() {
    let server = MockServer::start().await;
    mount(&server, "/broken", ResponseTemplate::new(500)).await;
    mount(&server, "/garbage", ResponseTemplate::new(200).set_body_string("<html>nope</html>")).await;
    mount(&server, "/odd", ResponseTemplate::new(200).set_body_json(json!({"foo": {"bar": 1}}))).await;
    mount(
        &server,
        "/good",
        ResponseTemplate::new(200).set_body_json(fixture("word_list_status.json")),
    )
    .await;
    // must never be contacted
    Mock::given(method("GET"))
        .and(path("/spare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("extra_list.json")))
        .expect(0)
        .mount(&server)
        .await;

    let p = prober(
        &server,
        &[
            ("/broken", "坏源"),
            ("/garbage", "乱码源"),
            ("/odd", "怪源"),
            ("/good", "综合热搜榜"),
            ("/spare", "备用"),
        ],
        3,
    );
    let out = p.probe().await;

    assert!(!out.degraded);
    assert_eq!(out.source_name, "综合热搜榜");
    let ranks: Vec<u32> = out.records.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    assert_eq!(out.records[0].display_text, "春节档票房破纪录");
    assert_eq!(out.records[0].label, "热");
    assert_eq!(out.records[0].event_time, "1700000000");
    assert_eq!(out.records[1].display_text, "新款手机发布");
    assert_eq!(out.records[1].popularity, Popularity::Int(98765));
    // zero hot_level falls through to search_count; `tag` fills the label
    assert_eq!(out.records[2].popularity, Popularity::Int(5000));
    assert_eq!(out.records[2].label, "荐");
}

#[tokio::test]
async fn extra_list_shape_is_understood() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/music",
        ResponseTemplate::new(200).set_body_json(fixture("extra_list.json")),
    )
    .await;

    let out = prober(&server, &[("/music", "")], 10).probe().await;
    assert!(!out.degraded);
    // blank display name → URL keyword heuristic
    assert_eq!(out.source_name, "音乐榜");
    assert_eq!(out.records.len(), 2);
    assert_eq!(out.records[0].display_text, "晴天");
    assert_eq!(out.records[1].display_text, "周末音乐节");
}

#[tokio::test]
async fn empty_list_counts_as_failure() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/empty",
        ResponseTemplate::new(200).set_body_json(json!({"data": {"word_list": []}})),
    )
    .await;
    mount(
        &server,
        "/ok",
        ResponseTemplate::new(200).set_body_json(json!([{"word": "唯一"}])),
    )
    .await;

    let out = prober(&server, &[("/empty", "空"), ("/ok", "顶层列表")], 5).probe().await;
    assert_eq!(out.source_name, "顶层列表");
    assert_eq!(out.records.len(), 1);
}

#[tokio::test]
async fn total_failure_degrades_deterministically() {
    let server = MockServer::start().await;
    mount(&server, "/a", ResponseTemplate::new(503)).await;
    mount(&server, "/b", ResponseTemplate::new(404)).await;

    let p = prober(&server, &[("/a", "A"), ("/b", "B")], 5);
    let first = p.probe().await;
    let second = p.probe().await;

    assert!(first.degraded);
    assert_eq!(first.source_name, DEGRADED_SOURCE_NAME);
    assert_eq!(first.records.len(), 5);
    assert_eq!(first.records[0].label, "热");
    assert_eq!(first, second);
}

#[tokio::test]
async fn no_sources_means_degraded() {
    let p = SourceProber::new(ProbeSettings::new(Vec::new(), 30, Duration::from_secs(1))).unwrap();
    let out = p.probe().await;
    assert!(out.degraded);
    // synthetic set has twenty entries
    assert_eq!(out.records.len(), 20);
}

#[tokio::test]
async fn exhausted_budget_skips_remaining_sources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/never"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"word": "x"}])))
        .expect(0)
        .mount(&server)
        .await;

    let settings = ProbeSettings::new(
        vec![SourceDescriptor::new(format!("{}/never", server.uri()), "hot_search", "N")],
        10,
        Duration::from_secs(2),
    )
    .with_total_budget(Duration::ZERO);
    let out = SourceProber::new(settings).unwrap().probe().await;
    assert!(out.degraded);
}

#[tokio::test]
async fn configured_name_survives_url_normalisation() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/board",
        ResponseTemplate::new(200).set_body_json(json!({"data": [{"word": "榜首"}]})),
    )
    .await;

    // upper-case host and raw non-ASCII query are rewritten by the client
    let url = format!("http://LOCALHOST:{}/board?type=热搜", server.address().port());
    let settings = ProbeSettings::new(
        vec![SourceDescriptor::new(url, "hot_search", "综合榜")],
        5,
        Duration::from_secs(2),
    );
    let out = SourceProber::new(settings).unwrap().probe().await;

    assert!(!out.degraded);
    assert_eq!(out.source_name, "综合榜");
    assert_eq!(out.records[0].display_text, "榜首");
}

#[tokio::test]
async fn refused_and_timed_out_sources_are_skipped() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/slow",
        ResponseTemplate::new(200)
            .set_body_json(json!([{"word": "too late"}]))
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    mount(
        &server,
        "/ok",
        ResponseTemplate::new(200).set_body_json(json!({"data": {"word_list": [
            {"word": "一"}, {"word": "二"}, {"word": "三"}, {"word": "四"}
        ]}})),
    )
    .await;

    let settings = ProbeSettings::new(
        vec![
            SourceDescriptor::new("http://127.0.0.1:1/", "hot_search", "dead"),
            SourceDescriptor::new(format!("{}/slow", server.uri()), "hot_search", "slow"),
            SourceDescriptor::new(format!("{}/ok", server.uri()), "hot_search", "ok"),
        ],
        3,
        Duration::from_millis(300),
    );
    let out = SourceProber::new(settings).unwrap().probe().await;

    assert!(!out.degraded);
    assert_eq!(out.source_name, "ok");
    let ranks: Vec<u32> = out.records.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    assert_eq!(out.records[2].display_text, "三");
}
