//! Push gateway dispatch tests
//!
//! Verifies what the ledger sends to the gateway and that gateway
//! failures never fail the state transition.

mod helpers;

use helpers::*;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn invite_posts_an_event_invite_to_the_gateway() {
    let gateway = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/send"))
        .and(body_partial_json(serde_json::json!({
            "recipient_id": "ann",
            "kind": "event_invite",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&gateway)
        .await;

    let ctx = test_context(Some(&format!("{}/v1/send", gateway.uri())));

    let event = ctx
        .service
        .create_event(create_request("cleo", upcoming_start(), None))
        .await
        .unwrap();
    ctx.service.invite_user("cleo", event.id, "ann").await.unwrap();
}

#[tokio::test]
async fn join_request_notifies_the_creator() {
    let gateway = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/send"))
        .and(body_partial_json(serde_json::json!({
            "recipient_id": "cleo",
            "kind": "join_request",
            "payload": { "requester_id": "ann" },
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&gateway)
        .await;

    let ctx = test_context(Some(&format!("{}/v1/send", gateway.uri())));

    let event = ctx
        .service
        .create_event(create_request("cleo", upcoming_start(), None))
        .await
        .unwrap();
    ctx.service.request_to_join("ann", event.id).await.unwrap();
}

#[tokio::test]
async fn decision_notifications_reach_the_requester() {
    let gateway = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(4)
        .mount(&gateway)
        .await;

    let ctx = test_context(Some(&format!("{}/v1/send", gateway.uri())));

    let event = ctx
        .service
        .create_event(create_request("cleo", upcoming_start(), None))
        .await
        .unwrap();

    // request + accept, request + reject: four dispatches in total
    ctx.service.request_to_join("ann", event.id).await.unwrap();
    ctx.service.accept_request("cleo", event.id, "ann").await.unwrap();
    ctx.service.request_to_join("ben", event.id).await.unwrap();
    ctx.service.reject_request("cleo", event.id, "ben").await.unwrap();
}

#[tokio::test]
async fn gateway_failure_never_fails_the_transition() {
    let gateway = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/send"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&gateway)
        .await;

    let ctx = test_context(Some(&format!("{}/v1/send", gateway.uri())));

    let event = ctx
        .service
        .create_event(create_request("cleo", upcoming_start(), None))
        .await
        .unwrap();

    let event = ctx.service.invite_user("cleo", event.id, "ann").await.unwrap();
    assert!(event.is_participant("ann"));

    let stored = ctx.events.get(event.id).unwrap();
    assert!(stored.is_participant("ann"));
}
