//! End-to-end retry and session refresh through the transaction queue.

mod support;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gifscout_core::{InMemoryCollection, Transaction, Transport};
use gifscout_domain::{
    AuthState, GifScoutError, HttpRequest, SearchQuery, SessionToken, TransactionStatus,
};
use gifscout_infra::{RefreshFn, SearchGifClient};
use serde_json::{json, Value};
use support::{fast_client, EventCounter};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_body() -> Value {
    json!({
        "data": [{
            "type": "gif",
            "id": "xT9IgG50Fb7Mi0prBC",
            "title": "space cat",
            "images": { "fixed_height": { "url": "https://media.test/1.gif", "width": "200" } }
        }],
        "pagination": { "total_count": 1, "offset": 0, "count": 1 },
        "meta": { "status": 200, "msg": "OK", "response_id": "r-1" }
    })
}

#[tokio::test]
async fn search_survives_two_unavailable_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/gifs/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/gifs/search"))
        .and(query_param("api_key", "key-1"))
        .and(query_param("q", "space cat"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(Some(5));
    let events = EventCounter::attach(&client);
    let transport = Transport::new(Arc::new(client.clone()), Arc::new(InMemoryCollection::new()));
    let search = SearchGifClient::new(
        transport.clone(),
        format!("{}/v1/gifs/search", server.uri()),
        "key-1",
    );

    let response = search.search_page("space cat", 1).await.expect("search resolves");
    transport.shutdown().await;

    assert_eq!(response.data.len(), 1);
    assert_eq!(response.data[0].image_url("fixed_height"), Some("https://media.test/1.gif"));
    assert_eq!(events.backoff(), 2);
    assert_eq!(events.ready(), 2);
    assert_eq!(events.fail(), 0);
    assert_eq!(client.backoff().retry_count(), 0, "success resets the controller");

    let records = transport.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, TransactionStatus::Completed);
    assert!(records[0].error().is_none());
}

#[tokio::test]
async fn exhausted_retries_reject_the_transaction() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "code": "E_DOWN" })))
        .expect(2)
        .mount(&server)
        .await;

    let client = fast_client(Some(1));
    let events = EventCounter::attach(&client);
    let transport = Transport::new(Arc::new(client), Arc::new(InMemoryCollection::new()));

    let transaction = Arc::new(Transaction::<Value>::http(HttpRequest::get(format!(
        "{}/v1/gifs/search",
        server.uri()
    ))));
    let err = transport.queue(Arc::clone(&transaction)).await.unwrap_err();
    transport.shutdown().await;

    match err {
        GifScoutError::Connection(error) => {
            assert_eq!(error.http_status(), Some(500));
            assert_eq!(error.code(), "E_DOWN");
        }
        other => panic!("expected connection error, got {other:?}"),
    }
    assert_eq!(events.fail(), 1);
    assert_eq!(transaction.status(), TransactionStatus::Completed);
}

#[tokio::test]
async fn rejected_token_is_refreshed_and_the_request_resent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("Authorization", "stale-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "code": "E_TOKEN" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("Authorization", "fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": "ada" })))
        .expect(1)
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicU32::new(0));
    let refresher = {
        let calls = Arc::clone(&calls);
        RefreshFn::new(move || {
            let calls = Arc::clone(&calls);
            async move {
                // First attempt fails with a non-connection error and is retried.
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(GifScoutError::Internal("identity provider warming up".into()))
                } else {
                    Ok(SessionToken::new("fresh-token"))
                }
            }
        })
    };

    let client = fast_client(Some(5)).with_refresher(Arc::new(refresher));
    client.set_session(SessionToken::new("stale-token"));
    let events = EventCounter::attach(&client);
    let transport = Transport::new(Arc::new(client.clone()), Arc::new(InMemoryCollection::new()));

    let transaction =
        Arc::new(Transaction::<Value>::http(HttpRequest::get(format!("{}/v1/me", server.uri()))));
    let body = tokio::time::timeout(Duration::from_secs(5), transport.queue(transaction))
        .await
        .expect("request settles")
        .expect("request succeeds after refresh");
    transport.shutdown().await;

    assert_eq!(body, json!({ "user": "ada" }));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(events.ready(), 2, "one refresh per ready window");
    assert_eq!(client.auth_state(), AuthState::Authenticated);
    assert_eq!(client.session().id_token(), Some("fresh-token"));
}

#[tokio::test]
async fn refresh_rejection_ends_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "stale-token"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    // Once the session is cleared the request goes out without credentials.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "anonymous": true })))
        .mount(&server)
        .await;

    let refresher = RefreshFn::new(|| async {
        Err(GifScoutError::from(gifscout_domain::ConnectionError::from_status(401, None)))
    });
    let client = fast_client(Some(5)).with_refresher(Arc::new(refresher));
    client.set_session(SessionToken::new("stale-token"));

    let body = tokio::time::timeout(
        Duration::from_secs(5),
        client.get(format!("{}/v1/me", server.uri())),
    )
    .await
    .expect("request settles")
    .expect("request succeeds anonymously");

    assert_eq!(body, json!({ "anonymous": true }));
    assert_eq!(client.auth_state(), AuthState::Unauthenticated);
    assert!(client.session().id_token().is_none());
}

#[tokio::test]
async fn queued_search_serialises_the_full_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "dogs"))
        .and(query_param("includeDeleted", "true"))
        .and(query_param("lastId", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&server)
        .await;

    let transport =
        Transport::new(Arc::new(fast_client(Some(0))), Arc::new(InMemoryCollection::new()));
    let search = SearchGifClient::new(transport.clone(), server.uri(), "key-1");

    let response = search
        .search(SearchQuery::new("dogs").after("abc").include_deleted(true))
        .await
        .expect("search resolves");
    transport.shutdown().await;
    assert_eq!(response.meta.response_id, "r-1");
}
