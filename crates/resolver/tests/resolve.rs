#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use tenantgate_resolver::{
    create_router, AppState, Config, MemoryDomainStore, RedisDomainStore, RedisTimeouts,
};
use tower::ServiceExt;

fn app(store: &Arc<MemoryDomainStore>) -> Router {
    create_router(AppState::new(Config::default(), store.clone()))
}

async fn text_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn with_hosts(original: Option<&str>, forwarded: Option<&str>, host: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/");
    if let Some(original) = original {
        builder = builder.header("x-original-host", original);
    }
    if let Some(forwarded) = forwarded {
        builder = builder.header("x-forwarded-host", forwarded);
    }
    if let Some(host) = host {
        builder = builder.header("host", host);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn mapped_hosts_resolve_to_their_tenant() {
    let store = Arc::new(MemoryDomainStore::new());
    let mappings = [
        ("shop.example.com", "tenant-42"),
        ("acme.example.org", "acme"),
        ("localhost:8080", "dev-tenant"),
    ];
    for (host, tenant) in mappings {
        store.map_domain(host, tenant);
    }

    for (host, tenant) in mappings {
        let response = app(&store)
            .oneshot(with_hosts(Some(host), None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{host}");
        assert_eq!(response.headers().get("x-tenant-id").unwrap(), tenant);
        assert!(text_body(response).await.is_empty());
    }
}

#[tokio::test]
async fn unmapped_host_is_unauthorized() {
    let store = Arc::new(MemoryDomainStore::new());
    store.map_domain("shop.example.com", "tenant-42");

    let response = app(&store)
        .oneshot(with_hosts(None, None, Some("unknown.example.com")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get("x-tenant-id").is_none());
    assert_eq!(text_body(response).await, "Tenant not found for domain");
}

#[tokio::test]
async fn missing_host_is_bad_request() {
    let store = Arc::new(MemoryDomainStore::new());

    let response = app(&store)
        .oneshot(with_hosts(Some(""), Some(""), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(text_body(response).await, "No host header found");
    assert!(store.lookups().is_empty());
}

#[tokio::test]
async fn highest_priority_host_wins() {
    let store = Arc::new(MemoryDomainStore::new());
    store.map_domain("a.example.com", "tenant-a");

    let response = app(&store)
        .oneshot(with_hosts(
            Some("a.example.com"),
            Some("b.example.com"),
            Some("c.example.com"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-tenant-id").unwrap(), "tenant-a");
}

#[tokio::test]
async fn failed_lookup_does_not_fall_back() {
    let store = Arc::new(MemoryDomainStore::new());
    store.map_domain("b.example.com", "tenant-b");
    store.map_domain("c.example.com", "tenant-c");

    let response = app(&store)
        .oneshot(with_hosts(
            Some("a.example.com"),
            Some("b.example.com"),
            Some("c.example.com"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get("x-tenant-id").is_none());
    assert_eq!(store.lookups(), vec!["domain:a.example.com"]);
}

#[tokio::test]
async fn forwarded_host_used_when_original_absent() {
    let store = Arc::new(MemoryDomainStore::new());
    store.map_domain("b.example.com", "tenant-b");
    store.map_domain("c.example.com", "tenant-c");

    let response = app(&store)
        .oneshot(with_hosts(None, Some("b.example.com"), Some("c.example.com")))
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-tenant-id").unwrap(), "tenant-b");
}

#[tokio::test]
async fn store_outage_is_internal_error() {
    let store = Arc::new(MemoryDomainStore::new());
    store.map_domain("shop.example.com", "tenant-42");
    store.set_reachable(false);

    let response = app(&store)
        .oneshot(with_hosts(Some("shop.example.com"), None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get("x-tenant-id").is_none());
    assert_eq!(text_body(response).await, "Internal server error");
}

#[tokio::test]
async fn unsendable_mapping_is_internal_error() {
    let store = Arc::new(MemoryDomainStore::new());
    store.map_domain("shop.example.com", "tenant\n42");

    let response = app(&store)
        .oneshot(with_hosts(Some("shop.example.com"), None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get("x-tenant-id").is_none());
}

#[tokio::test]
async fn readiness_recovers_without_caching() {
    let store = Arc::new(MemoryDomainStore::new());
    let router = app(&store);
    let ready = || Request::builder().uri("/ready").body(Body::empty()).unwrap();

    store.set_reachable(false);
    let response = router.clone().oneshot(ready()).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    store.set_reachable(true);
    let response = router.clone().oneshot(ready()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    store.set_reachable(false);
    let response = router.oneshot(ready()).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn custom_host_policy_is_honoured() {
    let store = Arc::new(MemoryDomainStore::new());
    store.map_domain("c.example.com", "tenant-c");

    let config = Config {
        host_policy: "host".parse().unwrap(),
        ..Config::default()
    };
    let router = create_router(AppState::new(config, store.clone()));

    let response = router
        .oneshot(with_hosts(Some("a.example.com"), None, Some("c.example.com")))
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-tenant-id").unwrap(), "tenant-c");
}

#[tokio::test]
async fn utf8_host_is_looked_up_verbatim() {
    let store = Arc::new(MemoryDomainStore::new());
    store.map_domain("café.example.com", "tenant-42");

    let response = app(&store)
        .oneshot(with_hosts(Some("café.example.com"), None, Some("other.example.com")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-tenant-id").unwrap(), "tenant-42");
    assert_eq!(store.lookups(), vec!["domain:café.example.com".to_string()]);
}

#[tokio::test]
async fn silent_redis_fails_before_the_handler_deadline() {
    use redis::IntoConnectionInfo;
    use std::time::{Duration, Instant};

    // Accepts connections and never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let timeouts = RedisTimeouts {
        connect: Duration::from_millis(200),
        response: Duration::from_millis(200),
    };
    let info = format!("redis://{addr}/0").into_connection_info().unwrap();
    let store = Arc::new(RedisDomainStore::open(info, timeouts).unwrap());
    let config = Config {
        write_timeout: Duration::from_secs(5),
        ..Config::default()
    };
    let router = create_router(AppState::new(config, store));

    let started = Instant::now();
    let response = router
        .clone()
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(text_body(response).await, "Service not ready");

    let response = router
        .oneshot(with_hosts(Some("shop.example.com"), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get("x-tenant-id").is_none());

    assert!(started.elapsed() < Duration::from_secs(2));
}
