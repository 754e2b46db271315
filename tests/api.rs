//! End-to-end checks through the real router: what the HTTP surface
//! discloses, and when.

use paperhearts::auth::AuthConfig;
use paperhearts::reveal::RevealGate;
use paperhearts::selections::locks::UserLocks;
use paperhearts::{app, db, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

const HIDDEN: &str = "2099-02-14T00:00:00Z";
const PASSED: &str = "2020-02-14T00:00:00Z";

async fn api_pool() -> SqlitePool {
    let path = std::env::temp_dir().join(format!("paperhearts-api-{}.db", Uuid::now_v7()));
    db::open(path.to_str().unwrap()).await.unwrap()
}

/// Serves the app on an ephemeral port, returning its base url.
async fn serve(pool: SqlitePool, deadline: &str) -> String {
    let state = AppState {
        db_pool: pool,
        locks: UserLocks::new(),
        reveal: RevealGate::parse(deadline).unwrap(),
        auth: AuthConfig { allowed_email_domain: None },
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    format!("http://{addr}")
}

/// Logs in (creating the user on first sight) and returns a client
/// holding the session cookie, plus the user's id.
async fn login(base: &str, email: &str, full_name: &str) -> (reqwest::Client, Uuid) {
    let client = reqwest::Client::builder().cookie_store(true).build().unwrap();
    let body: Value = client
        .post(format!("{base}/login"))
        .json(&json!({ "email": email, "full_name": full_name }))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = Uuid::parse_str(body["user_id"].as_str().unwrap()).unwrap();
    (client, id)
}

async fn get_json(client: &reqwest::Client, url: String) -> Value {
    client.get(url).send().await.unwrap().json().await.unwrap()
}

#[tokio::test]
async fn select_response_discloses_nothing_about_reciprocity() {
    let base = serve(api_pool().await, HIDDEN).await;
    let (asha, asha_id) = login(&base, "a@campus.edu", "Asha").await;
    let (ben, ben_id) = login(&base, "b@campus.edu", "Ben").await;

    let first: Value = asha
        .post(format!("{base}/api/select"))
        .json(&json!({ "target_id": ben_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Value = ben
        .post(format!("{base}/api/select"))
        .json(&json!({ "target_id": asha_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // the reciprocating select (which formed a match inside the store)
    // must be indistinguishable from the one-sided select
    assert_eq!(first, json!({ "ok": true }));
    assert_eq!(second, json!({ "ok": true }));

    // and the matches view stays locked too
    let matches = get_json(&ben, format!("{base}/api/matches")).await;
    assert_eq!(matches["revealed"], json!(false));
    assert_eq!(matches["matches"], json!([]));
}

#[tokio::test]
async fn matches_stay_locked_until_deadline_then_open_with_no_extra_action() {
    let pool = api_pool().await;
    let base = serve(pool.clone(), HIDDEN).await;
    let (asha, asha_id) = login(&base, "a@campus.edu", "Asha").await;
    let (ben, ben_id) = login(&base, "b@campus.edu", "Ben").await;

    ben.put(format!("{base}/api/profile"))
        .json(&json!({ "department": "Physics", "year": "3", "instagram_handle": "@ben_c" }))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();

    for (client, target) in [(&asha, ben_id), (&ben, asha_id)] {
        client
            .post(format!("{base}/api/select"))
            .json(&json!({ "target_id": target }))
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap();
    }

    // the match exists in storage, but nothing about it leaks early
    let locked = get_json(&asha, format!("{base}/api/matches")).await;
    assert_eq!(locked["revealed"], json!(false));
    assert_eq!(locked["matches"], json!([]));

    // same data behind a gate whose deadline has passed: full profiles,
    // no user action in between
    let revealed_base = serve(pool, PASSED).await;
    let (asha, _) = login(&revealed_base, "a@campus.edu", "Asha").await;
    let open = get_json(&asha, format!("{revealed_base}/api/matches")).await;
    assert_eq!(open["revealed"], json!(true));

    let partners = open["matches"].as_array().unwrap();
    assert_eq!(partners.len(), 1);
    assert_eq!(partners[0]["full_name"], json!("Ben"));
    assert_eq!(partners[0]["department"], json!("Physics"));
    assert_eq!(partners[0]["instagram_handle"], json!("ben_c"));
}
