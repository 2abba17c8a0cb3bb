//! Tests of the HTTP client against a mocked API

use chrono::NaiveDate;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use everyday_tasks::client::Client;
use everyday_tasks::error::{Error, GENERIC_FAILURE_MESSAGE};
use everyday_tasks::registry::TaskRegistry;
use everyday_tasks::session::AuthToken;
use everyday_tasks::traits::{Authenticator, TaskServer};
use everyday_tasks::{CategoryId, Priority, TaskDraft, TaskId};

fn token() -> AuthToken {
    AuthToken::new("abc.def")
}

fn task_json(id: &str, completed: bool) -> serde_json::Value {
    serde_json::json!({
        "_id": id,
        "title": "Groceries",
        "description": "Buy milk",
        "date": "2024-03-15T00:00:00.000Z",
        "category": {"_id": "c1", "name": "Home"},
        "priority": 3,
        "isCompleted": completed,
    })
}

async fn setup() -> (MockServer, Client) {
    let _ = env_logger::builder().is_test(true).try_init();
    let server = MockServer::start().await;
    let client = Client::new(server.uri()).unwrap();
    (server, client)
}

#[tokio::test]
async fn login_returns_the_token() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .and(body_json(serde_json::json!({"email": "alice@example.org", "password": "Passw0rd"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "abc.def"})))
        .expect(1)
        .mount(&server)
        .await;

    let received = client.login("alice@example.org", "Passw0rd").await.unwrap();
    assert_eq!(received, token());
}

#[tokio::test]
async fn rejections_carry_the_server_message() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({"message": "Email invalide"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    match client.login("nobody@example.org", "x").await {
        Err(Error::Server { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Email invalide");
        },
        other => panic!("Unexpected result {:?}", other),
    }

    let err = client.get_categories(&token()).await.unwrap_err();
    assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn email_check() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/user/check/alice@example.org"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"exists": true})))
        .mount(&server)
        .await;

    assert!(client.email_exists("alice@example.org").await.unwrap());
}

#[tokio::test]
async fn authenticated_routes_send_the_token() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/card/2024-03-15"))
        .and(header("Authorization", "Bearer abc.def"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([task_json("t1", false)])))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client.get_tasks(&token(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id(), &TaskId::from("t1"));
    assert_eq!(tasks[0].date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    assert_eq!(tasks[0].priority(), Priority::High);
}

#[tokio::test]
async fn task_mutations() {
    let (server, client) = setup().await;
    let draft = TaskDraft {
        title: "Groceries".to_string(),
        description: "Buy milk".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        category: CategoryId::from("c1"),
        priority: Priority::High,
    };

    Mock::given(method("POST"))
        .and(path("/api/card"))
        .and(body_json(serde_json::json!({
            "title": "Groceries", "description": "Buy milk", "date": "2024-03-15",
            "category": "c1", "priority": 3, "isCompleted": false,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(task_json("t1", false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/card/t1/complete"))
        .and(body_json(serde_json::json!({"isCompleted": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("t1", true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/card/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "Tâche supprimée"})))
        .expect(1)
        .mount(&server)
        .await;

    let created = client.create_task(&token(), &draft).await.unwrap();
    assert_eq!(created.to_draft(), Some(draft));
    let completed = client.set_completion(&token(), created.id(), true).await.unwrap();
    assert!(completed.completed());
    client.delete_task(&token(), created.id()).await.unwrap();
}

#[tokio::test]
async fn completion_follows_the_server_reply() {
    let (server, client) = setup().await;
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    Mock::given(method("GET"))
        .and(path("/api/card/2024-03-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([task_json("t1", false)])))
        .mount(&server)
        .await;
    // The server refuses to complete the task, and says so in its reply
    Mock::given(method("PATCH"))
        .and(path("/api/card/t1/complete"))
        .and(body_json(serde_json::json!({"isCompleted": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("t1", false)))
        .expect(1)
        .mount(&server)
        .await;

    let mut registry = TaskRegistry::new();
    assert!(registry.fetch_for_date(&client, &token(), date).await);
    let id = TaskId::from("t1");
    assert!(registry.select(&id));

    assert_eq!(registry.toggle_complete(&client, &token(), &id).await.unwrap(), false);
    assert_eq!(registry.get(&id).unwrap().completed(), false);
    assert_eq!(registry.selected().unwrap().completed(), false);
}

#[tokio::test]
async fn categories() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/categories"))
        .and(body_json(serde_json::json!({"name": "Home"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"_id": "c1", "name": "Home", "__v": 0})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/categories/c1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Catégorie introuvable"})))
        .mount(&server)
        .await;

    let home = client.add_category(&token(), "Home").await.unwrap();
    assert_eq!(home.name(), "Home");
    let err = client.delete_category(&token(), home.id()).await.unwrap_err();
    assert_eq!(err.to_string(), "Catégorie introuvable");
}

#[tokio::test]
async fn unexpected_payloads() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.get_categories(&token()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)));
}

#[tokio::test]
async fn unreachable_server() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = Client::new(uri).unwrap();
    let err = client.get_categories(&token()).await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert_eq!(err.to_string(), "Impossible de se connecter au serveur. Veuillez vérifier votre connexion internet.");
}
