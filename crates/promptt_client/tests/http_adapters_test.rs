// Client adapter tests against a mocked Promptt API.

use promptt_client::{error::ClientError, ApiClient, AuthClient, HttpGenerationGateway, HttpPromptStore};
use promptt_core::{
    domain::{Category, GenerationRequest, NewPromptRecord, User},
    ports::{
        Clipboard, GenerationGateway, PortError, PortResult, PromptStore, UsageService,
    },
    PromptError, PromptGenerationController, SessionContext, SubmitOutcome,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "session-token";

fn signed_in_api(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri()).with_token(Some(TOKEN.to_string()))
}

fn request(goal: &str, category: Option<Category>) -> GenerationRequest {
    GenerationRequest::new(goal, category).unwrap()
}

#[derive(Default)]
struct RecordingClipboard(Mutex<Vec<String>>);

#[async_trait::async_trait]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: &str) -> PortResult<()> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

//=========================================================================================
// Generation Gateway
//=========================================================================================

#[tokio::test]
async fn gateway_posts_goal_and_category() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-prompt"))
        .and(body_json(json!({"goal": "launch tweet", "category": "marketing"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"generatedPrompt": "Act as a copywriter."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = HttpGenerationGateway::new(ApiClient::new(server.uri()));
    let reply = gateway
        .generate(&request("  launch tweet ", Some(Category::Marketing)))
        .await
        .unwrap();
    assert_eq!(reply.generated_prompt.as_deref(), Some("Act as a copywriter."));
}

#[tokio::test]
async fn gateway_forwards_token_and_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-prompt"))
        .and(header("authorization", "Bearer session-token"))
        .and(body_json(json!({"goal": "g", "apiKey": "sk-own"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway =
        HttpGenerationGateway::new(signed_in_api(&server)).with_api_key(Some("sk-own".into()));
    let reply = gateway.generate(&request("g", None)).await.unwrap();
    assert_eq!(reply.generated_prompt, None);
}

#[tokio::test]
async fn gateway_maps_error_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-prompt"))
        .and(body_json(json!({"goal": "quota"})))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"error": "Daily prompt limit reached"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate-prompt"))
        .and(body_json(json!({"goal": "upstream"})))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({"error": "model overloaded"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate-prompt"))
        .and(body_json(json!({"goal": "bare"})))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let gateway = HttpGenerationGateway::new(ApiClient::new(server.uri()));
    assert_eq!(
        gateway.generate(&request("quota", None)).await,
        Err(PortError::QuotaExceeded)
    );
    assert_eq!(
        gateway.generate(&request("upstream", None)).await,
        Err(PortError::Rejected("model overloaded".into()))
    );
    assert_eq!(
        gateway.generate(&request("bare", None)).await,
        Err(PortError::Rejected(String::new()))
    );
}

#[tokio::test]
async fn unreachable_gateway_is_unexpected() {
    // Bind an ephemeral port and free it again, so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let gateway = HttpGenerationGateway::new(ApiClient::new(format!("http://127.0.0.1:{port}")));
    let err = gateway.generate(&request("g", None)).await.unwrap_err();
    assert!(matches!(err, PortError::Unexpected(_)));
}

//=========================================================================================
// Record Store
//=========================================================================================

#[tokio::test]
async fn store_round_trips_records_and_usage() {
    let server = MockServer::start().await;
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/prompts"))
        .and(header("authorization", "Bearer session-token"))
        .and(body_json(json!({
            "goal": "g",
            "generatedText": "t",
            "category": "coding",
            "isFavorite": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": id})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prompts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": id,
            "ownerId": owner,
            "goal": "g",
            "generatedText": "t",
            "category": "coding",
            "isFavorite": true,
            "createdAt": "2026-03-01T10:00:00Z"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "day": "2026-03-01", "used": 2, "limit": 5, "remaining": 3
        })))
        .mount(&server)
        .await;

    let store = HttpPromptStore::new(signed_in_api(&server));
    let new_id = store
        .insert_prompt(NewPromptRecord {
            owner_id: owner,
            goal: "g".into(),
            generated_text: "t".into(),
            category: Some(Category::Coding),
            is_favorite: false,
        })
        .await
        .unwrap();
    assert_eq!(new_id, id);

    let records = store.list_prompts(owner).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].category, Some(Category::Coding));
    assert!(records[0].is_favorite);

    let usage = store.daily_usage(owner).await.unwrap();
    assert_eq!(usage.owner_id, owner);
    assert_eq!(usage.remaining(), 3);
}

#[tokio::test]
async fn store_maps_not_found_and_unauthorized() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    let prompt_path = format!("/prompts/{id}");

    Mock::given(method("PATCH"))
        .and(path(prompt_path.as_str()))
        .and(body_json(json!({"isFavorite": true})))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Prompt not found"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(prompt_path.as_str()))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = HttpPromptStore::new(signed_in_api(&server));
    assert_eq!(
        store.set_favorite(id, Uuid::new_v4(), true).await,
        Err(PortError::NotFound("Prompt not found".into()))
    );
    assert_eq!(
        store.delete_prompt(id, Uuid::new_v4()).await,
        Err(PortError::Unauthorized)
    );
}

//=========================================================================================
// Session Provider
//=========================================================================================

#[tokio::test]
async fn login_returns_the_session_and_me_reads_it_back() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "a@b.c", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": user_id, "email": "a@b.c", "token": TOKEN
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": user_id, "email": "a@b.c"
        })))
        .mount(&server)
        .await;

    let stored = AuthClient::new(ApiClient::new(server.uri()))
        .login("a@b.c", "secret1")
        .await
        .unwrap();
    assert_eq!(stored.token, TOKEN);
    assert_eq!(stored.user_id, user_id);

    let me = AuthClient::new(signed_in_api(&server)).me().await.unwrap();
    assert_eq!(
        me,
        Some(User {
            id: user_id,
            email: Some("a@b.c".into())
        })
    );
}

#[tokio::test]
async fn rejected_token_reads_as_signed_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let me = AuthClient::new(signed_in_api(&server)).me().await.unwrap();
    assert_eq!(me, None);

    // No token means no request at all.
    let anonymous = AuthClient::new(ApiClient::new(server.uri())).me().await.unwrap();
    assert_eq!(anonymous, None);
}

#[tokio::test]
async fn password_change_is_checked_locally_then_posted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/password"))
        .and(header("authorization", "Bearer session-token"))
        .and(body_json(json!({"password": "secret2", "confirmPassword": "secret2"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let auth = AuthClient::new(signed_in_api(&server));
    let mismatch = auth.change_password("secret2", "secret3").await.unwrap_err();
    assert!(matches!(mismatch, ClientError::InvalidPassword(m) if m == "Passwords do not match"));
    let short = auth.change_password("12345", "12345").await.unwrap_err();
    assert!(matches!(short, ClientError::InvalidPassword(_)));

    auth.change_password("secret2", "secret2").await.unwrap();

    let anonymous = AuthClient::new(ApiClient::new(server.uri()));
    assert!(matches!(
        anonymous.change_password("secret2", "secret2").await,
        Err(ClientError::NotSignedIn)
    ));
}

//=========================================================================================
// Controller over HTTP
//=========================================================================================

#[tokio::test]
async fn signed_in_generation_is_saved_through_the_api() {
    let server = MockServer::start().await;
    let owner = Uuid::new_v4();
    let record_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/generate-prompt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generatedPrompt": "P"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/prompts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": record_id})))
        .expect(1)
        .mount(&server)
        .await;

    let api = signed_in_api(&server);
    let clipboard = Arc::new(RecordingClipboard::default());
    let controller = PromptGenerationController::new(
        Arc::new(HttpGenerationGateway::new(api.clone())),
        Arc::new(HttpPromptStore::new(api)),
        clipboard.clone(),
    );
    let session = SessionContext::signed_in(User {
        id: owner,
        email: None,
    });

    let outcome = controller.submit(&session, "goal", None).await.unwrap();
    let SubmitOutcome::Generated(current) = outcome else {
        panic!("expected a generated prompt");
    };
    assert_eq!(current.result.text, "P");
    assert_eq!(current.record_id, Some(record_id));

    controller.copy_result().await.unwrap();
    assert_eq!(*clipboard.0.lock().unwrap(), vec!["P".to_string()]);
}

#[tokio::test]
async fn gateway_error_text_reaches_the_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-prompt"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "API key is required"})))
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let controller = PromptGenerationController::new(
        Arc::new(HttpGenerationGateway::new(api.clone())),
        Arc::new(HttpPromptStore::new(api)),
        Arc::new(RecordingClipboard::default()),
    );

    let err = controller
        .submit(&SessionContext::anonymous(), "goal", None)
        .await
        .unwrap_err();
    assert_eq!(err, PromptError::Gateway("API key is required".into()));
}
