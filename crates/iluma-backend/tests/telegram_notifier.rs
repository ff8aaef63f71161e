use std::time::Duration;

use iluma_backend::{NotifyError, TelegramNotifier};
use iluma_core::TelegramConfig;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notifier(server: &MockServer) -> TelegramNotifier {
    TelegramNotifier::new(
        TelegramConfig {
            api_url: server.uri(),
            bot_token: "123:secret".to_string(),
            chat_id: "-100500".to_string(),
        },
        Duration::from_secs(5),
    )
    .expect("failed to build test notifier")
}

#[tokio::test]
async fn send_posts_markdown_message_to_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:secret/sendMessage"))
        .and(body_json(json!({
            "chat_id": "-100500",
            "text": "🛒 *НОВЫЙ ЗАКАЗ*",
            "parse_mode": "Markdown"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    notifier(&server)
        .send("🛒 *НОВЫЙ ЗАКАЗ*")
        .await
        .expect("notification accepted");
}

#[tokio::test]
async fn rejected_message_reports_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"ok": false, "description": "can't parse entities"})),
        )
        .mount(&server)
        .await;

    match notifier(&server).send("*broken").await {
        Err(NotifyError::Rejected { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("can't parse entities"));
        }
        other => panic!("expected Rejected, got: {other:?}"),
    }
}

#[tokio::test]
async fn transport_error_does_not_leak_token() {
    let server = MockServer::start().await;
    let api_url = server.uri();
    drop(server);

    let notifier = TelegramNotifier::new(
        TelegramConfig {
            api_url,
            bot_token: "123:secret".to_string(),
            chat_id: "-1".to_string(),
        },
        Duration::from_secs(1),
    )
    .unwrap();

    let err = notifier.send("hello").await.unwrap_err();
    assert!(matches!(err, NotifyError::Http(_)));
    assert!(!err.to_string().contains("secret"));
}
