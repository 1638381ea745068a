//! 通知投递测试
//!
//! 使用mockito模拟飞书webhook，验证投递结果与失败处理

use lark_sentry::config::types::NotifierSettings;
use lark_sentry::error::NotificationError;
use lark_sentry::logging::{LogConfig, LoggingSystem};
use lark_sentry::notification::{DeliveryOutcome, LarkSender, Notifier};
use lark_sentry::EventContext;
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn settings(webhook: String) -> NotifierSettings {
    NotifierSettings {
        project: "backend".to_string(),
        webhook,
        message_template: "{header}<br>**Msg**: {message}<br><hr><br><btn:View>{url}".to_string(),
        secret: None,
        enabled: true,
    }
}

fn event() -> EventContext {
    EventContext::new()
        .with_header("Disk Full")
        .with_message("no space left on device")
        .with_url("http://example.com/event/1")
}

fn sender() -> Arc<LarkSender> {
    Arc::new(LarkSender::new(Duration::from_secs(2)).unwrap())
}

#[tokio::test]
async fn test_notify_posts_card_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/open-apis/bot/v2/hook/abc")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "msg_type": "interactive",
            "card": {
                "config": { "wide_screen_mode": true },
                "header": { "title": { "tag": "plain_text", "content": "Disk Full" } },
                "elements": [
                    { "tag": "div", "text": { "tag": "lark_md", "content": "**Msg**: no space left on device" } },
                    { "tag": "hr" },
                    {
                        "tag": "action",
                        "actions": [{
                            "tag": "button",
                            "url": "http://example.com/event/1",
                            "text": { "tag": "plain_text", "content": "View" },
                            "type": "primary"
                        }]
                    }
                ]
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"code":0,"msg":"success","data":{}}"#)
        .create_async()
        .await;

    let webhook = format!("{}/open-apis/bot/v2/hook/abc", server.url());
    let logging = Arc::new(LoggingSystem::new(LogConfig::default()));
    let notifier = Notifier::new(settings(webhook), sender()).with_logging(logging.clone());

    let outcome = notifier.notify(&event()).await;

    mock.assert_async().await;
    match outcome {
        DeliveryOutcome::Delivered(receipt) => {
            assert_eq!(receipt.status, 200);
            assert_eq!(receipt.code, 0);
            assert_eq!(receipt.message, "success");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let metrics = logging.metrics_collector().unwrap();
    assert_eq!(metrics.counter("notification_lark_success"), 1);
}

#[tokio::test]
async fn test_signed_payload_carries_timestamp_and_sign() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/hook")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""timestamp":"\d+""#.to_string()),
            Matcher::Regex(r#""sign":"[A-Za-z0-9+/=]{44}""#.to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"code":0,"msg":"success"}"#)
        .create_async()
        .await;

    let mut settings = settings(format!("{}/hook", server.url()));
    settings.secret = Some("bot-secret".to_string());
    let notifier = Notifier::new(settings, sender());

    assert!(notifier.notify(&event()).await.is_delivered());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_message_is_reported_not_propagated() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/hook")
        .with_status(200)
        .with_body(r#"{"code":19021,"msg":"sign match fail or timestamp is not within one hour"}"#)
        .create_async()
        .await;

    let logging = Arc::new(LoggingSystem::new(LogConfig::default()));
    let notifier = Notifier::new(settings(format!("{}/hook", server.url())), sender())
        .with_logging(logging.clone());

    match notifier.notify(&event()).await {
        DeliveryOutcome::Failed(NotificationError::Rejected { code, .. }) => {
            assert_eq!(code, 19021)
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let metrics = logging.metrics_collector().unwrap();
    assert_eq!(metrics.counter("notification_lark_failed"), 1);
    assert_eq!(metrics.counter("notification_lark_total"), 1);
}

#[tokio::test]
async fn test_http_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/hook")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let notifier = Notifier::new(settings(format!("{}/hook", server.url())), sender());
    match notifier.notify(&event()).await {
        DeliveryOutcome::Failed(NotificationError::Rejected { status, message, .. }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "bad gateway");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_failure() {
    // 端口1上没有服务监听
    let notifier = Notifier::new(settings("http://127.0.0.1:1/hook".to_string()), sender());
    let outcome = notifier.notify(&event()).await;
    assert!(matches!(
        outcome,
        DeliveryOutcome::Failed(NotificationError::Transport(_))
    ));
}

#[tokio::test]
async fn test_disabled_or_unconfigured_project_is_skipped() {
    let mut disabled = settings("https://example.com/hook".to_string());
    disabled.enabled = false;
    assert!(Notifier::new(disabled, sender())
        .notify(&event())
        .await
        .is_skipped());

    let unconfigured = settings(String::new());
    assert!(Notifier::new(unconfigured, sender())
        .notify(&event())
        .await
        .is_skipped());
}
