//! HTTP channel behaviour against a live endpoint.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use supervisor_event_relay::config::{
    SlackConfig, TransportConfig, WebhookConfig, WorkWeixinConfig,
};
use supervisor_event_relay::notify::{SlackChannel, WebhookChannel, WorkWeixinChannel};
use supervisor_event_relay::{Error, Notifier, ProcessEvent};

use std::time::Duration;

use common::{spawn_endpoint, spawn_slow_endpoint};

fn event() -> ProcessEvent {
    let mut event = ProcessEvent::new("PROCESS_STATE_EXITED", "web-01").with_process("cat");
    event.pid = Some(2766);
    event
}

fn workweixin(url: &str) -> WorkWeixinChannel {
    let config = WorkWeixinConfig {
        endpoint: url.to_string(),
        mentioned_list: vec!["a".to_string(), "b".to_string()],
        mentioned_mobile_list: Vec::new(),
    };
    WorkWeixinChannel::new(config, &TransportConfig::default()).unwrap()
}

mod workweixin_tests {
    use super::*;

    #[tokio::test]
    async fn test_sends_exact_payload() {
        let endpoint = spawn_endpoint(StatusCode::OK, r#"{"errcode":0}"#).await;
        let event = event();

        workweixin(&endpoint.url).send(&event).await.unwrap();

        assert_eq!(
            endpoint.requests(),
            vec![json!({
                "msgtype": "text",
                "text": {
                    "content": event.to_string(),
                    "mentioned_list": ["a", "b"],
                }
            })]
        );
    }

    #[tokio::test]
    async fn test_non_200_statuses_fail_with_status_and_body() {
        for (status, body) in [
            (StatusCode::NOT_FOUND, "no such robot"),
            (StatusCode::INTERNAL_SERVER_ERROR, "bad"),
            (StatusCode::CREATED, "created is not ok"),
        ] {
            let endpoint = spawn_endpoint(status, body).await;

            let err = workweixin(&endpoint.url).send(&event()).await.unwrap_err();
            match &err {
                Error::HttpStatus {
                    channel,
                    status: code,
                    body: text,
                } => {
                    assert_eq!(*channel, "workweixin");
                    assert_eq!(*code, status.as_u16());
                    assert_eq!(text, body);
                }
                other => panic!("unexpected error: {other:?}"),
            }
            let message = err.to_string();
            assert!(message.contains(&status.as_u16().to_string()), "{message}");
            assert!(message.contains(body), "{message}");
            assert_eq!(endpoint.requests().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let endpoint = spawn_endpoint(StatusCode::OK, "").await;
        let url = endpoint.url.replace("/hook", "/missing");

        // axum answers unknown routes with 404
        let err = workweixin(&url).send(&event()).await.unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 404, .. }));

        let err = workweixin("http://127.0.0.1:1/hook")
            .send(&event())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}

mod slack_tests {
    use super::*;

    fn slack(url: &str) -> SlackChannel {
        let config = SlackConfig {
            webhook_url: url.to_string(),
            channel: "ops".to_string(),
        };
        SlackChannel::new(config, &TransportConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_posts_channel_and_text() {
        let endpoint = spawn_endpoint(StatusCode::OK, "ok").await;
        let event = event();

        slack(&endpoint.url).send(&event).await.unwrap();

        assert_eq!(
            endpoint.requests(),
            vec![json!({ "channel": "ops", "text": event.to_string() })]
        );
    }

    #[tokio::test]
    async fn test_failure_status() {
        let endpoint = spawn_endpoint(StatusCode::FORBIDDEN, "invalid_token").await;

        let err = slack(&endpoint.url).send(&event()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("403"));
        assert!(message.contains("invalid_token"));
    }
}

mod webhook_tests {
    use super::*;

    fn webhook(url: &str) -> WebhookChannel {
        let config = WebhookConfig {
            url: url.to_string(),
        };
        WebhookChannel::new(config, &TransportConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_accepts_any_success_status() {
        let endpoint = spawn_endpoint(StatusCode::ACCEPTED, "").await;
        let event = event();

        webhook(&endpoint.url).send(&event).await.unwrap();

        let requests = endpoint.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["message"], event.to_string());
        assert_eq!(requests[0]["data"]["pid"], 2766);
    }

    #[tokio::test]
    async fn test_failure_status() {
        let endpoint = spawn_endpoint(StatusCode::BAD_GATEWAY, "upstream down").await;

        let err = webhook(&endpoint.url).send(&event()).await.unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 502, .. }));
        assert!(err.to_string().contains("upstream down"));
    }
}

#[tokio::test]
async fn test_slow_endpoint_hits_configured_timeout() {
    let url = spawn_slow_endpoint(Duration::from_secs(5)).await;
    let transport = TransportConfig {
        timeout: Duration::from_secs(1),
        ..TransportConfig::default()
    };
    let channels: Vec<Box<dyn Notifier>> = vec![
        Box::new(
            WorkWeixinChannel::new(
                WorkWeixinConfig {
                    endpoint: url.clone(),
                    mentioned_list: vec!["a".to_string()],
                    mentioned_mobile_list: Vec::new(),
                },
                &transport,
            )
            .unwrap(),
        ),
        Box::new(
            SlackChannel::new(
                SlackConfig {
                    webhook_url: url.clone(),
                    channel: "ops".to_string(),
                },
                &transport,
            )
            .unwrap(),
        ),
        Box::new(WebhookChannel::new(WebhookConfig { url: url.clone() }, &transport).unwrap()),
    ];

    for channel in channels {
        let started = std::time::Instant::now();
        let err = channel.send(&event()).await.unwrap_err();
        match &err {
            Error::Http(e) => assert!(e.is_timeout(), "{e:?}"),
            other => panic!("unexpected error from {}: {other:?}", channel.channel_type()),
        }
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}

#[tokio::test]
async fn test_notifier_test_event() {
    let endpoint = spawn_endpoint(StatusCode::OK, "").await;

    workweixin(&endpoint.url).test("web-01").await.unwrap();

    let requests = endpoint.requests();
    let content = requests[0]["text"]["content"].as_str().unwrap();
    assert!(content.contains("supervisor-event-relay-test"));
    assert!(content.contains("Host: web-01"));
}
