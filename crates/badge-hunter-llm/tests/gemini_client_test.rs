use std::sync::Arc;

use futures::StreamExt;
use mockito::{Matcher, Server};
use serde_json::json;

use badge_hunter_llm::{
    AdviceMode, AdviceOutcome, BadgeAdvisor, ChatClient, ChatRequest, ClientFactory, GeminiClient,
    Message, ProviderConfig, StreamEvent, ERROR_NOTICE,
};

const FAST_STREAM_PATH: &str = "/models/gemini-2.5-flash-lite:streamGenerateContent";

fn sse(chunks: &[&str]) -> String {
    chunks.iter().map(|c| format!("data: {}\r\n\r\n", c)).collect()
}

fn client_for(server: &Server) -> GeminiClient {
    GeminiClient::new("test-key").unwrap().with_base_url(server.url())
}

#[tokio::test]
async fn test_stream_yields_fragments_in_order() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", FAST_STREAM_PATH)
        .match_query(Matcher::UrlEncoded("alt".into(), "sse".into()))
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse(&[
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hel"}]}}]}"#,
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"lo!"}]},"finishReason":"STOP"}]}"#,
        ]))
        .create_async()
        .await;

    let request = ChatRequest::new("gemini-2.5-flash-lite", vec![Message::human("hi")]);
    let events: Vec<_> = client_for(&server)
        .chat_stream(request)
        .await
        .unwrap()
        .collect()
        .await;

    mock.assert_async().await;
    let events: Vec<StreamEvent> = events.into_iter().map(|e| e.unwrap()).collect();
    assert_eq!(
        events,
        vec![
            StreamEvent::Message { content: "Hel".into() },
            StreamEvent::Message { content: "lo!".into() },
            StreamEvent::Done { finish_reason: Some("STOP".into()) },
        ]
    );
}

#[tokio::test]
async fn test_error_status_fails_before_streaming() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", FAST_STREAM_PATH)
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#)
        .create_async()
        .await;

    let request = ChatRequest::new("gemini-2.5-flash-lite", vec![Message::human("hi")]);
    let err = client_for(&server).chat_stream(request).await.err().unwrap();

    mock.assert_async().await;
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_non_streaming_chat() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/models/gemini-2.5-flash-lite:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Merge "}, {"text": "PRs."}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3, "totalTokenCount": 15}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let request = ChatRequest::new("gemini-2.5-flash-lite", vec![Message::human("Pull Shark?")]);
    let response = client_for(&server).chat(request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.content.as_deref(), Some("Merge PRs."));
    assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
    assert_eq!(response.usage.unwrap().total_tokens, 15);
}

#[tokio::test]
async fn test_advisor_deep_mode_request_shape() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/models/gemini-3-pro-preview:streamGenerateContent")
        .match_query(Matcher::UrlEncoded("alt".into(), "sse".into()))
        .match_body(Matcher::PartialJson(json!({
            "contents": [{"role": "user", "parts": [{"text": "Plan my badges"}]}],
            "generationConfig": {"thinkingConfig": {"thinkingBudget": 32768}}
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse(&[
            r#"{"candidates":[{"content":{"parts":[{"text":"thinking...","thought":true}]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":"Start small."}]},"finishReason":"STOP"}]}"#,
        ]))
        .create_async()
        .await;

    let advisor = BadgeAdvisor::new(Arc::new(client_for(&server)));
    let mut text = String::new();
    let outcome = advisor
        .stream_advice("Plan my badges", AdviceMode::Deep, |c| text.push_str(c))
        .await;

    mock.assert_async().await;
    assert_eq!(outcome, AdviceOutcome::Completed);
    assert_eq!(text, "Start small.");
}

#[tokio::test]
async fn test_advisor_mid_stream_provider_error_appends_notice() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", FAST_STREAM_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse(&[
            r#"{"candidates":[{"content":{"parts":[{"text":"Hel"}]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":"lo!"}]}}]}"#,
            r#"{"error":{"code":503,"message":"The model is overloaded","status":"UNAVAILABLE"}}"#,
        ]))
        .create_async()
        .await;

    let client = ClientFactory::create_chat_client(ProviderConfig::gemini("test-key").with_base_url(server.url()))
        .unwrap();
    let advisor = BadgeAdvisor::new(client);

    let mut chunks: Vec<String> = Vec::new();
    let outcome = advisor
        .stream_advice("hi", AdviceMode::Fast, |c| chunks.push(c.to_string()))
        .await;

    assert_eq!(outcome, AdviceOutcome::Failed);
    assert_eq!(chunks.concat(), format!("Hello!{}", ERROR_NOTICE));
}

#[tokio::test]
async fn test_advisor_delivers_one_chunk_per_response_fragment() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", FAST_STREAM_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse(&[
            r#"{"candidates":[{"content":{"parts":[{"text":"Hel"},{"text":"lo!"}]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":" Bye"}]},"finishReason":"STOP"}]}"#,
        ]))
        .create_async()
        .await;

    let advisor = BadgeAdvisor::new(Arc::new(client_for(&server)));
    let mut chunks: Vec<String> = Vec::new();
    let outcome = advisor
        .stream_advice("hi", AdviceMode::Fast, |c| chunks.push(c.to_string()))
        .await;

    assert_eq!(outcome, AdviceOutcome::Completed);
    assert_eq!(chunks, vec!["Hello!".to_string(), " Bye".to_string()]);
}

#[tokio::test]
async fn test_advisor_unreachable_host_yields_notice() {
    let client = GeminiClient::new("test-key").unwrap().with_base_url("http://127.0.0.1:9");
    let advisor = BadgeAdvisor::new(Arc::new(client));

    let mut chunks: Vec<String> = Vec::new();
    let outcome = advisor
        .stream_advice("hi", AdviceMode::Fast, |c| chunks.push(c.to_string()))
        .await;

    assert_eq!(outcome, AdviceOutcome::Failed);
    assert_eq!(chunks, vec![ERROR_NOTICE.to_string()]);
}
