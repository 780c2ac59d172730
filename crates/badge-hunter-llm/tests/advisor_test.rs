use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use futures::future::AbortHandle;
use futures::StreamExt;

use badge_hunter_llm::{
    AdviceMode, AdviceOutcome, BadgeAdvisor, ChatClient, ChatRequest, ChatResponse, EventStream,
    StreamEvent, ERROR_NOTICE,
};
use badge_hunter_types::Conversation;

/// Step of a scripted provider stream
#[derive(Clone)]
enum Step {
    Text(&'static str),
    Thought(&'static str),
    Fail(&'static str),
    Hang,
}

/// Replays a fixed script, yielding to the scheduler between steps
struct ScriptedClient {
    steps: Vec<Step>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        anyhow::bail!("non-streaming chat is not scripted")
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        self.requests.lock().unwrap().push(request);
        let steps = self.steps.clone();

        Ok(Box::pin(async_stream::stream! {
            for step in steps {
                tokio::task::yield_now().await;
                match step {
                    Step::Text(text) => yield Ok(StreamEvent::Message { content: text.to_string() }),
                    Step::Thought(text) => yield Ok(StreamEvent::Reasoning { content: text.to_string() }),
                    Step::Fail(reason) => yield Err(anyhow::anyhow!(reason)),
                    Step::Hang => futures::future::pending::<()>().await,
                }
            }
            yield Ok(StreamEvent::Done { finish_reason: Some("STOP".to_string()) });
        }))
    }
}

struct FailingSetupClient;

#[async_trait]
impl ChatClient for FailingSetupClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        anyhow::bail!("connection refused")
    }

    async fn chat_stream(&self, _request: ChatRequest) -> Result<EventStream> {
        anyhow::bail!("connection refused")
    }
}

#[tokio::test]
async fn test_chunks_forwarded_in_order_then_notice_on_error() {
    let client = ScriptedClient::new(vec![Step::Text("Hel"), Step::Text("lo!"), Step::Fail("reset by peer")]);
    let advisor = BadgeAdvisor::new(client);

    let mut chunks: Vec<String> = Vec::new();
    let outcome = advisor
        .stream_advice("How do I earn Starstruck?", AdviceMode::Fast, |c| chunks.push(c.to_string()))
        .await;

    assert_eq!(outcome, AdviceOutcome::Failed);
    assert_eq!(chunks, vec!["Hel".to_string(), "lo!".to_string(), ERROR_NOTICE.to_string()]);
    assert_eq!(chunks.concat(), format!("Hello!{}", ERROR_NOTICE));
}

#[tokio::test]
async fn test_completed_stream_has_no_notice() {
    let client = ScriptedClient::new(vec![Step::Text("Open "), Step::Text("PRs.")]);
    let advisor = BadgeAdvisor::new(client);

    let mut text = String::new();
    let outcome = advisor
        .stream_advice("Pull Shark?", AdviceMode::Fast, |c| text.push_str(c))
        .await;

    assert_eq!(outcome, AdviceOutcome::Completed);
    assert_eq!(text, "Open PRs.");
}

#[tokio::test]
async fn test_setup_error_yields_exactly_one_notice() {
    let advisor = BadgeAdvisor::new(Arc::new(FailingSetupClient));

    let mut chunks: Vec<String> = Vec::new();
    let outcome = advisor
        .stream_advice("anything", AdviceMode::Deep, |c| chunks.push(c.to_string()))
        .await;

    assert_eq!(outcome, AdviceOutcome::Failed);
    assert_eq!(chunks, vec![ERROR_NOTICE.to_string()]);
}

#[tokio::test]
async fn test_reasoning_fragments_not_forwarded() {
    let client = ScriptedClient::new(vec![Step::Thought("weighing options"), Step::Text("Answer")]);
    let advisor = BadgeAdvisor::new(client);

    let mut chunks: Vec<String> = Vec::new();
    advisor
        .stream_advice("strategy", AdviceMode::Deep, |c| chunks.push(c.to_string()))
        .await;

    assert_eq!(chunks, vec!["Answer".to_string()]);
}

#[tokio::test]
async fn test_deep_mode_selects_deep_model() {
    let client = ScriptedClient::new(vec![Step::Text("ok")]);
    let advisor = BadgeAdvisor::new(client.clone());

    advisor.stream_advice("q", AdviceMode::Deep, |_| {}).await;
    advisor.stream_advice("q", AdviceMode::Fast, |_| {}).await;

    let requests = client.requests.lock().unwrap();
    assert_eq!(requests[0].model, "gemini-3-pro-preview");
    assert_eq!(requests[0].options.thinking_budget, Some(32768));
    assert_eq!(requests[1].model, "gemini-2.5-flash-lite");
    assert_eq!(requests[1].options.thinking_budget, None);
}

#[tokio::test]
async fn test_abort_stops_stream_without_notice() {
    let client = ScriptedClient::new(vec![Step::Text("partial"), Step::Hang, Step::Text("never")]);
    let advisor = BadgeAdvisor::new(client);
    let (abort_handle, registration) = AbortHandle::new_pair();

    let mut chunks: Vec<String> = Vec::new();
    let outcome = advisor
        .stream_advice_abortable("q", AdviceMode::Fast, registration, |c| {
            chunks.push(c.to_string());
            abort_handle.abort();
        })
        .await;

    assert_eq!(outcome, AdviceOutcome::Cancelled);
    assert_eq!(chunks, vec!["partial".to_string()]);
}

#[tokio::test]
async fn test_ask_streams_into_reserved_message() {
    let client = ScriptedClient::new(vec![Step::Text("Hel"), Step::Text("lo!"), Step::Fail("boom")]);
    let advisor = BadgeAdvisor::new(client);
    let conversation = Mutex::new(Conversation::with_greeting());

    let (handle, outcome) = advisor
        .ask(&conversation, "  Why no Pull Shark?  ", AdviceMode::Deep)
        .await
        .unwrap();

    let transcript = conversation.lock().unwrap();
    assert_eq!(outcome, AdviceOutcome::Failed);
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript.messages()[1].text, "Why no Pull Shark?");

    let reply = transcript.get(handle).unwrap();
    assert_eq!(reply.text, format!("Hello!{}", ERROR_NOTICE));
    assert!(!reply.pending);
}

#[tokio::test]
async fn test_ask_with_empty_reply_settles_pending_slot() {
    let advisor = BadgeAdvisor::new(ScriptedClient::new(vec![]));
    let conversation = Mutex::new(Conversation::new());

    let (handle, outcome) = advisor.ask(&conversation, "hi", AdviceMode::Deep).await.unwrap();

    let transcript = conversation.lock().unwrap();
    assert_eq!(outcome, AdviceOutcome::Completed);
    assert!(!transcript.get(handle).unwrap().pending);
}

#[tokio::test]
async fn test_ask_ignores_blank_prompt() {
    let advisor = BadgeAdvisor::new(ScriptedClient::new(vec![Step::Text("unused")]));
    let conversation = Mutex::new(Conversation::with_greeting());

    assert!(advisor.ask(&conversation, "   ", AdviceMode::Fast).await.is_none());
    assert_eq!(conversation.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_interleaved_asks_write_to_their_own_messages() {
    let first = BadgeAdvisor::new(ScriptedClient::new(vec![Step::Text("A1"), Step::Text("A2"), Step::Text("A3")]));
    let second = BadgeAdvisor::new(ScriptedClient::new(vec![Step::Text("B1"), Step::Text("B2")]));
    let conversation = Mutex::new(Conversation::new());

    let (a, b) = tokio::join!(
        first.ask(&conversation, "first", AdviceMode::Fast),
        second.ask(&conversation, "second", AdviceMode::Fast),
    );
    let (a, _) = a.unwrap();
    let (b, _) = b.unwrap();

    let transcript = conversation.lock().unwrap();
    assert_ne!(a, b);
    assert_eq!(transcript.get(a).unwrap().text, "A1A2A3");
    assert_eq!(transcript.get(b).unwrap().text, "B1B2");
    assert_eq!(transcript.len(), 4);
}

#[tokio::test]
async fn test_scripted_stream_ends_with_done() {
    let client = ScriptedClient::new(vec![Step::Text("x")]);
    let request = ChatRequest::new("m", vec![]);

    let events: Vec<_> = client.chat_stream(request).await.unwrap().collect().await;
    assert!(matches!(events.last(), Some(Ok(StreamEvent::Done { .. }))));
}
