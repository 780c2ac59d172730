use anyhow::Result;
use futures::{Stream, StreamExt};
use std::fmt::Display;

use super::buffering::CircularLineBuffer;
use crate::streaming::{EventStream, StreamEvent};

/// Strategy pattern for parsing different SSE payload types
pub trait SseLineParser: Send + Sync {
    /// Parse a data line into stream events
    fn parse_data_line(&self, data: &str) -> Result<Vec<StreamEvent>>;

    /// Check if this line signals end of stream
    fn is_done_marker(&self, data: &str) -> bool {
        data == "[DONE]"
    }
}

/// Generic SSE stream parser over any byte-chunk stream.
///
/// Only `data:` lines are interpreted; comments, `event:` and `id:` lines are
/// skipped. A done marker or a transport error ends the stream.
pub fn parse_sse_stream<S, B, E, P>(bytes: S, parser: P) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
    P: SseLineParser + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(bytes);
        let mut buffer = CircularLineBuffer::with_capacity(4096);

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());

                    while let Some(line_result) = buffer.next_line() {
                        match line_result {
                            Ok(line) => {
                                if let Some(data) = data_payload(&line) {
                                    if parser.is_done_marker(data) {
                                        yield Ok(StreamEvent::Done { finish_reason: None });
                                        return;
                                    }

                                    match parser.parse_data_line(data) {
                                        Ok(events) => {
                                            for event in events {
                                                yield Ok(event);
                                            }
                                        }
                                        Err(e) => yield Err(e),
                                    }
                                }
                            }
                            Err(e) => yield Err(e),
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    return;
                }
            }
        }

        // Source closed; a final event may lack its trailing newline
        match buffer.take_remainder() {
            Some(Ok(line)) => {
                if let Some(data) = data_payload(&line) {
                    if !parser.is_done_marker(data) {
                        match parser.parse_data_line(data) {
                            Ok(events) => {
                                for event in events {
                                    yield Ok(event);
                                }
                            }
                            Err(e) => yield Err(e),
                        }
                    }
                }
            }
            Some(Err(e)) => yield Err(e),
            None => {}
        }
    })
}

fn data_payload(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoParser;

    impl SseLineParser for EchoParser {
        fn parse_data_line(&self, data: &str) -> Result<Vec<StreamEvent>> {
            if data == "bad" {
                anyhow::bail!("bad line");
            }
            Ok(vec![StreamEvent::Message {
                content: data.to_string(),
            }])
        }
    }

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = std::result::Result<&'static [u8], String>> {
        let items: Vec<_> = parts.iter().copied().map(|p| Ok::<_, String>(p.as_bytes())).collect();
        futures::stream::iter(items)
    }

    async fn messages(stream: EventStream) -> Vec<String> {
        stream
            .filter_map(|e| async move {
                match e {
                    Ok(StreamEvent::Message { content }) => Some(content),
                    _ => None,
                }
            })
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_events_split_across_chunks() {
        let stream = parse_sse_stream(chunks(&["data: Hel", "lo\n\nda", "ta:world\n\n"]), EchoParser);
        assert_eq!(messages(stream).await, vec!["Hello", "world"]);
    }

    #[tokio::test]
    async fn test_non_data_lines_ignored() {
        let stream = parse_sse_stream(
            chunks(&[": keep-alive\n", "event: message\n", "id: 7\n", "data: x\n\n"]),
            EchoParser,
        );
        assert_eq!(messages(stream).await, vec!["x"]);
    }

    #[tokio::test]
    async fn test_done_marker_stops_stream() {
        let stream = parse_sse_stream(chunks(&["data: a\n", "data: [DONE]\n", "data: b\n"]), EchoParser);
        let events: Vec<_> = stream.collect().await;

        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Ok(StreamEvent::Done { finish_reason: None })));
    }

    #[tokio::test]
    async fn test_unterminated_final_line_is_flushed() {
        let stream = parse_sse_stream(chunks(&["data: a\n", "data: tail"]), EchoParser);
        assert_eq!(messages(stream).await, vec!["a", "tail"]);
    }

    #[tokio::test]
    async fn test_undecodable_final_line_is_an_error() {
        let source = futures::stream::iter(vec![
            Ok::<&'static [u8], String>(b"data: a\n".as_slice()),
            Ok(b"data: \xff\xfe".as_slice()),
        ]);
        let events: Vec<_> = parse_sse_stream(source, EchoParser).collect().await;

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Ok(StreamEvent::Message { content }) if content == "a"));
        assert!(events[1].is_err());
    }

    #[tokio::test]
    async fn test_parse_error_is_yielded() {
        let stream = parse_sse_stream(chunks(&["data: bad\n", "data: ok\n"]), EchoParser);
        let events: Vec<_> = stream.collect().await;

        assert!(events[0].is_err());
        assert!(matches!(&events[1], Ok(StreamEvent::Message { content }) if content == "ok"));
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let source = futures::stream::iter(vec![
            Ok::<&'static [u8], String>(b"data: a\n".as_slice()),
            Err("connection reset".to_string()),
            Ok(b"data: b\n".as_slice()),
        ]);
        let events: Vec<_> = parse_sse_stream(source, EchoParser).collect().await;

        assert_eq!(events.len(), 2);
        assert!(events[1].as_ref().unwrap_err().to_string().contains("connection reset"));
    }
}
