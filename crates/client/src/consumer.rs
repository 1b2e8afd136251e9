//! Paced consumption of the relay's byte stream.

use std::time::Duration;

use futures_util::{Stream, StreamExt};
use proto::StreamError;
use tokio::sync::mpsc;

use crate::decode::StreamDecoder;
use crate::session::StreamSession;

/// Characters revealed per pacing step.
pub const SLICE_CHARS: usize = 2;

/// Delay between pacing steps.
pub const SLICE_DELAY: Duration = Duration::from_millis(10);

/// Updates emitted while a stream is consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A paced slice of newly revealed assistant text.
    Delta(String),
    /// The stream finished (exhausted or stopped by the user).
    Done,
    /// The stream failed for a reason other than a user stop.
    Failed(String),
}

/// Reads the byte stream to exhaustion, decoding and revealing text in
/// paced slices.
///
/// The decode buffer is drained in slices of at most [`SLICE_CHARS`]
/// characters with [`SLICE_DELAY`] between steps, so display pacing is
/// independent of network chunking. The session's stop flag is checked
/// between chunks and between slices; a stop discards whatever is still
/// buffered and returns `Ok`.
pub async fn consume<S, B, E>(
    mut stream: S,
    session: &StreamSession,
    updates: &mpsc::UnboundedSender<StreamEvent>,
) -> Result<(), StreamError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut decoder = StreamDecoder::new();
    let mut buffer = String::new();

    while let Some(chunk) = stream.next().await {
        if session.stop_requested() {
            return Ok(());
        }
        let chunk = chunk.map_err(|e| StreamError::Read(e.to_string()))?;
        buffer.push_str(&decoder.push(chunk.as_ref()));

        while !buffer.is_empty() {
            if session.stop_requested() {
                return Ok(());
            }
            let cut = slice_boundary(&buffer, SLICE_CHARS);
            let slice: String = buffer.drain(..cut).collect();
            if updates.send(StreamEvent::Delta(slice)).is_err() {
                // Receiver is gone; nothing left to display.
                return Ok(());
            }
            tokio::time::sleep(SLICE_DELAY).await;
        }
    }

    Ok(())
}

/// Byte offset of the boundary after at most `chars` characters.
fn slice_boundary(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::convert::Infallible;

    fn byte_stream(
        chunks: Vec<&'static [u8]>,
    ) -> impl Stream<Item = Result<Bytes, Infallible>> + Unpin {
        futures_util::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::from_static(c)))
                .collect::<Vec<_>>(),
        )
    }

    async fn drain_deltas(mut rx: mpsc::UnboundedReceiver<StreamEvent>) -> Vec<String> {
        let mut deltas = Vec::new();
        while let Some(event) = rx.recv().await {
            if let StreamEvent::Delta(text) = event {
                deltas.push(text);
            }
        }
        deltas
    }

    #[test]
    fn slice_boundary_respects_char_boundaries() {
        assert_eq!(slice_boundary("abcd", 2), 2);
        assert_eq!(slice_boundary("a", 2), 1);
        assert_eq!(slice_boundary("", 2), 0);
        // "éé" is 4 bytes, 2 chars.
        assert_eq!(slice_boundary("ééx", 2), 4);
    }

    #[tokio::test]
    async fn deltas_concatenate_to_full_text_in_small_slices() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (session, _registration) = StreamSession::new();

        let stream = byte_stream(vec![b"He", b"llo, ", b"w\xC3\xB6", b"rld"]);
        consume(stream, &session, &tx).await.expect("consume");
        drop(tx);

        let deltas = drain_deltas(rx).await;
        assert_eq!(deltas.concat(), "Hello, wörld");
        assert!(deltas.iter().all(|d| d.chars().count() <= SLICE_CHARS));
    }

    #[tokio::test]
    async fn multibyte_char_split_across_chunks_decodes_once() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (session, _registration) = StreamSession::new();

        // "é" split across two network chunks.
        let stream = byte_stream(vec![b"\xC3", b"\xA9"]);
        consume(stream, &session, &tx).await.expect("consume");
        drop(tx);

        let deltas = drain_deltas(rx).await;
        assert_eq!(deltas.concat(), "é");
    }

    #[tokio::test]
    async fn stop_before_first_chunk_emits_nothing() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (session, _registration) = StreamSession::new();
        session.stop();

        let stream = byte_stream(vec![b"never shown"]);
        consume(stream, &session, &tx).await.expect("consume");
        drop(tx);

        assert!(drain_deltas(rx).await.is_empty());
    }

    #[tokio::test]
    async fn stop_mid_stream_discards_remaining_buffered_text() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (session, _registration) = StreamSession::new();
        let task_session = session.clone();

        let handle = tokio::spawn(async move {
            let stream = byte_stream(vec![b"abcdefghij"]);
            consume(stream, &task_session, &tx).await
        });

        let first = rx.recv().await.expect("first delta");
        let StreamEvent::Delta(first) = first else {
            panic!("expected delta");
        };
        session.stop();
        handle.await.expect("join").expect("consume");

        let mut shown = first;
        while let Some(StreamEvent::Delta(text)) = rx.recv().await {
            shown.push_str(&text);
        }
        assert!("abcdefghij".starts_with(&shown));
        assert!(shown.len() < 10, "stop must discard undisplayed text");
    }

    #[tokio::test]
    async fn read_error_is_reported() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let (session, _registration) = StreamSession::new();

        let stream = futures_util::stream::iter(vec![
            Ok(Bytes::from_static(b"4")),
            Err("connection reset"),
        ]);
        let err = consume(stream, &session, &tx)
            .await
            .expect_err("read error");
        assert!(matches!(err, StreamError::Read(_)));
    }
}
