//! Interactive clarification answers read line by line.

use async_trait::async_trait;
use coordination::ClarificationResponder;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stderr};
use tokio::sync::Mutex;
use tracing::warn;

/// Asks each question on `output` and reads one answer line from `input`.
///
/// An empty line (or end of input) leaves the question unanswered.
pub struct LineResponder<R, W> {
    io: Mutex<(Lines<R>, W)>,
}

impl<R, W> LineResponder<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new((input.lines(), output)),
        }
    }
}

pub type StdinResponder = LineResponder<BufReader<Stdin>, Stderr>;

impl StdinResponder {
    pub fn stdio() -> Self {
        LineResponder::new(BufReader::new(tokio::io::stdin()), tokio::io::stderr())
    }
}

#[async_trait]
impl<R, W> ClarificationResponder for LineResponder<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn answer(&self, agent_id: &str, role: &str, question: &str) -> String {
        let mut io = self.io.lock().await;
        let (lines, output) = &mut *io;

        let prompt = format!("\n[{} / {}] {}\n> ", role, agent_id, question);
        if let Err(e) = output.write_all(prompt.as_bytes()).await {
            warn!(error = %e, "failed to write clarification prompt");
        }
        if let Err(e) = output.flush().await {
            warn!(error = %e, "failed to flush clarification prompt");
        }

        match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => String::new(),
            Err(e) => {
                warn!(agent_id, error = %e, "failed to read clarification answer");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_one_line_per_question() {
        let input: &[u8] = b"50ms p99\n\nunused?\n";
        let responder = LineResponder::new(input, Vec::new());

        assert_eq!(responder.answer("a1", "performance", "Latency target?").await, "50ms p99");
        assert_eq!(responder.answer("a1", "performance", "Budget?").await, "");

        let io = responder.io.lock().await;
        let written = String::from_utf8(io.1.clone()).unwrap();
        assert!(written.contains("[performance / a1] Latency target?"));
        assert!(written.contains("Budget?"));
    }

    /// Accepts writes but fails every flush.
    struct UnflushableOutput;

    impl AsyncWrite for UnflushableOutput {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "closed",
            )))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_flush_failure_still_reads_answer() {
        let input: &[u8] = b"eventual consistency\n";
        let responder = LineResponder::new(input, UnflushableOutput);
        assert_eq!(
            responder.answer("a1", "architect", "Consistency model?").await,
            "eventual consistency"
        );
    }

    #[tokio::test]
    async fn test_end_of_input_answers_empty() {
        let input: &[u8] = b"";
        let responder = LineResponder::new(input, tokio::io::sink());
        assert_eq!(responder.answer("a1", "kiss", "Anything?").await, "");
    }
}
