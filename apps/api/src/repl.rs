//! Interactive prompt loop: chat with the model until the user types `exit`.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::warn;

use crate::llm_client::{reply_text, ChatCompletion, Message};

const SYSTEM_PROMPT: &str = "You are Job Pitch AI, an assistant that helps job seekers \
    write pitches, reach out to hiring companies and book demo appointments. \
    Keep answers short and practical.";

const EXIT_COMMAND: &str = "exit";

/// Reads lines from `input` and answers each on `output`.
///
/// The conversation keeps every successful exchange. A failed chat call is
/// reported inline and its user turn is dropped so it is not resent.
pub async fn run<R, W>(llm: &dyn ChatCompletion, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut conversation = vec![Message::system(SYSTEM_PROMPT)];
    let mut lines = input.lines();

    loop {
        output.write_all(b"You: ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line == EXIT_COMMAND {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        conversation.push(Message::user(line));
        let result = llm.chat(&conversation).await;
        match &result {
            Ok(reply) => conversation.push(Message::assistant(reply.clone())),
            Err(e) => {
                warn!("Chat turn failed: {e}");
                conversation.pop();
            }
        }

        let reply = reply_text(result);
        output.write_all(format!("AI: {reply}\n").as_bytes()).await?;
    }

    output.flush().await?;
    Ok(())
}
