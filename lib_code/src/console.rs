use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::{encode_request, is_exit, trim_line_ending, Error, Session, PROMPT};

/// Reads operator lines from `input` and exchanges each one over `session`
/// until the exit text or the end of input. Returns the number of exchanges.
pub async fn run_console<S, R, W>(
    session: &mut Session<S>,
    input: &mut R,
    output: &mut W,
    newline: bool,
) -> Result<usize, Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    let mut exchanged = 0;

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            info!("operator input closed");
            break;
        }

        let text = trim_line_ending(&line);
        if is_exit(text) {
            info!("exit requested after {} exchanges", exchanged);
            break;
        }

        // echo shows the text as typed, before non-ASCII is dropped
        let mut shown = text.to_string();
        if newline {
            output.write_all(b"add new line\n").await?;
            shown.push('\n');
        }
        output.write_all(format!("Processing Message *****{:?}*****\n", shown).as_bytes()).await?;

        let request = encode_request(text, newline);
        debug!("encoded {} of {} bytes", request.len(), shown.len());
        output.flush().await?;

        let response = session.exchange(&request).await?;
        output.write_all(format!("Received           *****{:?}*****\n", response).as_bytes()).await?;
        output.flush().await?;

        exchanged += 1;
    }

    Ok(exchanged)
}
