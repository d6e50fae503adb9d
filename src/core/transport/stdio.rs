//! STDIO transport implementation.
//!
//! One request envelope per line on stdin, one response envelope per line on
//! stdout. The loop is sequential and single-threaded; end-of-input ends the
//! serving loop gracefully. All logging goes to stderr, keeping stdout clean
//! for the protocol.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::info;

use super::TransportResult;
use crate::core::rpc::Response;
use crate::core::server::ToolServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the STDIO transport until stdin closes.
    pub async fn run(server: ToolServer) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        let mut stdout = BufWriter::new(tokio::io::stdout());

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let response = server.handle_payload(&line);
            let encoded = encode_line(&response)?;

            stdout.write_all(encoded.as_bytes()).await?;
            stdout.flush().await?;
        }

        info!("stdin closed, STDIO transport finished");
        Ok(())
    }
}

/// Serialize a response as a single newline-terminated line.
fn encode_line(response: &Response) -> TransportResult<String> {
    let mut json = serde_json::to_string(response)?;
    json.push('\n');
    Ok(json)
}
