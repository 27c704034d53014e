/// clangd client speaking JSON-RPC 2.0 with LSP `Content-Length` framing.
///
/// Only the handful of calls the chunker needs are implemented:
/// `initialize`, `textDocument/didOpen`, `textDocument/documentSymbol`,
/// `textDocument/didClose`, `shutdown` and `exit`.
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{ProviderError, SymbolProvider};
use crate::indexer::languages::LanguageConfig;
use crate::model::SymbolNode;

/// Largest message body accepted from the server.
const MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

/// How the clangd process is launched and how long each phase may take.
#[derive(Debug, Clone)]
pub struct LspOptions {
    pub clangd_path: String,
    pub compile_commands_dir: PathBuf,
    pub root: PathBuf,
    pub background_index: bool,
    /// `languageId` for files whose extension is not in the language table.
    pub language_id: String,
    pub initialize_timeout: Duration,
    pub request_timeout: Duration,
    pub shutdown_timeout: Duration,
}

impl Default for LspOptions {
    fn default() -> Self {
        Self {
            clangd_path: "clangd".to_string(),
            compile_commands_dir: PathBuf::from("."),
            root: PathBuf::from("."),
            background_index: true,
            language_id: "cpp".to_string(),
            initialize_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

// ── Framing ──────────────────────────────────────────────────────────

/// Writes one framed JSON-RPC message.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &Value,
) -> Result<(), ProviderError> {
    let body = serde_json::to_vec(message)
        .map_err(|e| ProviderError::Protocol(format!("failed to encode message: {e}")))?;
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one framed JSON-RPC message. EOF before a full message is `Closed`.
pub async fn read_message<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Result<Value, ProviderError> {
    let mut content_length = None;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Err(ProviderError::Closed);
        }
        let header = line.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                let len = value.trim().parse::<usize>().map_err(|e| {
                    ProviderError::Protocol(format!("invalid Content-Length {value:?}: {e}"))
                })?;
                content_length = Some(len);
            }
        }
    }

    let len = content_length
        .ok_or_else(|| ProviderError::Protocol("missing Content-Length header".to_string()))?;
    if len > MAX_MESSAGE_BYTES {
        return Err(ProviderError::Protocol(format!(
            "Content-Length {len} exceeds maximum supported message size {MAX_MESSAGE_BYTES}"
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProviderError::Closed
        } else {
            ProviderError::Io(e)
        }
    })?;

    serde_json::from_slice(&body)
        .map_err(|e| ProviderError::Protocol(format!("invalid JSON body: {e}")))
}

// ── Connection ───────────────────────────────────────────────────────

/// Request/response correlation over a framed byte stream.
///
/// Incoming messages are decoded on a background task so that an abandoned
/// (timed-out) request never leaves a half-read frame behind.
pub struct Connection<W> {
    writer: W,
    incoming: mpsc::Receiver<Result<Value, ProviderError>>,
    reader_task: JoinHandle<()>,
    next_id: i64,
}

impl<W: AsyncWrite + Unpin> Connection<W> {
    pub fn new<R>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, incoming) = mpsc::channel(64);
        let reader_task = tokio::spawn(read_loop(BufReader::new(reader), tx));
        Self {
            writer,
            incoming,
            reader_task,
            next_id: 0,
        }
    }

    pub async fn notify(&mut self, method: &str, params: Value) -> Result<(), ProviderError> {
        let message = json!({ "jsonrpc": "2.0", "method": method, "params": params });
        write_message(&mut self.writer, &message).await
    }

    /// Sends a request and waits for its response.
    ///
    /// Notifications received meanwhile are dropped; server→client requests
    /// are answered with a `null` result.
    pub async fn request(&mut self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.next_id += 1;
        let id = self.next_id;
        let message = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        write_message(&mut self.writer, &message).await?;

        loop {
            let msg = match self.incoming.recv().await {
                Some(msg) => msg?,
                None => return Err(ProviderError::Closed),
            };

            if let Some(server_method) = msg.get("method").and_then(Value::as_str) {
                match msg.get("id") {
                    Some(server_id) => {
                        debug!("answering server request {server_method}");
                        let reply = json!({ "jsonrpc": "2.0", "id": server_id, "result": null });
                        write_message(&mut self.writer, &reply).await?;
                    }
                    None => debug!("ignoring notification {server_method}"),
                }
                continue;
            }

            if msg.get("id").and_then(Value::as_i64) != Some(id) {
                debug!("dropping stale response {:?}", msg.get("id"));
                continue;
            }

            if let Some(error) = msg.get("error") {
                return Err(ProviderError::Server {
                    code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                    message: error
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                });
            }

            return Ok(msg.get("result").cloned().unwrap_or(Value::Null));
        }
    }
}

impl<W> Drop for Connection<W> {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

async fn read_loop<R: AsyncBufRead + Unpin>(
    mut reader: R,
    tx: mpsc::Sender<Result<Value, ProviderError>>,
) {
    loop {
        let msg = read_message(&mut reader).await;
        let done = msg.is_err();
        if tx.send(msg).await.is_err() || done {
            break;
        }
    }
}

async fn with_timeout<T>(
    method: &str,
    limit: Duration,
    fut: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, ProviderError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ProviderError::Timeout {
            method: method.to_string(),
            secs: limit.as_secs(),
        })?
}

// ── clangd client ────────────────────────────────────────────────────

/// A running clangd process with an initialized LSP session.
pub struct LspClient {
    conn: Connection<ChildStdin>,
    child: Child,
    opts: LspOptions,
}

impl LspClient {
    /// Spawns clangd and performs the `initialize` handshake.
    pub async fn start(opts: LspOptions) -> Result<Self, ProviderError> {
        let mut cmd = Command::new(&opts.clangd_path);
        cmd.arg(format!(
            "--compile-commands-dir={}",
            opts.compile_commands_dir.display()
        ))
        .arg("--log=error");
        if opts.background_index {
            cmd.arg("--background-index");
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| ProviderError::Spawn {
            command: opts.clangd_path.clone(),
            source,
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ProviderError::Protocol("clangd stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProviderError::Protocol("clangd stdout unavailable".to_string()))?;

        let mut client = Self {
            conn: Connection::new(stdout, stdin),
            child,
            opts,
        };
        client.initialize().await?;
        info!("clangd connection established");
        Ok(client)
    }

    async fn initialize(&mut self) -> Result<(), ProviderError> {
        let root = std::path::absolute(&self.opts.root)?;
        let params = json!({
            "processId": std::process::id(),
            "rootUri": file_uri(&root),
            "capabilities": {
                "textDocument": {
                    "documentSymbol": {
                        "hierarchicalDocumentSymbolSupport": true
                    }
                }
            }
        });

        let conn = &mut self.conn;
        with_timeout("initialize", self.opts.initialize_timeout, async {
            conn.request("initialize", params).await?;
            conn.notify("initialized", json!({})).await
        })
        .await
    }

    /// Sends `shutdown` + `exit` and reaps the process.
    pub async fn shutdown(mut self) -> Result<(), ProviderError> {
        let limit = self.opts.shutdown_timeout;
        let conn = &mut self.conn;
        let polite = with_timeout("shutdown", limit, async {
            conn.request("shutdown", Value::Null).await?;
            conn.notify("exit", Value::Null).await
        })
        .await;
        if let Err(e) = polite {
            debug!("clangd shutdown incomplete: {e}");
        }

        match tokio::time::timeout(limit, self.child.wait()).await {
            Ok(status) => {
                debug!("clangd exited: {:?}", status?);
            }
            Err(_) => {
                debug!("clangd did not exit in time, killing");
                self.child.kill().await?;
            }
        }
        Ok(())
    }

    fn language_id(&self, path: &Path) -> String {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(LanguageConfig::get_by_extension)
            .map(|c| c.language_id.to_string())
            .unwrap_or_else(|| self.opts.language_id.clone())
    }
}

impl SymbolProvider for LspClient {
    async fn document_symbols(&mut self, path: &Path) -> Result<Vec<SymbolNode>, ProviderError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ProviderError::ReadSource {
                path: path.to_path_buf(),
                source,
            })?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let uri = file_uri(&std::path::absolute(path)?);
        let language_id = self.language_id(path);

        self.conn
            .notify(
                "textDocument/didOpen",
                json!({
                    "textDocument": {
                        "uri": uri,
                        "languageId": language_id,
                        "version": 1,
                        "text": text
                    }
                }),
            )
            .await?;

        let conn = &mut self.conn;
        let result = with_timeout(
            "textDocument/documentSymbol",
            self.opts.request_timeout,
            conn.request(
                "textDocument/documentSymbol",
                json!({ "textDocument": { "uri": uri } }),
            ),
        )
        .await;

        if let Err(e) = self
            .conn
            .notify("textDocument/didClose", json!({ "textDocument": { "uri": uri } }))
            .await
        {
            debug!("didClose failed for {}: {e}", path.display());
        }

        match result? {
            Value::Null => Ok(Vec::new()),
            value => serde_json::from_value(value).map_err(|e| {
                ProviderError::Protocol(format!("unexpected documentSymbol result: {e}"))
            }),
        }
    }
}

/// `file://` URI for an absolute path, percent-encoding reserved bytes.
pub fn file_uri(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut uri = String::from("file://");
    if !raw.starts_with('/') {
        uri.push('/');
    }
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' | b':' => {
                uri.push(byte as char)
            }
            other => uri.push_str(&format!("%{other:02X}")),
        }
    }
    uri
}
