/// MCP Server Implementation
///
/// This module contains:
/// - The `Dispatcher`, which routes JSON-RPC requests to MCP method handlers
///   and is shared by both transports
/// - HTTP server setup with Actix Web
/// - STDIO server implementation for line-based communication

use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer,
    error::{InternalError, JsonPayloadError},
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc;

use crate::core::config::ServerConfig;
use crate::core::error::DispatchError;
use crate::core::protocol::{
    CallToolResult, JSONRPC_VERSION, MCPError, MCPRequest, MCPResponse, PROTOCOL_VERSION,
};
use crate::core::registry::{Tool, ToolRegistry};

/// Server metadata reported in initialize responses.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Server name reported in `serverInfo` and the health check
    pub server_name: String,
    /// Server version reported in `serverInfo` (SERVER_VERSION or crate version)
    pub server_version: String,
}

/// Routes MCP requests to their handlers.
///
/// Holds no per-call state; the request counter is the only thing mutated.
pub struct Dispatcher {
    state: AppState,
    registry: ToolRegistry,
    requests: AtomicU64,
}

impl Dispatcher {
    pub fn new(state: AppState, registry: ToolRegistry) -> Self {
        Self {
            state,
            registry,
            requests: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn requests_total(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Handle one JSON-RPC message. Notifications produce no response.
    pub async fn handle(&self, req: MCPRequest) -> Option<MCPResponse> {
        self.requests.fetch_add(1, Ordering::Relaxed);

        if req.is_notification() {
            tracing::debug!(method = %req.method, "notification received");
            return None;
        }

        if req.jsonrpc != JSONRPC_VERSION {
            return Some(MCPResponse::error(
                req.id,
                MCPError::invalid_request(format!("Unsupported jsonrpc version: {}", req.jsonrpc)),
            ));
        }

        let response = match req.method.as_str() {
            "initialize" => MCPResponse::success(req.id, self.initialize_result()),
            "ping" => MCPResponse::success(req.id, json!({})),
            "tools/list" => MCPResponse::success(req.id, self.tools_list_result()),
            "tools/call" => match self.handle_tools_call(req.params).await {
                Ok(result) => MCPResponse::success(req.id, json!(result)),
                Err(e) => {
                    tracing::debug!(error = %e, "tools/call rejected");
                    MCPResponse::error(req.id, e.to_rpc_error())
                }
            },
            _ => MCPResponse::error(
                req.id,
                MCPError::method_not_found(format!("Method not found: {}", req.method)),
            ),
        };
        Some(response)
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": self.state.server_name,
                "version": self.state.server_version
            }
        })
    }

    fn tools_list_result(&self) -> Value {
        json!({ "tools": self.registry.descriptors() })
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<CallToolResult, DispatchError> {
        let params = params.ok_or(DispatchError::MissingParams)?;
        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or(DispatchError::MissingParams)?;
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
        self.call_tool(name, arguments).await
    }

    /// Validate `arguments` against the named tool's schema, then run it.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, DispatchError> {
        let tool = self
            .registry
            .lookup(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        let args = tool
            .parameters()
            .validate(arguments)
            .map_err(|source| DispatchError::InvalidArguments {
                tool: tool.id(),
                source,
            })?;

        Ok(invoke(tool.as_ref(), args).await)
    }
}

/// Call boundary: handler errors become an in-band "Error: ..." text block.
async fn invoke(tool: &dyn Tool, args: crate::core::schema::Arguments) -> CallToolResult {
    tracing::debug!(tool = %tool.id(), "calling tool");
    let result = match tool.call(args).await {
        Ok(text) => CallToolResult::text(text),
        Err(e) => {
            tracing::warn!(tool = %tool.id(), error = %e, "tool call failed");
            CallToolResult::error(&e.to_string())
        }
    };
    let bytes: usize = result.content.iter().map(|c| c.as_text().len()).sum();
    tracing::debug!(tool = %tool.id(), bytes, is_error = result.is_error, "tool call finished");
    result
}

/// Health check endpoint handler.
///
/// # Arguments
/// * `dispatcher` - Shared dispatcher, used for the server name
///
/// # Returns
/// `{"status": "ok", "service": <server name>}` with 200 OK
async fn health(dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": dispatcher.state().server_name
    }))
}

/// MCP JSON-RPC endpoint. Notifications are acknowledged with 202 and no body.
///
/// # Arguments
/// * `dispatcher` - Shared dispatcher that handles the request
/// * `req` - Parsed JSON-RPC request body; malformed bodies never reach this
///   handler and are answered by `json_error_handler`
async fn mcp_handler(dispatcher: web::Data<Dispatcher>, req: web::Json<MCPRequest>) -> HttpResponse {
    match dispatcher.handle(req.into_inner()).await {
        Some(response) => HttpResponse::Ok().json(response),
        None => HttpResponse::Accepted().finish(),
    }
}

/// Metrics endpoint: total requests dispatched since start.
///
/// # Arguments
/// * `dispatcher` - Shared dispatcher holding the request counter
async fn metrics_handler(dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "requests_total": dispatcher.requests_total(),
        "status": "ok"
    }))
}

/// Server-Sent Events endpoint for tools discovery.
///
/// Sends a single event with the same tool list as tools/list plus a count.
///
/// # Arguments
/// * `dispatcher` - Shared dispatcher whose registry provides the tool list
async fn sse_tools_discovery(dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    use actix_web::http::header;

    let tools = dispatcher.registry().descriptors();
    let tools_data = json!({
        "count": tools.len(),
        "tools": tools
    });
    let sse_data = format!("data: {}\n\n", tools_data);

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(header::CacheControl(vec![
            header::CacheDirective::NoCache,
            header::CacheDirective::NoStore,
            header::CacheDirective::MustRevalidate,
        ]))
        // Disable nginx buffering
        .insert_header(("x-accel-buffering", "no"))
        .body(sse_data)
}

/// Malformed JSON bodies get a JSON-RPC parse error instead of a bare 400.
///
/// # Arguments
/// * `err` - Payload error raised by the `web::Json` extractor
/// * `_req` - The failed request (unused)
///
/// # Returns
/// A 400 response whose body is a `-32700` error with a null id
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = MCPResponse::error(None, MCPError::parse_error(&err));
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Register all HTTP routes. The `Dispatcher` must be provided as app data.
///
/// # Arguments
/// * `cfg` - Service config of the `App` being built; used by `run_server_http`
///   and by the HTTP tests
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics_handler))
        .route("/sse", web::get().to(sse_tools_discovery))
        .route("/mcp", web::post().to(mcp_handler))
        .route("/", web::post().to(mcp_handler))
        .route("/", web::get().to(health));
}

/// Run the MCP server in HTTP mode.
///
/// The server is configured with:
/// - Worker threads: CPU count (max 16) or WORKER_THREADS
/// - Max connections: 10,000 concurrent connections
/// - Connection rate limit: 1,000 connections per second
/// - Keep-alive and request timeout: 30 seconds
/// - Disconnect timeout: 2 seconds
/// - Shutdown timeout: 10 seconds
///
/// # Arguments
/// * `dispatcher` - Dispatcher shared by every worker
/// * `config` - Server configuration providing the bind address and worker count
///
/// # Returns
/// Returns when the server shuts down, or an error if binding fails
pub async fn run_server_http(dispatcher: Arc<Dispatcher>, config: &ServerConfig) -> std::io::Result<()> {
    let bind_addr = config.bind_addr();
    let workers = config.worker_count();
    let dispatcher = web::Data::from(dispatcher);

    tracing::info!(
        name = %dispatcher.state().server_name,
        version = %dispatcher.state().server_version,
        bind = %bind_addr,
        workers,
        "MCP server starting (HTTP mode)"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(dispatcher.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block")),
            )
            // %r = request line, %s = status, %D = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .configure(routes)
    })
    .workers(workers)
    .max_connections(10000)
    .max_connection_rate(1000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

/// Run the MCP server in STDIO mode.
///
/// All logging goes to stderr so stdout carries only JSON-RPC responses.
///
/// # Arguments
/// * `dispatcher` - Dispatcher handling each request read from stdin
///
/// # Returns
/// Returns when stdin closes and every pending response has been written
pub async fn run_server_stdio(dispatcher: Arc<Dispatcher>) -> std::io::Result<()> {
    tracing::info!(
        name = %dispatcher.state().server_name,
        version = %dispatcher.state().server_version,
        "MCP server starting (STDIO mode)"
    );

    let stdin = BufReader::with_capacity(8192, tokio::io::stdin());
    let stdout = BufWriter::with_capacity(8192, tokio::io::stdout());
    serve_lines(dispatcher, stdin, stdout).await
}

/// Serve newline-delimited JSON-RPC from `reader`, writing responses to `writer`.
///
/// Each request runs in its own task, so responses may be written in a
/// different order than requests arrived. A line that is not valid UTF-8 or
/// not a valid request gets a parse error and the loop keeps reading.
/// Returns once the input is exhausted and every queued response has been
/// written, even if reading failed part way.
///
/// # Arguments
/// * `dispatcher` - Shared dispatcher that handles each parsed request
/// * `reader` - Source of request lines (stdin in production)
/// * `writer` - Sink for response lines (stdout in production)
pub async fn serve_lines<R, W>(dispatcher: Arc<Dispatcher>, mut reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<MCPResponse>();

    let read_loop = async move {
        let mut buf = Vec::with_capacity(8192);
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            // Writer is gone, nobody will see further responses
            if tx.is_closed() {
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    tracing::warn!(error = %e, "request line is not valid UTF-8");
                    let _ = tx.send(MCPResponse::error(None, MCPError::parse_error(&e)));
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<MCPRequest>(line) {
                Ok(req) => {
                    let dispatcher = dispatcher.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        if let Some(response) = dispatcher.handle(req).await {
                            let _ = tx.send(response);
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to parse request");
                    // Reply with the request id if the line was at least valid JSON
                    let id = serde_json::from_str::<Value>(line)
                        .ok()
                        .and_then(|v| v.get("id").cloned());
                    let _ = tx.send(MCPResponse::error(id, MCPError::parse_error(&e)));
                }
            }
        }
        // Dropping the last sender lets the writer finish once spawned tasks are done
        drop(tx);
        Ok::<(), std::io::Error>(())
    };

    let write_loop = async move {
        while let Some(response) = rx.recv().await {
            let response_json = match serde_json::to_string(&response) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize response");
                    continue;
                }
            };
            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<(), std::io::Error>(())
    };

    // join, not try_join: a read error must not drop responses still queued
    let (read_result, write_result) = tokio::join!(read_loop, write_loop);
    if let Err(e) = &read_result {
        tracing::error!(error = %e, "failed to read from input");
    }
    read_result.and(write_result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ToolSettings;
    use crate::core::error::ToolError;
    use crate::core::protocol::ContentBlock;
    use crate::core::schema::{Arguments, ParameterSchema};
    use crate::tools::{ToolId, initialize_tools};
    use actix_web::test;
    use async_trait::async_trait;

    fn test_state() -> AppState {
        AppState {
            server_name: "test-server".to_string(),
            server_version: "0.0.7".to_string(),
        }
    }

    fn dispatcher() -> Dispatcher {
        let settings = ToolSettings::from_yaml("tools:\n  data-lookup:\n    delay_ms: 0\n").unwrap();
        let registry = initialize_tools(&settings, "0.0.7").unwrap();
        Dispatcher::new(test_state(), registry)
    }

    fn request(id: i64, method: &str, params: Value) -> MCPRequest {
        serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        }))
        .unwrap()
    }

    fn result_text(response: &MCPResponse) -> String {
        let result: CallToolResult =
            serde_json::from_value(response.result.clone().unwrap()).unwrap();
        result.content[0].as_text().to_string()
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = dispatcher().handle(request(1, "initialize", json!({}))).await.unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "test-server");
        assert_eq!(result["serverInfo"]["version"], "0.0.7");
        assert_eq!(response.id, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = dispatcher().handle(request(2, "tools/list", Value::Null)).await.unwrap();
        let tools = response.result.unwrap()["tools"].clone();
        let names: Vec<&str> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["data-lookup", "system-info"]);
        assert_eq!(tools[0]["inputSchema"]["properties"]["limit"]["maximum"], 100);
        assert_eq!(
            tools[1]["inputSchema"]["properties"]["info"]["enum"],
            json!(["date", "timezone", "version", "all"])
        );
    }

    #[tokio::test]
    async fn test_tools_call_data_lookup() {
        let response = dispatcher()
            .handle(request(
                3,
                "tools/call",
                json!({ "name": "data-lookup", "arguments": { "limit": 2, "filter": "sample" } }),
            ))
            .await
            .unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.result.as_ref().unwrap()["isError"], false);

        let payload: Value = serde_json::from_str(&result_text(&response)).unwrap();
        assert!(payload["items"].as_array().unwrap().len() <= 2);
        assert_eq!(payload["totalFound"], 2);
    }

    #[tokio::test]
    async fn test_tools_call_system_info_version() {
        let response = dispatcher()
            .handle(request(
                4,
                "tools/call",
                json!({ "name": "system-info", "arguments": { "info": "version" } }),
            ))
            .await
            .unwrap();
        assert_eq!(result_text(&response), "Server version: 0.0.7");
    }

    #[tokio::test]
    async fn test_invalid_arguments_rejected_before_handler() {
        let d = dispatcher();
        let response = d
            .handle(request(
                5,
                "tools/call",
                json!({ "name": "data-lookup", "arguments": { "limit": -1 } }),
            ))
            .await
            .unwrap();
        assert!(response.result.is_none());
        let error = response.error.unwrap();
        assert_eq!(error.code, MCPError::INVALID_PARAMS);
        assert!(error.message.contains("limit"));
    }

    #[tokio::test]
    async fn test_unknown_tool_and_method() {
        let d = dispatcher();
        let response = d
            .handle(request(6, "tools/call", json!({ "name": "echo" })))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, MCPError::METHOD_NOT_FOUND);

        let response = d.handle(request(7, "resources/list", json!({}))).await.unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, MCPError::METHOD_NOT_FOUND);
        assert_eq!(error.message, "Method not found: resources/list");
    }

    #[tokio::test]
    async fn test_tools_call_without_params() {
        let response = dispatcher().handle(request(8, "tools/call", Value::Null)).await.unwrap();
        assert_eq!(response.error.unwrap().code, MCPError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let d = dispatcher();
        let req: MCPRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(d.handle(req).await.is_none());
        assert_eq!(d.requests_total(), 1);
    }

    #[tokio::test]
    async fn test_null_id_still_answered() {
        let req: MCPRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        let response = dispatcher().handle(req).await.unwrap();
        assert_eq!(response.id, Some(Value::Null));
        assert_eq!(response.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let req: MCPRequest = serde_json::from_value(json!({
            "jsonrpc": "1.0",
            "id": 9,
            "method": "ping"
        }))
        .unwrap();
        let response = dispatcher().handle(req).await.unwrap();
        assert_eq!(response.error.unwrap().code, MCPError::INVALID_REQUEST);
    }

    struct Failing(&'static str);

    #[async_trait]
    impl Tool for Failing {
        fn id(&self) -> ToolId {
            ToolId::SystemInfo
        }

        fn description(&self) -> &'static str {
            "always fails"
        }

        fn parameters(&self) -> ParameterSchema {
            ParameterSchema::new()
        }

        async fn call(&self, _args: Arguments) -> Result<String, ToolError> {
            Err(ToolError::Format(serde::ser::Error::custom(self.0)))
        }
    }

    async fn call_failing(message: &'static str) -> MCPResponse {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Failing(message))).unwrap();
        Dispatcher::new(test_state(), registry)
            .handle(request(10, "tools/call", json!({ "name": "system-info" })))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_handler_error_becomes_text_envelope() {
        let response = call_failing("database unavailable").await;
        assert!(response.error.is_none());
        let result: CallToolResult = serde_json::from_value(response.result.unwrap()).unwrap();
        assert!(result.is_error);
        assert_eq!(
            result.content,
            vec![ContentBlock::text("Error: failed to format response: database unavailable")]
        );
    }

    #[tokio::test]
    async fn test_serve_lines() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#, "\n",
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"system-info","arguments":{"info":"date"}}}"#, "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"#, "\n",
            r#"not json at all"#, "\n",
        );
        let mut output = Vec::new();
        serve_lines(Arc::new(dispatcher()), input.as_bytes(), &mut output)
            .await
            .unwrap();

        let responses: Vec<MCPResponse> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 4);

        let by_id = |id: Value| responses.iter().find(|r| r.id == Some(id.clone()));
        assert!(by_id(json!(1)).unwrap().result.is_some());
        assert!(result_text(by_id(json!(2)).unwrap()).starts_with("Current date: "));

        let parse_errors = responses
            .iter()
            .filter(|r| r.error.as_ref().map(|e| e.code) == Some(MCPError::PARSE_ERROR))
            .count();
        assert_eq!(parse_errors, 2);
    }

    fn parse_output(output: Vec<u8>) -> Vec<MCPResponse> {
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_serve_lines_survives_invalid_utf8() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
        input.push(b'\n');
        input.extend_from_slice(&[0xFF, 0xFE, b'\n']);
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#);
        input.push(b'\n');

        let mut output = Vec::new();
        serve_lines(Arc::new(dispatcher()), input.as_slice(), &mut output)
            .await
            .unwrap();

        let responses = parse_output(output);
        assert_eq!(responses.len(), 3);
        for id in [json!(1), json!(2)] {
            let response = responses.iter().find(|r| r.id == Some(id.clone())).unwrap();
            assert_eq!(response.result, Some(json!({})));
        }
        let parse_error = responses.iter().find(|r| r.error.is_some()).unwrap();
        assert_eq!(parse_error.id, None);
        assert_eq!(parse_error.error.as_ref().unwrap().code, MCPError::PARSE_ERROR);
    }

    struct BrokenPipe;

    impl tokio::io::AsyncRead for BrokenPipe {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::other("pipe closed")))
        }
    }

    #[tokio::test]
    async fn test_serve_lines_drains_responses_after_read_error() {
        use tokio::io::AsyncReadExt;

        let first = &br#"{"jsonrpc":"2.0","id":1,"method":"ping"}
"#[..];
        let reader = BufReader::new(first.chain(BrokenPipe));
        let mut output = Vec::new();
        let result = serve_lines(Arc::new(dispatcher()), reader, &mut output).await;

        assert!(result.is_err());
        let responses = parse_output(output);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, Some(json!(1)));
    }

    #[actix_rt::test]
    async fn test_http_routes() {
        let data = web::Data::new(dispatcher());
        let app = test::init_service(App::new().app_data(data.clone()).configure(routes)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "test-server");

        let req = test::TestRequest::post()
            .uri("/mcp")
            .set_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": { "name": "data-lookup", "arguments": { "outputMode": "compact-json" } }
            }))
            .to_request();
        let body: MCPResponse = test::call_and_read_body_json(&app, req).await;
        assert!(!result_text(&body).contains('\n'));

        let req = test::TestRequest::post()
            .uri("/")
            .set_json(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::ACCEPTED);

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["requests_total"], 2);
    }

    #[actix_rt::test]
    async fn test_http_malformed_body() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(dispatcher())).configure(routes),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/mcp")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
        let body: MCPResponse = test::read_body_json(resp).await;
        assert_eq!(body.error.unwrap().code, MCPError::PARSE_ERROR);
    }

    #[actix_rt::test]
    async fn test_sse_lists_tools() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(dispatcher())).configure(routes),
        )
        .await;
        let req = test::TestRequest::get().uri("/sse").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = std::str::from_utf8(&body).unwrap();
        let payload: Value =
            serde_json::from_str(text.strip_prefix("data: ").unwrap().trim_end()).unwrap();
        assert_eq!(payload["count"], 2);
    }
}
