use anyhow::Result;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;
use tracing::{info, warn};

use crate::use_cases::{DrawUseCase, ReportUseCase};

#[derive(Debug, serde::Deserialize)]
struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc")]
    jsonrpc: String,
    method: String,
    params: Option<Value>,
    id: Option<Value>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id: Some(id.unwrap_or(json!(1))),
        }
    }

    fn failure(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
            id: Some(id.unwrap_or(json!(1))),
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct Tool {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

pub struct MCPHandler {
    draw_use_case: Arc<DrawUseCase>,
    report_use_case: Arc<ReportUseCase>,
}

impl MCPHandler {
    pub fn new(draw_use_case: Arc<DrawUseCase>, report_use_case: Arc<ReportUseCase>) -> Self {
        Self {
            draw_use_case,
            report_use_case,
        }
    }

    pub async fn serve<R, W>(self, reader: R, mut writer: W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(req) => req,
                Err(e) => {
                    warn!("Failed to parse request: {} - Line: {}", e, line);
                    let error_response = JsonRpcResponse {
                        jsonrpc: "2.0".to_string(),
                        result: None,
                        error: Some(JsonRpcError {
                            code: -32700,
                            message: "Parse error".to_string(),
                            data: Some(json!(e.to_string())),
                        }),
                        id: None,
                    };
                    let response_json = serde_json::to_string(&error_response)?;
                    writeln!(writer, "{}", response_json)?;
                    writer.flush()?;
                    continue;
                }
            };

            // Notifications get no response
            if request.id.is_none() || request.method.starts_with("notifications/") {
                if request.method == "notifications/initialized" {
                    info!("Client initialized");
                }
                continue;
            }

            let response = self.handle_request(request).await;
            let response_json = serde_json::to_string(&response)?;
            writeln!(writer, "{}", response_json)?;
            writer.flush()?;
        }

        Ok(())
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        if request.jsonrpc != "2.0" {
            warn!("Unsupported JSON-RPC version: {}", request.jsonrpc);
            return JsonRpcResponse::failure(
                request.id,
                -32600,
                format!("Invalid Request: unsupported jsonrpc version {}", request.jsonrpc),
            );
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "tools/list" => JsonRpcResponse::success(request.id, json!({ "tools": self.get_tools() })),
            "tools/call" => self.handle_call_tool(request.params, request.id).await,
            _ => JsonRpcResponse::failure(
                request.id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("Initializing Lotofácil MCP server");
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "lotofacil-mcp-server",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    async fn handle_call_tool(&self, params: Option<Value>, id: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::failure(id, -32602, "Missing params".to_string());
        };

        let Some(tool_name) = params.get("name").and_then(|n| n.as_str()) else {
            return JsonRpcResponse::failure(id, -32602, "Missing tool name".to_string());
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
        let arguments_map: HashMap<String, Value> =
            serde_json::from_value(arguments).unwrap_or_default();

        match self.execute_tool(tool_name, &arguments_map).await {
            Ok(content) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [
                        {
                            "type": "text",
                            "text": content
                        }
                    ]
                }),
            ),
            Err(e) => JsonRpcResponse::failure(id, -32603, format!("Tool execution error: {}", e)),
        }
    }

    async fn execute_tool(&self, tool_name: &str, arguments: &HashMap<String, Value>) -> Result<String> {
        match tool_name {
            "show_latest" => self.draw_use_case.show_latest(arguments).await,
            "show_draw" => self.draw_use_case.show_draw(arguments).await,
            "search_draw" => self.draw_use_case.search_draw(arguments).await,
            "list_cached_draws" => self.draw_use_case.list_cached_draws(arguments).await,
            "prefetch_draws" => self.draw_use_case.prefetch_draws(arguments).await,
            "generate_report" => self.report_use_case.generate_report(arguments).await,
            _ => Err(anyhow::anyhow!("Unknown tool: {}", tool_name)),
        }
    }

    fn get_tools(&self) -> Vec<Tool> {
        vec![
            Tool {
                name: "show_latest".to_string(),
                description: "Show the latest Lotofácil draw, falling back to the most recent cached draw when the results API is down".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {}
                }),
            },
            Tool {
                name: "show_draw".to_string(),
                description: "Show a specific Lotofácil draw, from the cache when available".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "number": {
                            "type": "integer",
                            "description": "Draw (concurso) number"
                        }
                    },
                    "required": ["number"]
                }),
            },
            Tool {
                name: "search_draw".to_string(),
                description: "Look up a draw from free-text search input".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Text containing the draw number"
                        }
                    },
                    "required": ["query"]
                }),
            },
            Tool {
                name: "list_cached_draws".to_string(),
                description: "List cached draws, newest first".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "limit": {
                            "type": "integer",
                            "description": "Number of draws to return (default: 10)"
                        }
                    }
                }),
            },
            Tool {
                name: "prefetch_draws".to_string(),
                description: "Fetch and cache every draw in a range that is not cached yet".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "from": {
                            "type": "integer",
                            "description": "First draw number"
                        },
                        "to": {
                            "type": "integer",
                            "description": "Last draw number (inclusive)"
                        }
                    },
                    "required": ["from", "to"]
                }),
            },
            Tool {
                name: "generate_report".to_string(),
                description: "Generate and save an HTML report for the latest draw or a specific one".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "number": {
                            "type": "integer",
                            "description": "Draw number; omit for the latest draw"
                        }
                    }
                }),
            },
        ]
    }
}

pub fn stdio() -> (BufReader<io::Stdin>, io::Stdout) {
    (BufReader::new(io::stdin()), io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lotofacil::error::FetchResult;
    use lotofacil::{CurrencyStyle, Draw, DrawCache, DrawSource, FetchError, Resolver};
    use std::io::Cursor;
    use tempfile::TempDir;

    struct StaticSource;

    #[async_trait]
    impl DrawSource for StaticSource {
        async fn fetch_latest(&self) -> FetchResult<Draw> {
            Err(FetchError::Unreachable("offline".to_string()))
        }

        async fn fetch_by_number(&self, number: u32) -> FetchResult<Draw> {
            if number != 3040 {
                return Err(FetchError::Unreachable("HTTP 404".to_string()));
            }
            Ok(Draw {
                number,
                drawn_at: "14/03/2024".to_string(),
                numbers: vec!["5".into(), "1".into()],
                rolled_over: false,
                next_draw_date: None,
                next_draw_estimated_prize: None,
                prize_tiers: Vec::new(),
            })
        }
    }

    fn create_handler() -> (MCPHandler, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let cache = DrawCache::open(dir.path().join("test.db")).unwrap();
        let resolver = Arc::new(Resolver::new(
            Arc::new(StaticSource),
            cache,
            CurrencyStyle::BrazilianLocale,
        ));
        let handler = MCPHandler::new(
            Arc::new(DrawUseCase::new(Arc::clone(&resolver))),
            Arc::new(ReportUseCase::new(resolver, dir.path().join("reports"))),
        );
        (handler, dir)
    }

    async fn run(lines: &[Value]) -> Vec<Value> {
        let (handler, _dir) = create_handler();
        let input: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        let mut output = Vec::new();

        handler.serve(Cursor::new(input), &mut output).await.unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn tool_text(response: &Value) -> Value {
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_and_list_tools() {
        let responses = run(&[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        ])
        .await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "lotofacil-mcp-server");

        let names: Vec<&str> = responses[1]["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"show_latest"));
        assert!(names.contains(&"show_draw"));
        assert!(names.contains(&"search_draw"));
    }

    #[tokio::test]
    async fn test_show_draw_then_latest_from_cache() {
        let responses = run(&[
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call",
                   "params": {"name": "show_draw", "arguments": {"number": 3040}}}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
                   "params": {"name": "show_latest"}}),
        ])
        .await;

        let shown = tool_text(&responses[0]);
        assert_eq!(shown["success"], true);
        assert_eq!(shown["draw"]["numbers"], json!([1, 5]));

        // API is down, so the latest comes from the cache filled above
        let latest = tool_text(&responses[1]);
        assert_eq!(latest["draw"]["number"], 3040);
    }

    #[tokio::test]
    async fn test_not_found_is_a_message_not_an_error() {
        let responses = run(&[
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call",
                   "params": {"name": "search_draw", "arguments": {"query": "12"}}}),
        ])
        .await;

        let page = tool_text(&responses[0]);
        assert_eq!(page["success"], false);
        assert_eq!(page["draw"], Value::Null);
        assert!(page["message"].as_str().unwrap().contains("12"));
    }

    #[tokio::test]
    async fn test_generate_report_writes_file() {
        let responses = run(&[
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call",
                   "params": {"name": "generate_report", "arguments": {"number": 3040}}}),
        ])
        .await;

        let result = tool_text(&responses[0]);
        assert_eq!(result["success"], true);
        assert!(result["path"].as_str().unwrap().ends_with("lotofacil_3040.html"));
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let (handler, _dir) = create_handler();
        let input = concat!(
            "not json\n",
            "{\"jsonrpc\": \"2.0\", \"id\": 2, \"method\": \"resources/list\"}\n",
            "{\"jsonrpc\": \"2.0\", \"id\": 3, \"method\": \"tools/call\"}\n",
            "{\"jsonrpc\": \"2.0\", \"id\": 4, \"method\": \"tools/call\", \"params\": {\"name\": \"nope\"}}\n",
            "{\"jsonrpc\": \"2.0\", \"id\": 5, \"method\": \"tools/call\", \"params\": {\"name\": \"show_draw\", \"arguments\": {}}}\n",
        );
        let mut output = Vec::new();
        handler.serve(Cursor::new(input), &mut output).await.unwrap();

        let codes: Vec<i64> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["error"]["code"].as_i64().unwrap())
            .collect();
        assert_eq!(codes, vec![-32700, -32601, -32602, -32603, -32603]);
    }

    #[tokio::test]
    async fn test_rejects_other_jsonrpc_versions() {
        let responses = run(&[
            json!({"jsonrpc": "1.0", "id": 1, "method": "tools/list"}),
            json!({"id": 2, "method": "tools/list"}),
        ])
        .await;

        assert_eq!(responses[0]["error"]["code"], -32600);
        assert_eq!(responses[0]["id"], 1);
        // a missing version is read as 2.0
        assert!(responses[1]["result"]["tools"].is_array());
    }
}
