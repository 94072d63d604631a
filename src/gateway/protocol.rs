//! JSON-RPC 2.0 envelope helpers.
//!
//! The gateway recognizes `tools/list` and `tools/call` and answers with the
//! standard envelope. Every response, success or error, echoes the caller's
//! request id unchanged.

use serde_json::{json, Value};

/// Request body was not valid JSON.
pub const PARSE_ERROR: i64 = -32700;
/// Unknown top-level method or unknown tool name.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// A recognized tool was called with missing, empty, or mistyped arguments.
pub const INVALID_PARAMS: i64 = -32602;
/// The underlying operation failed after validation passed.
pub const INTERNAL_ERROR: i64 = -32000;

pub fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

pub fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message,
        },
    })
}

/// The uniform success shape every tool call returns: a single text block.
/// The calling agent parses this, so it must never vary across tools.
pub fn text_result(text: String) -> Value {
    json!({
        "content": [{
            "type": "text",
            "text": text,
        }],
    })
}
