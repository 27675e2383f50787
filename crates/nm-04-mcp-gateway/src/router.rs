//! Method routing.
//!
//! Plain JSON-RPC callers invoke tools directly by name. MCP clients go
//! through `tools/call`, which runs the same tool and wraps its result as
//! text content.

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::methods::{get_method_info, tool_list};
use crate::domain::params::Params;
use crate::rpc::McpHandlers;
use serde_json::{json, Value};

/// MCP protocol revision this server speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "nano-mcp";

/// Route a JSON-RPC method to its handler.
pub async fn route_method(
    handlers: &McpHandlers,
    method: &str,
    params: Option<&Value>,
) -> ApiResult<Value> {
    match method {
        "initialize" => Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": { "tools": {} },
        })),

        "tools/list" => Ok(tool_list()),

        "tools/call" => {
            let call = Params::new(params, None);
            let name: String = call.required("name")?;
            let arguments = call.optional::<Value>("arguments")?;
            if get_method_info(&name).is_none() {
                return Err(ApiError::invalid_params(format!("unknown tool '{}'", name)));
            }
            Ok(tool_content(
                call_tool(handlers, &name, arguments.as_ref()).await,
            ))
        }

        _ => call_tool(handlers, method, params).await,
    }
}

/// MCP `tools/call` result. Tool failures are reported in-band.
fn tool_content(result: ApiResult<Value>) -> Value {
    let (payload, is_error) = match result {
        Ok(value) => (value, false),
        Err(e) => (json!({ "error": e.to_json() }), true),
    };
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

/// Run one tool.
pub async fn call_tool(
    handlers: &McpHandlers,
    name: &str,
    params: Option<&Value>,
) -> ApiResult<Value> {
    let info = get_method_info(name).ok_or_else(|| ApiError::method_not_found(name))?;
    let p = Params::new(params, Some(info));

    match name {
        // Ledger reads
        "getBalance" => {
            let address: String = p.required("address")?;
            handlers.ledger.get_balance(&address).await
        }

        "getAccountInfo" => {
            let address: String = p.required("address")?;
            handlers.ledger.get_account_info(&address).await
        }

        "getPendingBlocks" => {
            let address: String = p.required("address")?;
            let count: Option<u32> = p.optional("count")?;
            handlers.ledger.get_pending_blocks(&address, count).await
        }

        "validateAddress" => {
            let address: String = p.required("address")?;
            Ok(handlers.ledger.validate_address(&address))
        }

        "convertBalance" => {
            let amount: String = p.required("amount")?;
            let from: String = p.required("from")?;
            handlers.ledger.convert_balance(&amount, &from)
        }

        // Orchestrated operations
        "getAccountStatus" => {
            let address: String = p.required("address")?;
            handlers.wallet.account_status(&address).await
        }

        "initializeAccount" => {
            let address: String = p.required("address")?;
            let private_key: String = p.required("privateKey")?;
            handlers
                .wallet
                .initialize_account(&address, &private_key)
                .await
        }

        "receiveAllPending" => {
            let address: String = p.required("address")?;
            let private_key: String = p.required("privateKey")?;
            handlers
                .wallet
                .receive_all_pending(&address, &private_key)
                .await
        }

        "sendTransaction" => {
            let from: String = p.required("fromAddress")?;
            let to: String = p.required("toAddress")?;
            let amount: String = p.required("amountRaw")?;
            let private_key: String = p.required("privateKey")?;
            handlers
                .wallet
                .send_transaction(&from, &to, &amount, &private_key)
                .await
        }

        // Work
        "precomputeWork" => {
            let address: String = p.required("address")?;
            handlers.wallet.precompute_work(&address).await
        }

        "getWorkCacheStats" => handlers.wallet.work_cache_stats(),

        _ => Err(ApiError::method_not_found(name)),
    }
}
