//! Method registry.
//!
//! Backs `tools/list` and the router's support check. Protocol methods
//! (`initialize`, `tools/*`) are listed separately from the tools agents
//! call.

use serde_json::{json, Map, Value};

/// One named parameter of a tool.
#[derive(Debug, Clone, Copy)]
pub struct ParamInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    /// JSON schema type
    pub kind: &'static str,
}

impl ParamInfo {
    const fn required(name: &'static str, kind: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: true,
            kind,
        }
    }

    const fn optional(name: &'static str, kind: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: false,
            kind,
        }
    }
}

/// Method metadata
#[derive(Debug, Clone, Copy)]
pub struct MethodInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamInfo],
    /// Publishes blocks
    pub is_write: bool,
}

impl MethodInfo {
    /// Parameter names in positional order.
    pub fn param_names(&self) -> impl Iterator<Item = &'static str> {
        self.params.iter().map(|p| p.name)
    }

    /// MCP tool descriptor with a JSON schema for the arguments.
    pub fn tool_descriptor(&self) -> Value {
        let mut properties = Map::new();
        for param in self.params {
            properties.insert(
                param.name.to_string(),
                json!({"type": param.kind, "description": param.description}),
            );
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }
}

const ADDRESS: ParamInfo = ParamInfo::required("address", "string", "Nano account address");
const PRIVATE_KEY: ParamInfo =
    ParamInfo::required("privateKey", "string", "64 hex character private key");

/// Protocol methods
pub const PROTOCOL_METHODS: &[&str] = &["initialize", "tools/list", "tools/call"];

/// Tools exposed to agents
pub static METHODS: &[MethodInfo] = &[
    MethodInfo {
        name: "getBalance",
        description: "Confirmed balance and receivable amount, in raw and XNO",
        params: &[ADDRESS],
        is_write: false,
    },
    MethodInfo {
        name: "getAccountInfo",
        description: "Frontier, balance, representative and block count",
        params: &[ADDRESS],
        is_write: false,
    },
    MethodInfo {
        name: "getPendingBlocks",
        description: "Incoming blocks waiting to be received",
        params: &[
            ADDRESS,
            ParamInfo::optional("count", "integer", "Maximum number of blocks"),
        ],
        is_write: false,
    },
    MethodInfo {
        name: "getAccountStatus",
        description: "Balance, pending summary and whether a receive is needed before sending",
        params: &[ADDRESS],
        is_write: false,
    },
    MethodInfo {
        name: "initializeAccount",
        description: "Open an account by receiving its pending blocks",
        params: &[ADDRESS, PRIVATE_KEY],
        is_write: true,
    },
    MethodInfo {
        name: "receiveAllPending",
        description: "Receive every pending block, reporting each one",
        params: &[ADDRESS, PRIVATE_KEY],
        is_write: true,
    },
    MethodInfo {
        name: "sendTransaction",
        description: "Receive pending funds, then send an exact raw amount",
        params: &[
            ParamInfo::required("fromAddress", "string", "Sending account"),
            ParamInfo::required("toAddress", "string", "Destination account"),
            ParamInfo::required("amountRaw", "string", "Amount in raw (integer string)"),
            PRIVATE_KEY,
        ],
        is_write: true,
    },
    MethodInfo {
        name: "convertBalance",
        description: "Convert between raw and XNO without floating point",
        params: &[
            ParamInfo::required("amount", "string", "Amount to convert"),
            ParamInfo::required("from", "string", "Unit of amount: raw or nano"),
        ],
        is_write: false,
    },
    MethodInfo {
        name: "validateAddress",
        description: "Check an address's format and checksum",
        params: &[ADDRESS],
        is_write: false,
    },
    MethodInfo {
        name: "precomputeWork",
        description: "Compute work for the account's next block ahead of time",
        params: &[ADDRESS],
        is_write: false,
    },
    MethodInfo {
        name: "getWorkCacheStats",
        description: "Work cache hit rate, size and generation counters",
        params: &[],
        is_write: false,
    },
];

pub fn get_method_info(method: &str) -> Option<&'static MethodInfo> {
    METHODS.iter().find(|info| info.name == method)
}

pub fn is_method_supported(method: &str) -> bool {
    PROTOCOL_METHODS.contains(&method) || get_method_info(method).is_some()
}

/// `tools/list` result
pub fn tool_list() -> Value {
    json!({ "tools": METHODS.iter().map(MethodInfo::tool_descriptor).collect::<Vec<_>>() })
}
