use super::Extractor;
use crate::model::Hit;
use crate::resolve::{JSONRPC_SENTINEL, SOCKETIO_SENTINEL, TRPC_SENTINEL};
use once_cell::sync::Lazy;
use regex::Regex;

// { jsonrpc: "2.0", method: "x" } in either key order, quoted keys allowed
static JSONRPC_METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)(?:jsonrpc|json_rpc)[^}]*?method[`"']?\s*:\s*[`"']([^`"']+)[`"']|method[`"']?\s*:\s*[`"']([^`"']+)[`"'][^}]*?jsonrpc"#,
    )
    .unwrap()
});

static JSONRPC_ENDPOINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)[`"']((?:https?://[^`"'\s]*)?/(?:jsonrpc|json[_-]rpc|rpc))[`"']"#).unwrap()
});

// trpc.post.byId.query(...)
static TRPC_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)trpc\s*\.\s*([\w.]+)\s*\.\s*(query|mutate|subscribe)\s*\(").unwrap()
});

// api.post.byId.useQuery(...)
static TRPC_HOOK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:api|trpc)\s*\.\s*([\w.]+)\s*\.\s*use(Query|Mutation|Subscription)\s*\(")
        .unwrap()
});

// "/pkg.v1.Service/Method"
static GRPC_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"[`"']((?:https?://[^`"'\s]*/|/)?[A-Za-z][A-Za-z0-9_.]*\.[A-Z][A-Za-z0-9_]*/[A-Z][A-Za-z0-9_]+)[`"']"#,
    )
    .unwrap()
});

static SOCKET_EMIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)socket\.emit\s*\(\s*[`"']([^`"']+)[`"']"#).unwrap());

static SOCKET_ON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)socket\.on\s*\(\s*[`"']([^`"']+)[`"']"#).unwrap());

fn trpc_op(call: &str) -> &'static str {
    match call.to_lowercase().as_str() {
        "mutate" | "mutation" => "mutation",
        "subscribe" | "subscription" => "subscription",
        _ => "query",
    }
}

fn post() -> Option<String> {
    Some("POST".to_string())
}

/// JSON-RPC, tRPC, gRPC-web and socket.io idioms.
pub struct RpcExtractor;

impl Extractor for RpcExtractor {
    fn name(&self) -> &'static str {
        "rpc"
    }

    fn extract(&self, js: &str) -> Vec<Hit> {
        let mut hits = Vec::new();

        for caps in JSONRPC_METHOD_RE.captures_iter(js) {
            let name = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().to_string());
            hits.push(Hit::rpc(JSONRPC_SENTINEL, post(), name));
        }

        for caps in JSONRPC_ENDPOINT_RE.captures_iter(js) {
            hits.push(Hit::rpc(&caps[1], post(), None));
        }

        for re in [&*TRPC_CALL_RE, &*TRPC_HOOK_RE] {
            for caps in re.captures_iter(js) {
                let procedure = format!("{}.{}", &caps[1], trpc_op(&caps[2]));
                hits.push(Hit::rpc(TRPC_SENTINEL, post(), Some(procedure)));
            }
        }

        for caps in GRPC_PATH_RE.captures_iter(js) {
            hits.push(Hit::rpc(&caps[1], post(), None));
        }

        for (re, prefix) in [(&*SOCKET_EMIT_RE, "emit"), (&*SOCKET_ON_RE, "on")] {
            for caps in re.captures_iter(js) {
                let event = format!("{}:{}", prefix, &caps[1]);
                hits.push(Hit::rpc(SOCKETIO_SENTINEL, None, Some(event)));
            }
        }

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Kind;

    fn rpc_methods(hits: &[Hit]) -> Vec<&str> {
        hits.iter().filter_map(|h| h.rpc_method.as_deref()).collect()
    }

    #[test]
    fn test_jsonrpc_either_key_order() {
        let js = r#"
            send({ jsonrpc: "2.0", id: 1, method: "eth_blockNumber" });
            send({ method: 'net_version', params: [], jsonrpc: '2.0' });
        "#;
        let hits = RpcExtractor.extract(js);
        assert_eq!(rpc_methods(&hits), vec!["eth_blockNumber", "net_version"]);
        assert!(hits.iter().all(|h| h.url == JSONRPC_SENTINEL && h.kind == Kind::Rpc));
    }

    #[test]
    fn test_jsonrpc_quoted_keys() {
        let hits = RpcExtractor.extract(r#"body:'{"jsonrpc":"2.0","method":"getBalance"}'"#);
        assert!(rpc_methods(&hits).contains(&"getBalance"));
    }

    #[test]
    fn test_rpc_endpoint_literals() {
        let hits = RpcExtractor.extract(r#"u1="/jsonrpc";u2='https://node.example.com/rpc';u3=`/json-rpc`"#);
        let urls: Vec<&str> = hits.iter().map(|h| h.url.as_str()).collect();
        assert_eq!(urls, vec!["/jsonrpc", "https://node.example.com/rpc", "/json-rpc"]);
        assert!(hits.iter().all(|h| h.method.as_deref() == Some("POST")));
    }

    #[test]
    fn test_trpc_calls_and_hooks() {
        let js = "await trpc.post.byId.query({id});trpc.user.create.mutate(u);api.chat.onMessage.useSubscription();api.post.list.useQuery()";
        let hits = RpcExtractor.extract(js);
        assert_eq!(
            rpc_methods(&hits),
            vec![
                "post.byId.query",
                "user.create.mutation",
                "chat.onMessage.subscription",
                "post.list.query"
            ]
        );
        assert!(hits.iter().all(|h| h.url == TRPC_SENTINEL));
    }

    #[test]
    fn test_grpc_paths() {
        let hits = RpcExtractor.extract(r#"const p = "/helloworld.v1.Greeter/SayHello";"#);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "/helloworld.v1.Greeter/SayHello");
        assert_eq!(hits[0].kind, Kind::Rpc);
    }

    #[test]
    fn test_grpc_is_case_sensitive() {
        assert!(RpcExtractor.extract(r#"x="/lib.module/thing""#).is_empty());
    }

    #[test]
    fn test_socketio_events() {
        let hits = RpcExtractor.extract(r#"socket.emit("chat message", m); socket.on('typing', f);"#);
        assert_eq!(rpc_methods(&hits), vec!["emit:chat message", "on:typing"]);
        assert!(hits.iter().all(|h| h.url == SOCKETIO_SENTINEL && h.method.is_none()));
    }
}
