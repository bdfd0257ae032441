//! Request chunks evaluated by `tarantool -e` inside the container.
//!
//! Each chunk connects to the router over net.box, evaluates the expression
//! and prints the YAML-encoded list of returned values. The exit code tells
//! how a failed request failed; see [`crate::constants`].

use std::time::Duration;

use crate::TransportConfig;

const PLAIN_CONNECT: &str = "'${uri}'";

const SSL_CONNECT: &str = "{uri = '${uri}', params = {transport = 'ssl'}}";

const MTLS_CONNECT: &str =
    "{uri = '${uri}', params = {transport = 'ssl', ssl_key_file = '${key}', ssl_cert_file = '${cert}'}}";

const REQUEST: &str = r#"local ok, conn = pcall(require('net.box').connect, ${connect}, {user = '${user}', password = '${password}', connect_timeout = ${connect_timeout}})
if not ok or not conn:is_connected() then
    io.stderr:write(tostring(ok and conn.error or conn))
    os.exit(${exit_connect})
end
local function reply(success, ...)
    if not success then
        local err = ...
        io.stderr:write(tostring(err))
        if type(err) == 'cdata' and err.code == box.error.TIMEOUT then
            os.exit(${exit_timeout})
        end
        os.exit(${exit_script})
    end
    io.stdout:write(require('yaml').encode({...}))
    os.exit(0)
end
reply(pcall(conn.eval, conn, '${expression}', {}, {timeout = ${eval_timeout}}))
"#;

/// Router address and account the chunk logs in with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Exit codes the chunk uses to report failures
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExitCodes {
    pub(crate) connect: i32,
    pub(crate) script: i32,
    pub(crate) timeout: i32,
}

/// Escapes text for a single-quoted Lua string literal so it cannot close
/// the literal it is placed in.
pub fn escape_lua(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\0' => escaped.push_str("\\0"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Builds the argv for one evaluation.
pub(crate) fn render_request(
    transport: &TransportConfig,
    endpoint: &Endpoint,
    credentials: &Credentials,
    expression: &str,
    connect_timeout: Duration,
    eval_timeout: Duration,
    exit_codes: ExitCodes,
) -> Vec<String> {
    let uri = escape_lua(&format!("{}:{}", endpoint.host, endpoint.port));

    let connect = match transport {
        TransportConfig::Plain => fill(PLAIN_CONNECT, &[("uri", &uri)]),
        TransportConfig::Ssl => fill(SSL_CONNECT, &[("uri", &uri)]),
        TransportConfig::MutualTls { cert_path, key_path } => fill(
            MTLS_CONNECT,
            &[
                ("uri", &uri),
                ("key", &escape_lua(key_path)),
                ("cert", &escape_lua(cert_path)),
            ],
        ),
    };

    let chunk = fill(
        REQUEST,
        &[
            ("connect", &connect),
            ("user", &escape_lua(&credentials.username)),
            ("password", &escape_lua(&credentials.password)),
            ("connect_timeout", &lua_seconds(connect_timeout)),
            ("eval_timeout", &lua_seconds(eval_timeout)),
            ("exit_connect", &exit_codes.connect.to_string()),
            ("exit_script", &exit_codes.script.to_string()),
            ("exit_timeout", &exit_codes.timeout.to_string()),
            ("expression", &escape_lua(expression)),
        ],
    );

    vec!["tarantool".to_string(), "-e".to_string(), chunk]
}

fn lua_seconds(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64())
}

/// Single-pass `${name}` substitution. Substituted text is never rescanned,
/// so values containing `${...}` stay literal.
pub(super) fn fill(
    template: &str,
    vars: &[(&str, &str)],
) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match vars.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
