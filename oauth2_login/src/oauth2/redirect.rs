use http::HeaderMap;
use http::header::HOST;
use url::Url;

use crate::oauth2::errors::AuthError;

const HEADER_FORWARDED: &str = "forwarded";
const HEADER_X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const HEADER_X_FORWARDED_SCHEME: &str = "x-forwarded-scheme";
const HEADER_X_FORWARDED_HOST: &str = "x-forwarded-host";
const HEADER_X_FORWARDED_PORT: &str = "x-forwarded-port";
const FORWARDED_PROTO_KEY: &str = "proto=";
const FORWARDED_HOST_KEY: &str = "host=";
const DEFAULT_SCHEME: &str = "https";

/// The forwarding-relevant parts of an incoming request.
///
/// `tls` should be set when the backend itself terminated TLS for this
/// request; behind a TLS-terminating proxy it stays `false` and the
/// forwarding headers carry the externally visible scheme.
pub struct RequestContext<'a> {
    headers: &'a HeaderMap,
    tls: bool,
}

impl<'a> RequestContext<'a> {
    pub fn new(headers: &'a HeaderMap) -> Self {
        Self {
            headers,
            tls: false,
        }
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }
}

/// Computes the callback URL to advertise to the provider for a specific
/// request, honoring reverse-proxy forwarding headers so a backend listening
/// on plain HTTP behind a TLS terminator still registers `https://`.
///
/// Resolution is stateless and side-effect-free; a resolver is safe to share
/// across concurrent requests.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    public_base_url: Url,
    fallback: Url,
    callback_path: String,
}

impl RedirectResolver {
    pub fn new(public_base_url: Url, callback_path: &str) -> Result<Self, AuthError> {
        let fallback = public_base_url
            .join(callback_path)
            .map_err(|_| AuthError::Config(format!("invalid callback path: {callback_path}")))?;
        Ok(Self {
            public_base_url,
            fallback,
            callback_path: callback_path.to_string(),
        })
    }

    /// Absolute callback URL for this request. With no request context the
    /// statically configured base URL decides everything.
    pub fn callback_url(&self, ctx: Option<&RequestContext>) -> Url {
        let Some(ctx) = ctx else {
            return self.fallback.clone();
        };

        let scheme = self.resolve_scheme(ctx);
        let Some(mut host) = self.resolve_host(ctx.headers) else {
            return self.fallback.clone();
        };

        if let Some(port) = resolve_port(ctx.headers) {
            if !host.contains(':') {
                host = format!("{host}:{port}");
            }
        }

        Url::parse(&format!("{scheme}://{host}"))
            .and_then(|origin| origin.join(&self.callback_path))
            .unwrap_or_else(|_| self.fallback.clone())
    }

    fn resolve_scheme(&self, ctx: &RequestContext) -> String {
        if let Some(proto) = forwarded_directive(ctx.headers, FORWARDED_PROTO_KEY) {
            return proto.to_lowercase();
        }
        if let Some(proto) = first_header_value(ctx.headers, HEADER_X_FORWARDED_PROTO) {
            return proto.to_lowercase();
        }
        if let Some(scheme) = first_header_value(ctx.headers, HEADER_X_FORWARDED_SCHEME) {
            return scheme.to_lowercase();
        }
        if ctx.tls {
            return DEFAULT_SCHEME.to_string();
        }
        let configured = self.public_base_url.scheme();
        if !configured.is_empty() {
            return configured.to_lowercase();
        }
        DEFAULT_SCHEME.to_string()
    }

    fn resolve_host(&self, headers: &HeaderMap) -> Option<String> {
        if let Some(host) = forwarded_directive(headers, FORWARDED_HOST_KEY) {
            return Some(host);
        }
        if let Some(host) = first_header_value(headers, HEADER_X_FORWARDED_HOST) {
            return Some(host.to_string());
        }
        if let Some(host) = headers.get(HOST).and_then(|v| v.to_str().ok()) {
            if !host.is_empty() {
                return Some(host.to_string());
            }
        }
        self.configured_host()
    }

    fn configured_host(&self) -> Option<String> {
        let host = self.public_base_url.host_str()?;
        match self.public_base_url.port() {
            Some(port) => Some(format!("{host}:{port}")),
            None => Some(host.to_string()),
        }
    }
}

// No fallback for the port: absent unless explicitly forwarded.
fn resolve_port(headers: &HeaderMap) -> Option<String> {
    first_header_value(headers, HEADER_X_FORWARDED_PORT).map(|s| s.to_string())
}

/// First non-empty token of a comma-separated header value.
fn first_header_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    let value = headers.get(name)?.to_str().ok()?;
    value.split(',').map(str::trim).find(|s| !s.is_empty())
}

/// Extract a `key=value` directive from an RFC 7239 `Forwarded` header.
///
/// Directive groups are comma-separated; within a group, pairs are
/// semicolon-separated and values may be quoted. The first group defining
/// the key wins.
fn forwarded_directive(headers: &HeaderMap, key: &str) -> Option<String> {
    let value = headers.get(HEADER_FORWARDED)?.to_str().ok()?;
    for group in value.split(',') {
        for pair in group.split(';') {
            let pair = pair.trim();
            if pair.is_empty() || !pair.to_lowercase().starts_with(key) {
                continue;
            }
            let directive = pair[key.len()..].trim().trim_matches('"');
            if !directive.is_empty() {
                return Some(directive.to_string());
            }
        }
    }
    None
}
