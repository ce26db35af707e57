//! Final URL building

use redirector_core::{Server, UrlParams};
use std::net::Ipv6Addr;

/// Query parameter carrying the name of the server that was chosen
pub const RULE_NAME_PARAM: &str = "ruleName";

/// Build the redirect URL for `server`
///
/// Advanced servers use their URL verbatim. Other servers substitute the
/// `{protocol}`, `{host}`, `{port}` and `{urn}` tokens of their template.
/// The query of `connect_url` is carried over and `ruleName` appended last.
pub fn build_url(
    server: &Server,
    host: Option<&str>,
    params: &UrlParams,
    connect_url: Option<&str>,
) -> String {
    let base = if server.is_advanced() {
        server.url_template.clone()
    } else {
        substitute(&server.url_template, host.unwrap_or_default(), params)
    };
    append_query(base, connect_url, &server.name)
}

fn substitute(template: &str, host: &str, params: &UrlParams) -> String {
    let host = if host.parse::<Ipv6Addr>().is_ok() {
        format!("[{}]", host)
    } else {
        host.to_string()
    };

    template
        .replace("{protocol}", params.protocol.as_deref().unwrap_or_default())
        .replace("{host}", &host)
        .replace(
            "{port}",
            &params.port.map(|p| p.to_string()).unwrap_or_default(),
        )
        .replace("{urn}", params.urn.as_deref().unwrap_or_default())
}

fn append_query(mut url: String, connect_url: Option<&str>, rule_name: &str) -> String {
    let inbound = connect_url
        .and_then(|c| c.split_once('?'))
        .map(|(_, query)| query.trim_matches('&'))
        .filter(|query| !query.is_empty());

    let mut separator = if url.contains('?') { '&' } else { '?' };
    if let Some(query) = inbound {
        url.push(separator);
        url.push_str(query);
        separator = '&';
    }
    url.push(separator);
    url.push_str(RULE_NAME_PARAM);
    url.push('=');
    url.push_str(&urlencoding::encode(rule_name));
    url
}
