//! HTTP client construction for the completion endpoint.

use reqwest::{Client, RequestBuilder};

use crate::options::TransportOptions;

/// Build a configured HTTP client from transport options.
///
/// Applies common configuration like timeouts and proxies.
pub fn build_http_client(options: &TransportOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &options.proxy {
        if let Ok(proxy) = reqwest::Proxy::all(proxy_url) {
            builder = builder.proxy(proxy);
        }
    }

    builder.build()
}

/// Add extra headers to a request if specified in transport options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    options: &TransportOptions,
) -> RequestBuilder {
    if let Some(headers) = &options.extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}
