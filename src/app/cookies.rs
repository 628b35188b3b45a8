//! Cookie relay from provider replies to outward-facing responses.

use crate::provider::ProviderReply;
use axum::http::{HeaderMap, header::SET_COOKIE};

/// Append every cookie-setting entry of `reply` onto `response_headers`,
/// verbatim and in original order, one header entry per cookie.
///
/// Consumes the reply: each provider call is relayed at most once, and a
/// reply without cookies is a silent no-op.
pub fn relay(reply: ProviderReply, response_headers: &mut HeaderMap) {
    for (name, value) in reply.into_headers() {
        if name == SET_COOKIE {
            response_headers.append(SET_COOKIE, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue, StatusCode};

    #[test]
    fn relays_every_cookie_in_order() {
        let reply = ProviderReply::new(StatusCode::OK)
            .with_header(SET_COOKIE, HeaderValue::from_static("session=abc; Path=/"))
            .with_header(SET_COOKIE, HeaderValue::from_static("csrf=def; Path=/"))
            .with_header(SET_COOKIE, HeaderValue::from_static("theme=dark"));

        let mut headers = HeaderMap::new();
        relay(reply, &mut headers);

        let cookies: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        assert_eq!(
            cookies,
            vec!["session=abc; Path=/", "csrf=def; Path=/", "theme=dark"]
        );
    }

    #[test]
    fn ignores_non_cookie_headers() {
        let reply = ProviderReply::new(StatusCode::OK)
            .with_header(
                HeaderName::from_static("content-type"),
                HeaderValue::from_static("application/json"),
            )
            .with_header(SET_COOKIE, HeaderValue::from_static("session=abc"));

        let mut headers = HeaderMap::new();
        relay(reply, &mut headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.get("content-type").is_none());
    }

    #[test]
    fn no_cookies_is_a_no_op() {
        let reply = ProviderReply::new(StatusCode::OK);
        let mut headers = HeaderMap::new();
        relay(reply, &mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn appends_without_clobbering_existing_entries() {
        let reply =
            ProviderReply::new(StatusCode::OK).with_header(SET_COOKIE, HeaderValue::from_static("b=2"));

        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        relay(reply, &mut headers);

        let cookies: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }
}
