use http::{HeaderMap, HeaderName};
use tracing::{debug, warn};

use crate::outgoing_request::OutgoingRequest;

/// The header name the chat platform documents (and its SDK hardcodes) for the API access token.
///
/// The reverse proxy in front of the platform drops requests carrying header names with
/// underscores, so this name must never reach the wire.
pub const API_ACCESS_TOKEN_UNDERSCORE: HeaderName = HeaderName::from_static("api_access_token");

/// The header name the reverse proxy accepts. The platform treats it the same as
/// [`API_ACCESS_TOKEN_UNDERSCORE`].
pub const API_ACCESS_TOKEN: HeaderName = HeaderName::from_static("api-access-token");

/// What [`normalize_headers`] did to a header map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Normalization {
    /// `api_access_token` was present and has been moved to `api-access-token`.
    Renamed,

    /// Only `api-access-token` was present, nothing was changed.
    AlreadyNormalized,

    /// Neither header was present. This is not an error, the request simply goes out without
    /// credentials and nothing was changed.
    MissingCredential,
}

/// Rewrites the credential header in place.
///
/// The value under `api_access_token` takes precedence over an already present `api-access-token`.
/// In case `api_access_token` carries multiple values, the first one is used and all of them are
/// removed. No other header is touched. Applying this function twice has the same effect as
/// applying it once.
pub fn normalize_headers(headers: &mut HeaderMap) -> Normalization {
    let Some(token) = headers.remove(&API_ACCESS_TOKEN_UNDERSCORE) else {
        return if headers.contains_key(&API_ACCESS_TOKEN) {
            Normalization::AlreadyNormalized
        } else {
            debug!("Request carries no API access token, leaving headers untouched");
            Normalization::MissingCredential
        };
    };

    if let Some(previous) = headers.insert(API_ACCESS_TOKEN, token) {
        // Never log the values themselves, only whether they disagreed
        let replaced_value_differs = headers.get(&API_ACCESS_TOKEN) != Some(&previous);
        if replaced_value_differs {
            warn!(
                "Request carried both {API_ACCESS_TOKEN_UNDERSCORE} and {API_ACCESS_TOKEN} with different values, \
                using the value of {API_ACCESS_TOKEN_UNDERSCORE}"
            );
        }
    }
    debug!(
        from = %API_ACCESS_TOKEN_UNDERSCORE,
        to = %API_ACCESS_TOKEN,
        "Renamed API access token header"
    );

    Normalization::Renamed
}

/// Normalizes the credential header of the given request (see [`normalize_headers`]) and hands
/// the very same request back.
pub fn normalize<R: OutgoingRequest>(mut request: R) -> R {
    normalize_headers(request.headers_mut());
    request
}

#[cfg(test)]
mod tests {
    use http::{
        HeaderValue, Method, Request,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    };
    use rstest::rstest;

    use super::*;

    fn headers(entries: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for &(name, value) in entries {
            headers.append(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        headers
    }

    #[rstest]
    #[case::underscore_only(
        &[("api_access_token", "v")],
        &[("api-access-token", "v")],
        Normalization::Renamed
    )]
    #[case::hyphen_only(
        &[("api-access-token", "v")],
        &[("api-access-token", "v")],
        Normalization::AlreadyNormalized
    )]
    #[case::neither(
        &[("content-type", "application/json")],
        &[("content-type", "application/json")],
        Normalization::MissingCredential
    )]
    #[case::empty(&[], &[], Normalization::MissingCredential)]
    #[case::both_underscore_wins(
        &[("api_access_token", "v1"), ("api-access-token", "v2")],
        &[("api-access-token", "v1")],
        Normalization::Renamed
    )]
    #[case::both_same_value(
        &[("api_access_token", "v"), ("api-access-token", "v")],
        &[("api-access-token", "v")],
        Normalization::Renamed
    )]
    #[case::first_of_multiple_values(
        &[("api_access_token", "first"), ("api_access_token", "second")],
        &[("api-access-token", "first")],
        Normalization::Renamed
    )]
    #[case::other_headers_untouched(
        &[("accept", "*/*"), ("api_access_token", "v"), ("x-custom", "a"), ("x-custom", "b")],
        &[("accept", "*/*"), ("api-access-token", "v"), ("x-custom", "a"), ("x-custom", "b")],
        Normalization::Renamed
    )]
    fn test_normalize_headers(
        #[case] input: &[(&'static str, &'static str)],
        #[case] expected: &[(&'static str, &'static str)],
        #[case] expected_outcome: Normalization,
    ) {
        let mut actual = headers(input);
        assert_eq!(normalize_headers(&mut actual), expected_outcome);
        assert_eq!(actual, headers(expected));
        assert!(!actual.contains_key("api_access_token"));
    }

    #[rstest]
    #[case(&[("api_access_token", "v")])]
    #[case(&[("api-access-token", "v")])]
    #[case(&[("api_access_token", "v1"), ("api-access-token", "v2")])]
    #[case(&[("authorization", "Bearer foo")])]
    #[case(&[])]
    fn test_idempotent(#[case] input: &[(&'static str, &'static str)]) {
        let once = normalize(headers(input));
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"API_ACCESS_TOKEN").unwrap(),
            HeaderValue::from_static("tok-123"),
        );

        assert_eq!(normalize_headers(&mut headers), Normalization::Renamed);
        assert_eq!(headers.get("api-access-token").unwrap(), "tok-123");
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_contacts_request() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/v1/accounts/1/contacts")
            .header("api_access_token", "tok-123")
            .header(ACCEPT, "application/json")
            .body("body".to_owned())
            .unwrap();

        let request = normalize(request);

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.uri(), "/api/v1/accounts/1/contacts");
        assert_eq!(request.body(), "body");
        assert_eq!(request.headers().get("api-access-token").unwrap(), "tok-123");
        assert_eq!(request.headers().get(ACCEPT).unwrap(), "application/json");
        assert!(!request.headers().contains_key("api_access_token"));
        assert_eq!(request.headers().len(), 2);
    }

    #[test]
    fn test_ping_request_without_credentials() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/v1/ping")
            .body(())
            .unwrap();

        let request = normalize(request);

        assert_eq!(request.uri(), "/api/v1/ping");
        assert!(request.headers().is_empty());
    }

    #[test]
    fn test_sensitive_flag_is_kept() {
        let mut token = HeaderValue::from_static("tok-123");
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_ACCESS_TOKEN_UNDERSCORE, token);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        normalize_headers(&mut headers);

        assert!(headers.get(API_ACCESS_TOKEN).unwrap().is_sensitive());
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Basic Zm9v");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
    }
}
