use crate::credential_header::{API_ACCESS_TOKEN, API_ACCESS_TOKEN_UNDERSCORE};

pub trait Sanitize {
    fn sanitize(&self) -> Self;
}

impl Sanitize for http::HeaderMap {
    fn sanitize(&self) -> Self {
        let mut sanitized = self.clone();
        for name in [
            http::header::AUTHORIZATION,
            API_ACCESS_TOKEN,
            API_ACCESS_TOKEN_UNDERSCORE,
        ] {
            // Header names can carry multiple values, all of them need to go
            if sanitized.contains_key(&name) {
                sanitized.insert(name, http::HeaderValue::from_static("<redacted>"));
            }
        }
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use http::{
        HeaderMap, HeaderValue,
        header::{CONTENT_LENGTH, HOST},
    };
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_sanitize() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, "example.com".parse().unwrap());
        headers.insert(CONTENT_LENGTH, "123".parse().unwrap());

        let sanitized = headers.sanitize();
        assert_eq!(sanitized, headers);

        headers.insert("Authorization", HeaderValue::from_static("secure"));
        let sanitized = headers.sanitize();
        assert_eq!(sanitized.get("Authorization").unwrap(), "<redacted>");

        // Also test lowercase variant
        headers.insert("authorization", HeaderValue::from_static("secure"));
        let sanitized = headers.sanitize();
        assert_eq!(sanitized.get("authorization").unwrap(), "<redacted>");
        assert_eq!(sanitized.get(HOST).unwrap(), "example.com");
    }

    #[rstest]
    #[case("api_access_token")]
    #[case("api-access-token")]
    #[case("API_ACCESS_TOKEN")]
    fn test_sanitize_api_access_token(#[case] header_name: &str) {
        let mut headers = HeaderMap::new();
        headers.append(
            http::HeaderName::from_bytes(header_name.as_bytes()).unwrap(),
            HeaderValue::from_static("tok-123"),
        );
        headers.append(
            http::HeaderName::from_bytes(header_name.as_bytes()).unwrap(),
            HeaderValue::from_static("tok-456"),
        );

        let sanitized = headers.sanitize();
        let values: Vec<_> = sanitized
            .get_all(header_name)
            .iter()
            .map(|value| value.to_str().unwrap())
            .collect();
        assert_eq!(values, vec!["<redacted>"]);
    }
}
