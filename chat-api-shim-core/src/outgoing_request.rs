use http::HeaderMap;

/// Anything that represents a not-yet-sent HTTP request whose headers can be adjusted before
/// transmission.
pub trait OutgoingRequest {
    fn headers_mut(&mut self) -> &mut HeaderMap;
}

impl OutgoingRequest for HeaderMap {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self
    }
}

impl<B> OutgoingRequest for http::Request<B> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        http::Request::headers_mut(self)
    }
}

impl OutgoingRequest for reqwest::Request {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        reqwest::Request::headers_mut(self)
    }
}
