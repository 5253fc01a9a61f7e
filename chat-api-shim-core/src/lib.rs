pub mod config;
pub mod credential_header;
pub mod normalize_layer;
pub mod outgoing_request;
pub mod sanitization;
