use std::path::PathBuf;

use clap::Parser;
use http::Method;

/// Sends a single request to the chat platform API, making sure the credential header is named in
/// a way the platform's reverse proxy accepts.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file that contains the platform endpoint and credentials.
    #[arg(short, long)]
    pub config_file: PathBuf,

    /// HTTP method to use.
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: Method,

    /// JSON body to send along with the request.
    #[arg(short, long)]
    pub data: Option<String>,

    /// Request path, relative to the configured endpoint, e.g. `api/v1/accounts/1/contacts`.
    pub path: String,
}
