use std::error::Error;
use std::io::Cursor;

use async_trait::async_trait;
use http::{header, StatusCode};
use tokio::net::tcp::OwnedWriteHalf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use micro_h1::connection::ResponseWriter;
use micro_h1::handler::Handler;
use micro_h1::protocol::{HeaderMap, Request, SendError};
use micro_h1::server::Server;

const DEFAULT_PORT: u16 = 42069;

/// Upper bound on generated lines per `/stream/<n>` request, as httpbin does.
const MAX_STREAM_LINES: usize = 100;

const BAD_REQUEST_PAGE: &str = "<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>";

const SERVER_ERROR_PAGE: &str = "<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Okay, you know what? This one is on me.</p>
  </body>
</html>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let port = match std::env::args().nth(1) {
        Some(port) => port.parse::<u16>()?,
        None => DEFAULT_PORT,
    };

    let server = Server::builder().address(("127.0.0.1", port)).handler(Router).build()?;

    info!(port, "server starting");
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(cause = %e, "failed to listen for ctrl-c");
        }
    };
    server.start_with_shutdown(shutdown).await?;
    info!("server gracefully stopped");

    Ok(())
}

struct Router;

#[async_trait]
impl Handler<OwnedWriteHalf> for Router {
    type Error = SendError;

    async fn call(&self, request: Request, writer: &mut ResponseWriter<OwnedWriteHalf>) -> Result<(), Self::Error> {
        let target = request.target();

        if target == "/yourproblem" {
            return writer.send(StatusCode::BAD_REQUEST, &html(), BAD_REQUEST_PAGE.as_bytes()).await;
        }

        if target == "/myproblem" {
            return writer.send(StatusCode::INTERNAL_SERVER_ERROR, &html(), SERVER_ERROR_PAGE.as_bytes()).await;
        }

        if let Some(lines) = target.strip_prefix("/stream/") {
            let Ok(lines) = lines.parse::<usize>() else {
                return writer.send_with_default_headers(StatusCode::BAD_REQUEST, b"line count must be a number").await;
            };
            return writer.send_from_stream(StatusCode::OK, Cursor::new(json_lines(target, lines))).await;
        }

        writer.send_empty(StatusCode::OK).await
    }
}

fn html() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.set(header::CONTENT_TYPE, mime::TEXT_HTML.as_ref());
    headers
}

fn json_lines(target: &str, lines: usize) -> Vec<u8> {
    (0..lines.min(MAX_STREAM_LINES)).map(|id| format!("{{\"id\": {id}, \"url\": \"{target}\"}}\n")).collect::<String>().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_line_count_is_capped() {
        let body = json_lines("/stream/3", 3);
        assert_eq!(body.iter().filter(|b| **b == b'\n').count(), 3);

        let body = json_lines("/stream/18446744073709551615", usize::MAX);
        assert_eq!(body.iter().filter(|b| **b == b'\n').count(), MAX_STREAM_LINES);
    }
}
