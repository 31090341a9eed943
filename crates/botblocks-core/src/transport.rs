use async_trait::async_trait;
use std::time::Duration;

use crate::error::{BotError, Result};
use crate::request::{Method, RobotRequest};

/// How the robot answered a request that reached it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
}

impl Reply {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `→ OK` or `→ ERR <status>`.
    pub fn log_line(&self) -> String {
        if self.is_ok() {
            "→ OK".to_string()
        } else {
            format!("→ ERR {}", self.status)
        }
    }
}

/// Sends one request to the robot.
///
/// Any HTTP status counts as a completed call. `Err` is reserved for calls
/// that never completed: timeouts, DNS failures, refused connections.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, base_url: &str, request: &RobotRequest) -> Result<Reply>;
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, base_url: &str, request: &RobotRequest) -> Result<Reply> {
        let url = request.url(base_url);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self
                .client
                .post(&url)
                .header(
                    reqwest::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(request.body().unwrap_or_default()),
        };
        let response = builder
            .send()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(Reply {
            status: response.status().as_u16(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Block;
    use crate::request::Step;
    use crate::types::Direction;
    use mockito::Matcher;

    fn request_for(block: Block) -> RobotRequest {
        match Step::for_block(&block) {
            Step::Request(req) => req,
            Step::Sleep(_) => unreachable!(),
        }
    }

    #[tokio::test]
    async fn post_sends_form_encoded_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/motor")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("l".into(), "back".into()),
                Matcher::UrlEncoded("r".into(), "back".into()),
                Matcher::UrlEncoded("ms".into(), "1500".into()),
            ]))
            .with_status(200)
            .create_async()
            .await;

        let transport = HttpTransport::new(None).unwrap();
        let req = request_for(Block::Move {
            direction: Direction::Backward,
            seconds: Some(1.5f64.into()),
        });
        let reply = transport.send(&server.url(), &req).await.unwrap();
        assert!(reply.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_sends_query_string() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/note")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "E5".into()),
                Matcher::UrlEncoded("beats".into(), "0.5".into()),
            ]))
            .with_status(200)
            .create_async()
            .await;

        let transport = HttpTransport::new(None).unwrap();
        let req = request_for(Block::Note {
            name: "E5".into(),
            beats: Some(0.5f64.into()),
        });
        transport.send(&server.url(), &req).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_still_a_reply() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/beep")
            .with_status(503)
            .create_async()
            .await;

        let transport = HttpTransport::new(None).unwrap();
        let reply = transport
            .send(&server.url(), &RobotRequest::get("/beep"))
            .await
            .unwrap();
        assert_eq!(reply.status, 503);
        assert_eq!(reply.log_line(), "→ ERR 503");
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let transport = HttpTransport::new(Some(Duration::from_secs(2))).unwrap();
        let err = transport
            .send("http://127.0.0.1:1", &RobotRequest::get("/beep"))
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Transport(_)));
    }
}
