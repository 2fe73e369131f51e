//! In-process `Transport` that replays scripted replies in call order.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use taskboard_core::{
    ApiClient, ClientConfig, HttpRequest, HttpResponse, ResponseBody, ResponseHead, Transport, TransportError,
};
use tokio::sync::oneshot;

pub const BASE_URL: &str = "http://taskboard.test";

pub enum Reply {
    Respond(HttpResponse),
    Fail(TransportError),
    /// Never answers.
    Hang,
    /// Answers when the test sends on the paired channel.
    Gate(oneshot::Receiver<HttpResponse>),
    /// Headers at once, body only after `delay`.
    SlowBody(HttpResponse, Duration),
    /// Headers at once, then the body read fails.
    BrokenBody(u16, TransportError),
}

pub enum ScriptedBody {
    Ready(String),
    Delayed(String, Duration),
    Broken(TransportError),
}

impl ResponseBody for ScriptedBody {
    async fn text(self) -> Result<String, TransportError> {
        match self {
            ScriptedBody::Ready(body) => Ok(body),
            ScriptedBody::Delayed(body, delay) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            ScriptedBody::Broken(err) => Err(err),
        }
    }
}

fn head(response: HttpResponse, body: impl FnOnce(String) -> ScriptedBody) -> ResponseHead<ScriptedBody> {
    ResponseHead {
        status: response.status,
        headers: response.headers,
        body: body(response.body),
    }
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn respond(&self, status: u16, body: &Value) {
        self.push(Reply::Respond(HttpResponse::json(status, body)));
    }

    pub fn respond_raw(&self, status: u16, body: &str) {
        self.push(Reply::Respond(HttpResponse::new(status, body)));
    }

    /// Queue a reply that is held back until the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<HttpResponse> {
        let (tx, rx) = oneshot::channel();
        self.push(Reply::Gate(rx));
        tx
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

impl Transport for ScriptedTransport {
    type Body = ScriptedBody;

    async fn send(&self, request: HttpRequest) -> Result<ResponseHead<ScriptedBody>, TransportError> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply left");
        match reply {
            Reply::Respond(response) => Ok(head(response, ScriptedBody::Ready)),
            Reply::Fail(err) => Err(err),
            Reply::Hang => std::future::pending().await,
            Reply::Gate(rx) => Ok(head(rx.await.expect("gate sender dropped"), ScriptedBody::Ready)),
            Reply::SlowBody(response, delay) => Ok(head(response, |body| ScriptedBody::Delayed(body, delay))),
            Reply::BrokenBody(status, err) => Ok(head(HttpResponse::new(status, ""), |_| ScriptedBody::Broken(err))),
        }
    }
}

pub fn scripted_client() -> Arc<ApiClient<ScriptedTransport>> {
    Arc::new(ApiClient::new(ClientConfig::new(BASE_URL), ScriptedTransport::default()))
}

pub fn url(path: &str) -> String {
    format!("{BASE_URL}{path}")
}
