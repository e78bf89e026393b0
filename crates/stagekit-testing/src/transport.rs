//! Scripted stand-in for the HTTP transport.
//!
//! Tests declare rules up front (`on`, `on_n`, `fail`) and assert on the
//! recorded requests afterwards. An unmatched request is an error, so a
//! test can never silently hit the network path it forgot to script.

use std::sync::Mutex;

use futures::future::BoxFuture;
use stagekit_runtime::{Error, Method, Request, Response, Result, Transport};

enum Reply {
    Response(Response),
    TransportError(String),
}

struct Rule {
    method: Method,
    url_contains: String,
    reply: Reply,
    /// `None` means the rule never runs out.
    remaining: Option<u32>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    rules: Mutex<Vec<Rule>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        ScriptedTransport::default()
    }

    /// Respond to every `method` request whose URL contains `fragment`.
    pub fn on(&self, method: Method, fragment: &str, response: Response) -> &Self {
        self.push(method, fragment, Reply::Response(response), None);
        self
    }

    /// Like [`ScriptedTransport::on`], but the rule is consumed after
    /// `times` matches; later requests fall through to the next rule.
    pub fn on_n(&self, method: Method, fragment: &str, response: Response, times: u32) -> &Self {
        self.push(method, fragment, Reply::Response(response), Some(times));
        self
    }

    /// Fail `method` requests whose URL contains `fragment` at the
    /// transport level (no response at all).
    pub fn fail(&self, method: Method, fragment: &str, message: &str) -> &Self {
        self.push(
            method,
            fragment,
            Reply::TransportError(message.to_string()),
            None,
        );
        self
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// How many executed requests match `method` + `fragment`.
    pub fn count(&self, method: Method, fragment: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url.contains(fragment))
            .count()
    }

    fn push(&self, method: Method, fragment: &str, reply: Reply, remaining: Option<u32>) {
        self.rules.lock().unwrap().push(Rule {
            method,
            url_contains: fragment.to_string(),
            reply,
            remaining,
        });
    }

    fn answer(&self, request: &Request) -> Result<Response> {
        let mut rules = self.rules.lock().unwrap();
        for rule in rules.iter_mut() {
            if rule.method != request.method || !request.url.contains(&rule.url_contains) {
                continue;
            }
            if let Some(remaining) = &mut rule.remaining {
                if *remaining == 0 {
                    continue;
                }
                *remaining -= 1;
            }
            return match &rule.reply {
                Reply::Response(response) => Ok(response.clone()),
                Reply::TransportError(message) => Err(Error::Transport(message.clone())),
            };
        }
        Err(Error::Transport(format!(
            "unscripted request: {:?} {}",
            request.method, request.url
        )))
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        self.requests.lock().unwrap().push(request.clone());
        let answer = self.answer(&request);
        Box::pin(async move { answer })
    }
}

/// A 200 response with a JSON body.
pub fn ok_json(body: &str) -> Response {
    Response {
        status: 200,
        body: body.to_string(),
        error_header: None,
    }
}

/// A bare status-code response.
pub fn status(code: u16) -> Response {
    Response {
        status: code,
        body: String::new(),
        error_header: None,
    }
}

/// A failed response carrying the admin API's `x-error` detail.
pub fn status_with_error(code: u16, detail: &str) -> Response {
    Response {
        status: code,
        body: String::new(),
        error_header: Some(detail.to_string()),
    }
}
