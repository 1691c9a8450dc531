//! Scripted `Transport` fakes for unit tests.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};

/// Replays queued outcomes in order and records every request it receives.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<HttpResponse, String>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.outcomes.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }));
    }

    pub(crate) fn fail(&self, reason: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(reason.to_string()));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(reason)) => Err(ApiError::Transport(reason)),
            None => Err(ApiError::Transport("no scripted response".to_string())),
        }
    }
}

/// Holds each call until the test releases it, so calls can be made to
/// overlap and finish in a chosen order.
///
/// Calls take their scripted response in arrival order. Every call reports
/// its arrival index on the channel returned by `new` before blocking.
pub(crate) struct GatedTransport {
    gates: Mutex<VecDeque<(Receiver<()>, HttpResponse)>>,
    arrivals: Mutex<Sender<usize>>,
    arrived: Mutex<usize>,
}

impl GatedTransport {
    pub(crate) fn new() -> (Self, Receiver<usize>) {
        let (arrivals, arrived_rx) = mpsc::channel();
        let transport = Self {
            gates: Mutex::new(VecDeque::new()),
            arrivals: Mutex::new(arrivals),
            arrived: Mutex::new(0),
        };
        (transport, arrived_rx)
    }

    /// Queue a 200 response for the next call; it is returned once the
    /// returned sender fires.
    pub(crate) fn hold(&self, body: &str) -> Sender<()> {
        let (release, gate) = mpsc::channel();
        self.gates.lock().unwrap().push_back((
            gate,
            HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: body.to_string(),
            },
        ));
        release
    }
}

impl Transport for GatedTransport {
    fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let Some((gate, response)) = self.gates.lock().unwrap().pop_front() else {
            return Err(ApiError::Transport("no gated response".to_string()));
        };
        let index = {
            let mut arrived = self.arrived.lock().unwrap();
            *arrived += 1;
            *arrived - 1
        };
        self.arrivals.lock().unwrap().send(index).unwrap();
        gate.recv()
            .map_err(|_| ApiError::Transport("gate dropped".to_string()))?;
        Ok(response)
    }
}
