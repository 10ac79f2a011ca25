//! Dedicated decision thread per tank
//!
//! The loop never waits longer than the budget. A call that overruns keeps
//! running on its thread; its answer arrives with a stale sequence number
//! and is dropped. Dropping the worker closes its request channel, which
//! ends the thread once any call in progress returns.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde_json::Value;

use super::{Brain, Exchange, invoke, panic_message};
use crate::error::{DecisionFault, LoadFault};
use crate::sim::context::Context;

struct Request {
    seq: u64,
    ctx: Context,
}

struct Reply {
    seq: u64,
    result: Result<Value, DecisionFault>,
    elapsed: Duration,
}

pub(crate) struct Worker {
    requests: Option<Sender<Request>>,
    replies: Receiver<Reply>,
    seq: u64,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub(crate) fn spawn(team: &str, mut brain: Box<dyn Brain>) -> Result<Self, LoadFault> {
        let (req_tx, req_rx) = mpsc::channel::<Request>();
        let (rep_tx, rep_rx) = mpsc::channel::<Reply>();

        let handle = thread::Builder::new()
            .name(format!("brain-{team}"))
            .spawn(move || {
                for Request { seq, ctx } in req_rx {
                    let start = Instant::now();
                    let result = invoke(brain.as_mut(), &ctx);
                    let reply = Reply {
                        seq,
                        result,
                        elapsed: start.elapsed(),
                    };
                    if rep_tx.send(reply).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| LoadFault::Worker(e.to_string()))?;

        Ok(Self {
            requests: Some(req_tx),
            replies: rep_rx,
            seq: 0,
            handle: Some(handle),
        })
    }

    /// Send one snapshot and wait at most `budget` for its answer
    pub(crate) fn ask(&mut self, ctx: Context, budget: Duration) -> Exchange {
        self.seq += 1;
        let seq = self.seq;

        let Some(requests) = &self.requests else {
            return Exchange::Lost;
        };
        let start = Instant::now();
        if requests.send(Request { seq, ctx }).is_err() {
            return Exchange::Lost;
        }

        let deadline = start + budget;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.replies.recv_timeout(remaining) {
                Ok(reply) if reply.seq == seq => {
                    return Exchange::Answered {
                        result: reply.result,
                        elapsed: reply.elapsed,
                    };
                }
                // Late answer to an earlier tick
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => return Exchange::Overran(start.elapsed()),
                Err(RecvTimeoutError::Disconnected) => return Exchange::Lost,
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.requests = None;
        // Only join a thread that is idle; a runaway call is abandoned
        if let Some(handle) = self.handle.take().filter(JoinHandle::is_finished) {
            let name = handle.thread().name().unwrap_or("brain").to_string();
            if let Some(message) = reap(handle) {
                log::debug!("Worker {name} panicked outside a decision call: {message}");
            }
        }
    }
}

/// Join a finished thread, returning its panic message if it died panicking
fn reap(handle: JoinHandle<()>) -> Option<String> {
    handle.join().err().map(|payload| panic_message(payload.as_ref()))
}
