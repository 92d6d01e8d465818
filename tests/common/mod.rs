//! Scripted transport shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use curlreq::http::reason_phrase;
use curlreq::transport::{
    OptionId, OptionValue, TransferHandle, TransferInfo, TransferOutcome, TransferSink, Transport,
    TransportOptions,
};
use curlreq::{TransferCode, ValidationError};

/// What one `perform` call does.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub header_lines: Vec<String>,
    pub body: Vec<u8>,
    pub code: TransferCode,
    pub response_code: u32,
}

impl Attempt {
    /// A complete HTTP/1.1 exchange.
    pub fn ok(status: u32, headers: &[&str], body: &[u8]) -> Self {
        let mut header_lines = vec![format!("HTTP/1.1 {} {}\r\n", status, reason_phrase(status))];
        header_lines.extend(headers.iter().map(|h| format!("{}\r\n", h)));
        header_lines.push("\r\n".to_string());
        Self {
            header_lines,
            body: body.to_vec(),
            code: TransferCode::Ok,
            response_code: status,
        }
    }

    /// Gets partway through the headers, then times out.
    pub fn timeout(partial_header: &str) -> Self {
        Self {
            header_lines: vec![
                "HTTP/1.1 200 OK\r\n".to_string(),
                format!("{}\r\n", partial_header),
            ],
            body: b"partial".to_vec(),
            code: TransferCode::OperationTimedOut,
            response_code: 0,
        }
    }

    pub fn failure(code: TransferCode) -> Self {
        Self {
            header_lines: Vec::new(),
            body: Vec::new(),
            code,
            response_code: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub opened: u32,
    pub performs: u32,
    pub closed: u32,
    /// Options applied to the most recently opened handle, in order.
    pub options: Vec<(OptionId, OptionValue)>,
}

impl Recorded {
    pub fn option(&self, id: OptionId) -> Option<&OptionValue> {
        self.options
            .iter()
            .rev()
            .find(|(i, _)| *i == id)
            .map(|(_, v)| v)
    }
}

/// Plays attempts back in order; the last one repeats once the script runs out.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Attempt>>>,
    pub recorded: Arc<Mutex<Recorded>>,
    reject: Option<OptionId>,
}

impl ScriptedTransport {
    pub fn new(attempts: impl IntoIterator<Item = Attempt>) -> Self {
        Self {
            script: Arc::new(Mutex::new(attempts.into_iter().collect())),
            ..Default::default()
        }
    }

    /// Make `set_option` fail for `id`.
    pub fn rejecting(mut self, id: OptionId) -> Self {
        self.reject = Some(id);
        self
    }

    pub fn performs(&self) -> u32 {
        self.recorded.lock().unwrap().performs
    }

    pub fn closed(&self) -> u32 {
        self.recorded.lock().unwrap().closed
    }
}

impl Transport for ScriptedTransport {
    type Handle = ScriptedHandle;

    fn open(&self) -> ScriptedHandle {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.opened += 1;
        recorded.options.clear();
        ScriptedHandle {
            transport: self.clone(),
            options: TransportOptions::new(),
            last: None,
            open: true,
        }
    }
}

pub struct ScriptedHandle {
    transport: ScriptedTransport,
    options: TransportOptions,
    last: Option<Attempt>,
    open: bool,
}

impl ScriptedHandle {
    fn next_attempt(&self) -> Attempt {
        let mut script = self.transport.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script
                .front()
                .cloned()
                .unwrap_or_else(|| Attempt::failure(TransferCode::CouldntConnect))
        }
    }

    /// Request head the way libcurl would report it.
    fn header_out(&self) -> String {
        let method = match self.options.get(OptionId::CustomRequest) {
            Some(v) => v.as_text().unwrap_or("GET").to_string(),
            None if self.options.contains(OptionId::PostFields) => "POST".to_string(),
            None => "GET".to_string(),
        };
        let mut head = format!("{} / HTTP/1.1\r\nHost: localhost\r\n", method);
        if let Some(lines) = self.options.get(OptionId::HttpHeader).and_then(|v| v.as_list()) {
            for line in lines {
                head.push_str(line);
                head.push_str("\r\n");
            }
        }
        head.push_str("\r\n");
        head
    }
}

impl TransferHandle for ScriptedHandle {
    fn set_option(&mut self, id: OptionId, value: &OptionValue) -> Result<(), ValidationError> {
        if self.transport.reject == Some(id) {
            return Err(ValidationError::UnsupportedOption(id));
        }
        self.transport
            .recorded
            .lock()
            .unwrap()
            .options
            .push((id, value.clone()));
        self.options.set(id, value.clone());
        Ok(())
    }

    fn perform(&mut self, sink: &mut dyn TransferSink) -> TransferOutcome {
        self.transport.recorded.lock().unwrap().performs += 1;
        let attempt = self.next_attempt();

        for line in &attempt.header_lines {
            sink.header(line.as_bytes());
        }
        if !attempt.body.is_empty() {
            sink.write(&attempt.body);
        }

        let outcome = match attempt.code {
            TransferCode::Ok => TransferOutcome::ok(),
            code => TransferOutcome::failed(code, code.to_string()),
        };
        self.last = Some(attempt);
        outcome
    }

    fn info(&mut self) -> TransferInfo {
        let last = self.last.as_ref();
        let header_size = last
            .map(|a| a.header_lines.iter().map(|l| l.len() as u64).sum())
            .unwrap_or(0);
        let content_type = last.and_then(|a| {
            a.header_lines.iter().find_map(|l| {
                l.split_once(':')
                    .filter(|(n, _)| n.eq_ignore_ascii_case("content-type"))
                    .map(|(_, v)| v.trim().to_string())
            })
        });
        TransferInfo {
            effective_url: self
                .options
                .get(OptionId::Url)
                .and_then(|v| v.as_text())
                .map(str::to_owned),
            response_code: last.map(|a| a.response_code).unwrap_or(0),
            content_type,
            redirect_count: 0,
            redirect_url: None,
            header_size,
            header_out: Some(self.header_out()),
        }
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.transport.recorded.lock().unwrap().closed += 1;
        }
    }
}

impl Drop for ScriptedHandle {
    fn drop(&mut self) {
        self.close();
    }
}
