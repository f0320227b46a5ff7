#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tallyscout::{CountError, CountResult, Reporter, Source, SourceCount, SourceCounter, WorkItem};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Keeps every report line in memory
#[derive(Default)]
pub struct RecordingReporter {
    pub counts: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn counts(&self) -> Vec<String> {
        let mut lines = self.counts.lock().unwrap().clone();
        lines.sort();
        lines
    }

    pub fn errors(&self) -> Vec<String> {
        let mut lines = self.errors.lock().unwrap().clone();
        lines.sort();
        lines
    }
}

impl Reporter for RecordingReporter {
    fn report_count(&self, item: &WorkItem, count: usize) {
        self.counts
            .lock()
            .unwrap()
            .push(tallyscout::pipeline::report::count_line(item, count));
    }

    fn report_error(&self, item: &WorkItem, error: &CountError) {
        self.errors
            .lock()
            .unwrap()
            .push(tallyscout::pipeline::report::error_line(item, error));
    }
}

/// Answers from a fixed table, optionally sleeping first, and records how
/// many counts run at the same time. Unknown items fail as missing files.
#[derive(Default)]
pub struct ScriptedCounter {
    answers: HashMap<String, (usize, Duration)>,
    running: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, item: &str, count: usize) -> Self {
        self.answers
            .insert(item.to_string(), (count, Duration::ZERO));
        self
    }

    pub fn slow_answer(mut self, item: &str, count: usize, delay: Duration) -> Self {
        self.answers.insert(item.to_string(), (count, delay));
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SourceCounter for ScriptedCounter {
    async fn count(&self, source: &Source) -> CountResult<SourceCount> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let key = match source {
            Source::Url(url) => url.as_str().to_string(),
            Source::File(path) => path.to_string_lossy().into_owned(),
        };
        let answer = self.answers.get(&key).copied();
        if let Some((_, delay)) = answer {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        self.running.fetch_sub(1, Ordering::SeqCst);
        match answer {
            Some((count, _)) => Ok(SourceCount::occurrences(count)),
            None => Err(CountError::file_not_found(key)),
        }
    }
}

pub fn lines(items: &[&str]) -> Vec<u8> {
    let mut input = items.join("\n").into_bytes();
    if !items.is_empty() {
        input.push(b'\n');
    }
    input
}

/// Serves every connection with the same HTTP response until dropped
pub async fn serve_http(status: &str, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let response = Arc::new(response);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let response = Arc::clone(&response);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    addr
}

/// Accepts connections and never answers
pub async fn serve_silence() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    addr
}
