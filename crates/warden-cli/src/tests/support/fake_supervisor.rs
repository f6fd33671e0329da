//! Fake supervisor for behavioural tests.
//!
//! Listens on an ephemeral TCP port, records every request it reads, and
//! answers from a [`Script`]. Commands such as `status` and `kill` open more
//! than one connection, so connections are served one after another until the
//! harness stops the server or it sits idle.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use warden_protocol::{LogChannel, LogEvent, Message, ProcessInfo, Request};

const IDLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Canned supervisor behaviour.
#[derive(Debug, Clone)]
pub(in crate::tests) struct Script {
    /// Answer to `ping`.
    pub running: bool,
    /// When set, `kill`, `dump_processes`, and `restore_processes` fail with
    /// this message.
    pub failure: Option<String>,
    /// Answer to `find_process_info_by_pid`.
    pub process: Option<ProcessInfo>,
    /// Published once every log channel is subscribed, before the
    /// connection closes.
    pub events: Vec<LogEvent>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            running: true,
            failure: None,
            process: None,
            events: Vec::new(),
        }
    }
}

pub(in crate::tests) struct FakeSupervisor {
    port: u16,
    requests: Arc<Mutex<Vec<Request>>>,
    result: Arc<Mutex<Option<Result<()>>>>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeSupervisor {
    /// Spawns a fake supervisor listening on an ephemeral TCP port.
    pub fn spawn(script: Script) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake supervisor")?;
        listener
            .set_nonblocking(true)
            .context("fake supervisor nonblocking")?;
        let port = listener.local_addr().context("local addr")?.port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let result = Arc::new(Mutex::new(None));
        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let requests = Arc::clone(&requests);
            let result = Arc::clone(&result);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let outcome = serve(&listener, &script, &requests, &stop);
                if let Ok(mut guard) = result.lock() {
                    *guard = Some(outcome);
                }
            })
        };
        Ok(Self {
            port,
            requests,
            result,
            stop,
            handle: Some(handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Stops the server and returns every request it received, in order.
    pub fn take_requests(&mut self) -> Result<Vec<Request>> {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake supervisor thread panicked"))?;
        }
        if let Some(outcome) = self
            .result
            .lock()
            .map_err(|error| anyhow!("lock fake supervisor result: {error}"))?
            .take()
        {
            outcome.context("fake supervisor failed")?;
        }
        let requests = self
            .requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        Ok(requests.clone())
    }
}

impl Drop for FakeSupervisor {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(
    listener: &TcpListener,
    script: &Script,
    requests: &Mutex<Vec<Request>>,
    stop: &AtomicBool,
) -> Result<()> {
    let mut deadline = Instant::now() + IDLE_TIMEOUT;
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                serve_connection(stream, script, requests)?;
                deadline = Instant::now() + IDLE_TIMEOUT;
            }
            Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => {
                if stop.load(Ordering::SeqCst) || Instant::now() >= deadline {
                    return Ok(());
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(error) => return Err(error).context("accept connection"),
        }
    }
}

fn serve_connection(
    stream: TcpStream,
    script: &Script,
    requests: &Mutex<Vec<Request>>,
) -> Result<()> {
    stream
        .set_nonblocking(false)
        .context("blocking connection")?;
    stream
        .set_read_timeout(Some(IDLE_TIMEOUT))
        .context("connection read timeout")?;
    let mut writer = stream.try_clone().context("clone stream")?;
    let mut reader = BufReader::new(stream);
    let mut subscriptions = 0;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).context("read request")? == 0 {
            return Ok(());
        }
        let request: Request = serde_json::from_str(line.trim()).context("decode request")?;
        requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?
            .push(request.clone());

        let reply = match request {
            Request::Disconnect => return Ok(()),
            Request::Ping => Message::Pong {
                running: script.running,
            },
            Request::Kill { .. } | Request::DumpProcesses | Request::RestoreProcesses => {
                script
                    .failure
                    .clone()
                    .map_or(Message::Ack, |message| Message::Error { message })
            }
            Request::FindProcessInfoByPid { .. } => Message::ProcessInfo {
                process: script.process.clone(),
            },
            Request::Subscribe { .. } => {
                subscriptions += 1;
                Message::Ack
            }
        };
        write_message(&mut writer, &reply)?;

        if subscriptions == LogChannel::ALL.len() {
            for event in &script.events {
                write_message(&mut writer, &Message::Event(event.clone()))?;
            }
            return Ok(());
        }
    }
}

fn write_message(stream: &mut impl Write, message: &Message) -> Result<()> {
    let line = serde_json::to_string(message).context("encode message")?;
    stream
        .write_all(line.as_bytes())
        .and_then(|()| stream.write_all(b"\n"))
        .and_then(|()| stream.flush())
        .context("write message")
}
