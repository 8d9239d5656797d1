//! In-memory host, fetcher, archive builders and a canned HTTP server shared by
//! the unit tests.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Mutex;
use std::thread;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{ApiError, Error, Result};
use crate::fetch::ArchiveFetcher;
use crate::github::{HostingApi, Release};
use crate::reference::RepoRef;

#[derive(Debug, Clone, Copy)]
pub(crate) enum FakeFailure {
    Unreachable,
    Status(u16),
}

impl FakeFailure {
    fn to_error(self) -> ApiError {
        match self {
            FakeFailure::Unreachable => ApiError::Unreachable {
                url: "https://api.github.com".to_string(),
                source: "connection refused".into(),
            },
            FakeFailure::Status(status) => ApiError::Status {
                url: "https://api.github.com".to_string(),
                status,
            },
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeHost {
    release: Mutex<Option<Release>>,
    default_branch: Option<String>,
    heads: Mutex<HashMap<String, String>>,
    failure: Option<FakeFailure>,
    calls: AtomicUsize,
}

impl FakeHost {
    pub fn with_release(self, release: Release) -> Self {
        *self.release.lock().unwrap() = Some(release);
        self
    }

    pub fn with_default_branch(mut self, branch: &str) -> Self {
        self.default_branch = Some(branch.to_string());
        self
    }

    pub fn with_head(self, branch: &str, sha: &str) -> Self {
        self.set_head(branch, sha);
        self
    }

    pub fn failing(mut self, failure: FakeFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn set_release(&self, release: Release) {
        *self.release.lock().unwrap() = Some(release);
    }

    pub fn set_head(&self, branch: &str, sha: &str) {
        self.heads
            .lock()
            .unwrap()
            .insert(branch.to_string(), sha.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> std::result::Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

impl HostingApi for FakeHost {
    fn latest_release(&self, _repo: &RepoRef) -> std::result::Result<Option<Release>, ApiError> {
        self.enter()?;
        Ok(self.release.lock().unwrap().clone())
    }

    fn default_branch(&self, _repo: &RepoRef) -> std::result::Result<Option<String>, ApiError> {
        self.enter()?;
        Ok(self.default_branch.clone())
    }

    fn branch_head(
        &self,
        _repo: &RepoRef,
        branch: &str,
    ) -> std::result::Result<Option<String>, ApiError> {
        self.enter()?;
        Ok(self.heads.lock().unwrap().get(branch).cloned())
    }
}

/// Serves archives from memory; unknown URLs fail like a 404 download.
#[derive(Debug, Default)]
pub(crate) struct FakeFetcher {
    archives: Mutex<HashMap<String, Vec<u8>>>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn with_archive(self, url: &str, bytes: Vec<u8>) -> Self {
        self.set_archive(url, bytes);
        self
    }

    pub fn set_archive(&self, url: &str, bytes: Vec<u8>) {
        self.archives.lock().unwrap().insert(url.to_string(), bytes);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ArchiveFetcher for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.archives
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Download {
                url: url.to_string(),
                source: "404 Not Found".into(),
            })
    }
}

/// Builds a ZIP archive in memory. Entries with `None` content are directories.
pub(crate) fn build_zip(entries: &[(&str, Option<&str>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, entry) in entries {
        match entry {
            Some(content) => {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            None => zip.add_directory(*name, options).unwrap(),
        }
    }

    zip.finish().unwrap().into_inner()
}

/// Answers one connection per `(status, body)` pair, in order, on a local port.
///
/// Returns the server's base URL and a receiver yielding the head (request
/// line and headers) of every request received.
pub(crate) fn serve_http(replies: Vec<(u16, &'static str)>) -> (String, Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status, body) in replies {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };

            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let _ = tx.send(head);

            let reply = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(reply.as_bytes());
        }
    });

    (base, rx)
}

/// A base URL on which nothing is listening.
pub(crate) fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// A blocking client that ignores proxy settings from the environment.
pub(crate) fn local_http_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}
