use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

/// Isolated HOME and config dir so no user config leaks into a run
pub struct TestEnv {
    tmp: TempDir,
    pub home: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");
        Self { tmp, home }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("moveaudit");
        cmd.env("HOME", &self.home)
            .env("XDG_CONFIG_HOME", self.home.join(".config"))
            .env_remove("MOVEAUDIT_CONFIG")
            .env_remove("MOVEAUDIT_LOG")
            .env_remove("MOVEAUDIT_LOG_FILE");
        cmd
    }
}

/// A local address with nothing listening on it
pub fn refused_endpoint() -> String {
    let addr: SocketAddr = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local addr")
    };
    format!("http://{}", addr)
}

/// One-shot Ollama-style responder
pub struct MockBackend {
    pub endpoint: String,
    handle: JoinHandle<String>,
}

impl MockBackend {
    /// Reply 200 with `{"response": completion}`
    pub fn completion(completion: &str) -> Self {
        let body = serde_json::json!({
            "model": "deepseek-coder:1.3b",
            "response": completion,
            "done": true,
        })
        .to_string();
        Self::raw("200 OK", &body)
    }

    pub fn raw(status: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let endpoint = format!("http://{}", listener.local_addr().expect("local addr"));
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let request = read_request_body(&stream);
            stream.write_all(response.as_bytes()).expect("write response");
            stream.flush().expect("flush");
            request
        });
        Self { endpoint, handle }
    }

    /// JSON body of the request the backend received
    pub fn request(self) -> serde_json::Value {
        let body = self.handle.join().expect("mock backend thread");
        serde_json::from_str(&body).expect("request body is JSON")
    }
}

fn read_request_body(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read header");
        if line == "\r\n" || line.is_empty() {
            break;
        }
        if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = v.trim().parse().expect("content length");
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).expect("read body");
    String::from_utf8(body).expect("utf-8 body")
}
