//! Serveur HTTP minimal en process pour les tests d'intégration.
//!
//! Sert des réponses statiques par (méthode, chemin) et enregistre chaque
//! requête reçue pour que les tests puissent vérifier en-têtes et corps.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// En-têtes, clés en minuscules.
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: u16,
    reason: &'static str,
    body: String,
}

pub struct TestServer {
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct TestServerBuilder {
    routes: HashMap<(String, String), CannedResponse>,
}

impl TestServer {
    pub fn builder() -> TestServerBuilder {
        TestServerBuilder {
            routes: HashMap::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_matching(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

impl TestServerBuilder {
    pub fn route(mut self, method: &str, path: &str, status: u16, body: &str) -> Self {
        let reason = match status {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "",
        };
        self.routes.insert(
            (method.to_string(), path.to_string()),
            CannedResponse {
                status,
                reason,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn spawn(self) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
        let port = listener.local_addr().expect("local addr").port();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let routes = self.routes;
        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let routes = routes.clone();
                let recorded = Arc::clone(&recorded);
                thread::spawn(move || handle_connection(stream, &routes, &recorded));
            }
        });

        TestServer { port, requests }
    }
}

fn handle_connection(
    stream: TcpStream,
    routes: &HashMap<(String, String), CannedResponse>,
    recorded: &Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() || request_line.is_empty() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("").to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() {
            return;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body_bytes = vec![0u8; content_length];
    if content_length > 0 && reader.read_exact(&mut body_bytes).is_err() {
        return;
    }
    let body = String::from_utf8_lossy(&body_bytes).to_string();

    recorded.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        headers,
        body,
    });

    let response = routes
        .get(&(method, path))
        .cloned()
        .unwrap_or(CannedResponse {
            status: 404,
            reason: "Not Found",
            body: String::new(),
        });

    let mut stream = reader.into_inner();
    let payload = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/xml; charset=\"utf-8\"\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        response.reason,
        response.body.len(),
        response.body
    );
    let _ = stream.write_all(payload.as_bytes());
    let _ = stream.flush();
}
