use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use firewatch::detector::{Classifier, Prediction};
use image::{DynamicImage, ImageBuffer, Rgb};

/// Writes a small flame-colored frame to the given path. Format is taken
/// from the extension.
pub fn write_test_frame(path: &Path) -> anyhow::Result<()> {
    let img = ImageBuffer::from_fn(64, 48, |x, y| {
        Rgb([220u8, (80 + (x % 60)) as u8, (20 + (y % 30)) as u8])
    });
    img.save(path)?;
    Ok(())
}

/// Classifier stub that always reports the same confidence.
pub struct FixedScoreClassifier(pub f32);

impl Classifier for FixedScoreClassifier {
    fn classify(&self, _frame: &DynamicImage) -> anyhow::Result<Prediction> {
        Ok(Prediction::from_score(self.0))
    }
}

/// A captured HTTP request, split into start line, headers and body.
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<String>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        let want = name.to_ascii_lowercase();
        self.headers.iter().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            (key.to_ascii_lowercase() == want).then(|| value.trim().to_string())
        })
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

/// One-shot backend stub: accepts a single request on a loopback port,
/// answers with the given status, and hands the captured request back.
pub fn spawn_backend_stub(status: u16) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub backend");
    let addr = listener.local_addr().expect("stub backend addr");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let captured = read_request(&mut stream);
            let reason = if status == 200 { "OK" } else { "Error" };
            let reply = format!(
                "HTTP/1.1 {} {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                status, reason
            );
            let _ = stream.write_all(reply.as_bytes());
            let _ = tx.send(captured);
        }
    });

    (format!("http://{}", addr), rx)
}

/// A loopback URL nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
    let addr = listener.local_addr().expect("probe listener addr");
    drop(listener);
    format!("http://{}/api/alert", addr)
}

fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stub stream"));

    let mut request_line = String::new();
    reader.read_line(&mut request_line).expect("request line");

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("header line");
        let line = line.trim_end().to_string();
        if line.is_empty() {
            break;
        }
        let lower = line.to_ascii_lowercase();
        if let Some(value) = lower.strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
        headers.push(line);
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).expect("request body");

    CapturedRequest {
        request_line: request_line.trim_end().to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}
