//! Shared helpers for unit tests: a one-shot HTTP stub, inventory fixtures and
//! a minimal site source tree.
use crate::fetch::RawItem;
use serde_json::{json, Value};
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::JoinHandle;

/// A canned HTTP response.
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Serves each response once, in order, then stops. `finish` returns the raw
/// requests that were received.
pub struct StubServer {
    pub url: String,
    handle: JoinHandle<Vec<String>>,
}

impl StubServer {
    pub fn start(responses: Vec<StubResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub server addr");
        let handle = std::thread::spawn(move || {
            let mut requests = Vec::new();
            for response in responses {
                let (stream, _) = listener.accept().expect("accept stub connection");
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
                requests.push(read_request(&mut reader));
                let mut stream = stream;
                let reply = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    response.status,
                    response.body.len(),
                    response.body
                );
                stream.write_all(reply.as_bytes()).expect("write stub reply");
                stream.flush().expect("flush stub reply");
            }
            requests
        });
        Self {
            url: format!("http://{addr}"),
            handle,
        }
    }

    pub fn finish(self) -> Vec<String> {
        self.handle.join().expect("stub server thread")
    }
}

fn read_request(reader: &mut BufReader<std::net::TcpStream>) -> String {
    let mut head = String::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line).expect("read request line");
        if read == 0 || line == "\r\n" {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        head.push_str(&line);
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).expect("read request body");
    head.push_str("\r\n");
    head.push_str(&String::from_utf8_lossy(&body));
    head
}

/// A URL nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

pub fn raw(value: Value) -> RawItem {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture is not an object: {other}"),
    }
}

pub fn car(id: u64, merk: &str, model: &str, prijs: &str) -> RawItem {
    raw(json!({
        "id": id,
        "merk": merk,
        "model": model,
        "prijs": prijs,
        "km-stand": "12000",
        "bouwjaar": "2019",
    }))
}

pub const LISTING_TEMPLATE: &str = "<ul>{% for car in cars %}<li class=\"row\">{{ car.merk }} {{ car.model }}</li>{% endfor %}</ul><p>{{ total }} auto's</p>";
pub const DETAIL_TEMPLATE: &str = "<h1>{{ car.merk }} {{ car.model }}</h1>{{ car.description_html | safe }}<a href=\"{{ site_url }}/{{ listing_page }}\">terug</a>";
pub const FEATURED_TEMPLATE: &str = "<div class=\"featured\">{{ car.id }}</div>";
pub const BASE_INDEX: &str = "<html><body><!-- FEATURED_CARS --></body></html>";

pub fn write_file(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(path, text).expect("write fixture file");
}

/// Templates, base index, the default static dirs and one root file.
pub fn write_site(root: &Path) {
    write_file(root, "templates/voorraad.html", LISTING_TEMPLATE);
    write_file(root, "templates/auto-detail.html", DETAIL_TEMPLATE);
    write_file(root, "templates/featured-card.html", FEATURED_TEMPLATE);
    write_file(root, "index.html", BASE_INDEX);
    write_file(root, "assets/logo.svg", "<svg/>");
    write_file(root, "css/site.css", "body{}");
    write_file(root, "js/site.js", "console.log(1);");
    write_file(root, "robots.txt", "User-agent: *");
}
