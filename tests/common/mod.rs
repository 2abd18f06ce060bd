//! Shared test infrastructure for integration tests.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread::JoinHandle;
use tempfile::TempDir;

/// A site source tree in a temp dir, plus helpers to run `showroom` on it.
pub struct SiteFixture {
    pub dir: TempDir,
}

impl SiteFixture {
    /// Templates, base index, static dirs and a root file.
    pub fn new() -> anyhow::Result<Self> {
        let fixture = Self {
            dir: TempDir::new()?,
        };
        fixture.write(
            "templates/layout.html",
            "<html><body>{% block body %}{% endblock body %}</body></html>",
        )?;
        fixture.write(
            "templates/voorraad.html",
            "{% extends \"layout.html\" %}{% block body %}<ul>{% for car in cars %}<li class=\"row\"><a href=\"{{ car.detail_url }}\">{{ car.merk }} {{ car.model }}</a> {{ car.km_display }} km</li>{% endfor %}</ul><p>{{ total }}</p>{% endblock body %}",
        )?;
        fixture.write(
            "templates/auto-detail.html",
            "{% extends \"layout.html\" %}{% block body %}<h1>{{ car.merk }} {{ car.model }}</h1>{% if car.sold %}<span>Verkocht</span>{% endif %}{{ car.description_html | safe }}{% for group in car.spec_groups %}<h2>{{ group.label }}: {{ group.value }}</h2>{% endfor %}{% endblock body %}",
        )?;
        fixture.write(
            "templates/featured-card.html",
            "<article>{{ car.merk }} {{ car.model }}</article>",
        )?;
        fixture.write(
            "index.html",
            "<html><body><section><!-- FEATURED_CARS --></section></body></html>",
        )?;
        fixture.write("assets/img/logo.svg", "<svg/>")?;
        fixture.write("css/site.css", "body{}")?;
        fixture.write("js/site.js", "console.log(1);")?;
        fixture.write("contact.html", "<html>contact</html>")?;
        Ok(fixture)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn out(&self) -> PathBuf {
        self.root().join("site")
    }

    pub fn write(&self, rel: &str, text: &str) -> anyhow::Result<()> {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn read_out(&self, rel: &str) -> anyhow::Result<String> {
        let path = self.out().join(rel);
        std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
    }

    /// Run `showroom <args> --source <root>`.
    pub fn run(&self, args: &[&str]) -> anyhow::Result<Output> {
        let output = Command::new(env!("CARGO_BIN_EXE_showroom"))
            .args(args)
            .arg("--source")
            .arg(self.root())
            .env_remove("SHOWROOM_LOG")
            .env_remove("SHOWROOM_UPLOAD_TOKEN")
            .output()?;
        Ok(output)
    }
}

/// Serves one JSON body to a single request.
pub struct InventoryServer {
    pub url: String,
    handle: JoinHandle<()>,
}

impl InventoryServer {
    pub fn start(body: String) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let url = format!("http://{}/get_cars_js", listener.local_addr()?);
        let handle = std::thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let Ok(clone) = stream.try_clone() else {
                return;
            };
            let mut reader = BufReader::new(clone);
            let mut line = String::new();
            while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let reply = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(reply.as_bytes());
        });
        Ok(Self { url, handle })
    }

    pub fn join(self) {
        let _ = self.handle.join();
    }
}
