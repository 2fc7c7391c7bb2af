//! Shared fixtures: a scripted HTTP server, a recording transport and an
//! in-memory host directory.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cm_02_establish_connection::{PartnerForm, PartnerTransport, TransportError};
use cm_03_partner_handler::{DirectoryError, PartnerClientLink, PartnerDirectory};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const SECRET: &str = "campminder-shared-secret";
pub const BUSINESS_PARTNER_ID: &str = "BP-42";

/// XML reply in the shape CampMinder sends.
pub fn reply(status: &str, details: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <responseObject version=\"1\">\n  \
         <status>{}</status>\n  \
         <details>{}</details>\n\
         </responseObject>\n",
        status, details
    )
}

// =============================================================================
// Stub HTTP Server
// =============================================================================

/// One request as seen on the wire.
#[derive(Clone, Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    /// Value of a urlencoded form field in the body.
    pub fn form_value(&self, name: &str) -> Option<String> {
        self.body.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }

    /// Header value, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }
}

/// What the stub does with each connection.
#[derive(Clone)]
enum Script {
    Respond { status: u16, body: String },
    /// Read the request and never answer
    Hang,
}

/// Local HTTP/1.1 server answering every request with one canned response.
pub struct StubServer {
    url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    pub async fn respond(status: u16, body: impl Into<String>) -> io::Result<Self> {
        Self::start(Script::Respond {
            status,
            body: body.into(),
        })
        .await
    }

    pub async fn hang() -> io::Result<Self> {
        Self::start(Script::Hang).await
    }

    async fn start(script: Script) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}/api/entity/partnerclient/", listener.local_addr()?);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = recorded.clone();
                let script = script.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, script, recorded).await;
                });
            }
        });

        Ok(Self {
            url,
            requests,
            task,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `host:port` of the listener.
    pub fn authority(&self) -> &str {
        self.url
            .trim_start_matches("http://")
            .split('/')
            .next()
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    script: Script,
    recorded: Arc<Mutex<Vec<CapturedRequest>>>,
) -> io::Result<()> {
    let request = read_request(&mut stream).await?;
    recorded.lock().unwrap().push(request);

    match script {
        Script::Respond { status, body } => {
            let response = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await?;
            stream.shutdown().await
        }
        Script::Hang => {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            Ok(())
        }
    }
}

async fn read_request(stream: &mut TcpStream) -> io::Result<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).into_owned();
            let body_start = end + 4;
            let length = content_length(&head);
            if buf.len() >= body_start + length {
                let body =
                    String::from_utf8_lossy(&buf[body_start..body_start + length]).into_owned();
                return Ok(CapturedRequest { head, body });
            }
        }
    }

    Ok(CapturedRequest {
        head: String::from_utf8_lossy(&buf).into_owned(),
        body: String::new(),
    })
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            if key.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}

// =============================================================================
// Recording Transport
// =============================================================================

/// Transport that answers from memory and records every form.
#[derive(Clone)]
pub struct RecordingTransport {
    body: String,
    forms: Arc<Mutex<Vec<PartnerForm>>>,
}

impl RecordingTransport {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            forms: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn forms(&self) -> Vec<PartnerForm> {
        self.forms.lock().unwrap().clone()
    }
}

#[async_trait]
impl PartnerTransport for RecordingTransport {
    async fn post_form(&self, form: &PartnerForm) -> Result<String, TransportError> {
        self.forms.lock().unwrap().push(form.clone());
        Ok(self.body.clone())
    }
}

// =============================================================================
// In-memory Directory
// =============================================================================

struct Account {
    password: String,
    partner_client_id: Option<String>,
}

/// Host directory backed by a map of accounts.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
    links: Arc<Mutex<Vec<(PartnerClientLink, bool)>>>,
}

impl InMemoryDirectory {
    pub fn with_account(self, username: &str, password: &str, partner_client_id: Option<&str>) -> Self {
        self.accounts.lock().unwrap().insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                partner_client_id: partner_client_id.map(str::to_string),
            },
        );
        self
    }

    pub fn links(&self) -> Vec<(PartnerClientLink, bool)> {
        self.links.lock().unwrap().clone()
    }
}

#[async_trait]
impl PartnerDirectory for InMemoryDirectory {
    async fn valid_username_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, DirectoryError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(username)
            .is_some_and(|account| account.password == password))
    }

    async fn partner_client_id(&self, username: &str) -> Result<Option<String>, DirectoryError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(username)
            .and_then(|account| account.partner_client_id.clone()))
    }

    async fn store_partner_client(
        &self,
        link: &PartnerClientLink,
        connection_status: bool,
    ) -> Result<bool, DirectoryError> {
        self.links
            .lock()
            .unwrap()
            .push((link.clone(), connection_status));
        Ok(true)
    }
}
