use std::io::Read as _;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::Value;

#[derive(Debug, Clone, Copy)]
pub struct ApiStubConfig {
    pub fail_search: bool,
    pub fail_analysis: bool,
}

pub struct ApiStub {
    pub api_url: String,
    analyze_bodies: Arc<Mutex<Vec<Value>>>,
    search_queries: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ApiStub {
    pub fn spawn(config: ApiStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start api stub server");
        let addr = server.server_addr();
        let api_url = format!("http://{addr}/api");

        let analyze_bodies = Arc::new(Mutex::new(Vec::new()));
        let search_queries = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let bodies = Arc::clone(&analyze_bodies);
        let queries = Arc::clone(&search_queries);
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                let path = url.split('?').next().unwrap_or(&url).to_string();
                let method = request.method().clone();

                let (status, body) = match (method, path.as_str()) {
                    (tiny_http::Method::Get, "/api/health") => (200, "OK".to_owned()),
                    (tiny_http::Method::Get, "/api/books/search") => {
                        queries.lock().unwrap().push(url.clone());
                        if config.fail_search {
                            (500, String::new())
                        } else {
                            (200, search_response())
                        }
                    }
                    (tiny_http::Method::Post, "/api/bundle/analyze") => {
                        let mut raw = String::new();
                        if request.as_reader().read_to_string(&mut raw).is_err() {
                            let _ = request.respond(
                                tiny_http::Response::from_string("invalid request body")
                                    .with_status_code(400),
                            );
                            continue;
                        }
                        let parsed: Value = match serde_json::from_str(&raw) {
                            Ok(value) => value,
                            Err(_) => {
                                let _ = request.respond(
                                    tiny_http::Response::from_string("invalid json")
                                        .with_status_code(400),
                                );
                                continue;
                            }
                        };
                        bodies.lock().unwrap().push(parsed.clone());
                        if config.fail_analysis {
                            (500, String::new())
                        } else {
                            (200, analyze_response(&parsed))
                        }
                    }
                    _ => (404, "not found".to_owned()),
                };

                let mut response =
                    tiny_http::Response::from_string(body).with_status_code(status);
                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                response = response.with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            api_url,
            analyze_bodies,
            search_queries,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn analyze_bodies(&self) -> Vec<Value> {
        self.analyze_bodies.lock().unwrap().clone()
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.search_queries.lock().unwrap().clone()
    }
}

impl Drop for ApiStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn search_response() -> String {
    serde_json::json!([
        {
            "itemId": 8966260950u64,
            "isbn13": "9788966260959",
            "title": "Clean Code",
            "author": "Robert C. Martin",
            "publisher": "Insight",
            "priceStandard": 33000,
            "usedCount": 12,
            "usedMinPrice": 15000
        },
        { "itemId": 8966262473u64, "title": "Clean Architecture" }
    ])
    .to_string()
}

fn analyze_response(request: &Value) -> String {
    let books = request
        .get("books")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    let seller_books = books
        .iter()
        .map(|book| {
            serde_json::json!({
                "itemId": book.get("itemId").cloned().unwrap_or(Value::Null),
                "title": book.get("title").cloned().unwrap_or(Value::Null),
                "quality": "상",
                "price": 5000,
                "productUrl": "https://www.aladin.co.kr/shop/wproduct.aspx?ItemId=1"
            })
        })
        .collect::<Vec<_>>();

    serde_json::json!({
        "requestedBooks": books,
        "totalRequestedCount": books.len(),
        "sellers": [
            {
                "sellerCode": "SC1",
                "sellerName": "Stub Books",
                "sellerType": "전문셀러",
                "shopUrl": "https://www.aladin.co.kr/shop/usedshop/wshopitem.aspx?SC=SC1",
                "books": seller_books,
                "totalBookCount": books.len(),
                "totalPrice": 5000 * books.len()
            }
        ],
        "hasCompleteSeller": true,
        "analysisTimeMs": 7
    })
    .to_string()
}
