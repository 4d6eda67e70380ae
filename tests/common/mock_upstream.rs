// In-process stand-in for the OAuth token endpoint, the fitness API and the Gemini API.
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Mutex;
use std::time::Duration;

pub const TOKEN_PATH: &str = "/token";
pub const AGGREGATE_PATH: &str = "/fitness/v1/users/me/dataset:aggregate";
pub const GENERATE_PATH_PREFIX: &str = "/v1beta/models/";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub api_key: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("Recorded body is not JSON")
    }
}

enum CannedBody {
    Json(Value),
    Text(String),
}

struct CannedResponse {
    status: u16,
    body: CannedBody,
    delay: Option<Duration>,
}

impl CannedResponse {
    fn json(status: u16, body: Value) -> Self {
        Self { status, body: CannedBody::Json(body), delay: None }
    }
}

struct MockState {
    token: Mutex<CannedResponse>,
    aggregate: Mutex<CannedResponse>,
    generate: Mutex<CannedResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockUpstream {
    pub address: String,
    state: web::Data<MockState>,
}

impl MockUpstream {
    pub fn start() -> MockUpstream {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        let state = web::Data::new(MockState {
            token: Mutex::new(CannedResponse::json(
                200,
                json!({
                    "access_token": "mock-access-token",
                    "expires_in": 3599,
                    "refresh_token": "mock-refresh-token",
                    "scope": "https://www.googleapis.com/auth/fitness.activity.read",
                    "token_type": "Bearer"
                }),
            )),
            aggregate: Mutex::new(CannedResponse::json(200, json!({ "bucket": [] }))),
            generate: Mutex::new(CannedResponse::json(200, gemini_text_response("No data to analyze."))),
            requests: Mutex::new(Vec::new()),
        });

        let server_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(server_state.clone())
                .default_service(web::to(respond))
        })
        .workers(1)
        .listen(listener)
        .expect("Failed to listen")
        .run();
        let _ = tokio::spawn(server);

        MockUpstream {
            address: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    pub fn set_token_response(&self, status: u16, body: Value) {
        *self.state.token.lock().unwrap() = CannedResponse::json(status, body);
    }

    pub fn set_aggregate_response(&self, status: u16, body: Value) {
        *self.state.aggregate.lock().unwrap() = CannedResponse::json(status, body);
    }

    /// Serve `body` verbatim as `text/plain`.
    pub fn set_aggregate_text_response(&self, status: u16, body: &str) {
        *self.state.aggregate.lock().unwrap() = CannedResponse {
            status,
            body: CannedBody::Text(body.to_string()),
            delay: None,
        };
    }

    /// Hold the aggregate response back for `delay` before answering.
    pub fn delay_aggregate_response(&self, delay: Duration) {
        self.state.aggregate.lock().unwrap().delay = Some(delay);
    }

    pub fn set_generate_response(&self, status: u16, body: Value) {
        *self.state.generate.lock().unwrap() = CannedResponse::json(status, body);
    }

    pub fn requests_to(&self, path_prefix: &str) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.path.starts_with(path_prefix))
            .cloned()
            .collect()
    }
}

pub fn gemini_text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

async fn respond(req: HttpRequest, body: String, state: web::Data<MockState>) -> HttpResponse {
    let path = req.path().to_string();
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        path: path.clone(),
        authorization: header("authorization"),
        api_key: header("x-goog-api-key"),
        body,
    });

    let canned = if path == TOKEN_PATH {
        &state.token
    } else if path == AGGREGATE_PATH {
        &state.aggregate
    } else if path.starts_with(GENERATE_PATH_PREFIX) {
        &state.generate
    } else {
        return HttpResponse::NotFound().finish();
    };

    // Copy out before awaiting so the lock is not held across the delay
    let (status, body, delay) = {
        let canned = canned.lock().unwrap();
        let body = match &canned.body {
            CannedBody::Json(value) => CannedBody::Json(value.clone()),
            CannedBody::Text(text) => CannedBody::Text(text.clone()),
        };
        (canned.status, body, canned.delay)
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let status = actix_web::http::StatusCode::from_u16(status).unwrap();
    match body {
        CannedBody::Json(value) => HttpResponse::build(status).json(value),
        CannedBody::Text(text) => HttpResponse::build(status).content_type("text/plain").body(text),
    }
}
