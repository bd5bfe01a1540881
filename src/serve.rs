//! Local HTTP server for the interactive deck
//!
//! `surveydeck serve survey.json` → starts server, opens browser, drives the
//! gap view from one server-held [`ViewController`]. Requests are handled one
//! at a time, the same way UI events arrive.

use crate::config::DeckConfig;
use crate::model::{GapIndicator, SurveyData};
use crate::report::html::{self, Controls};
use crate::report::Deck;
use crate::slides::gaps::DimensionOption;
use crate::view::{ViewController, ViewEvent, ViewState};
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{info, warn};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(error: impl Into<String>) -> Self {
        Self { ok: false, data: None, error: Some(error.into()) }
    }
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct GapParams {
    #[serde(default = "default_view")]
    pub view: String,
    #[serde(default)]
    pub dim: Option<String>,
}

fn default_view() -> String {
    "overview".to_string()
}

impl GapParams {
    /// The UI event these parameters stand for
    pub fn event(&self) -> Option<ViewEvent> {
        match (self.view.as_str(), &self.dim) {
            ("overview", _) => Some(ViewEvent::ShowOverview),
            ("dimension", None) => Some(ViewEvent::ShowDimensionView),
            ("dimension", Some(dim)) => Some(ViewEvent::SelectDimension(Some(dim.clone()))),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct GapsOverview<'a> {
    state: &'a ViewState,
    top_gaps: Vec<GapIndicator>,
    dimensions: Vec<DimensionOption>,
}

/// A response before it is bound to a connection
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body }
    }

    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_string(value)
            .unwrap_or_else(|e| format!(r#"{{"ok":false,"data":null,"error":"{}"}}"#, e));
        Self { status, content_type: "application/json", body }
    }

    fn not_found() -> Self {
        Self { status: 404, content_type: "text/plain", body: "Not found".to_string() }
    }
}

/// Everything the server keeps between requests
pub struct App {
    data: SurveyData,
    config: DeckConfig,
    view: ViewController,
}

impl App {
    pub fn new(data: SurveyData, config: DeckConfig) -> Self {
        let view = ViewController::new(&data, &config);
        Self { data, config, view }
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    /// Route one request. `url` includes the query string.
    pub fn handle(&mut self, method: &Method, url: &str) -> Reply {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };

        match (method, path) {
            (Method::Get, "/") => {
                // A fresh page load starts on the overview
                self.view.apply(ViewEvent::ShowOverview);
                let deck = Deck::build(&self.data, &self.config);
                let mut out = Vec::new();
                match html::write_deck(&mut out, &deck, &self.config, Controls::Live) {
                    Ok(()) => Reply::html(String::from_utf8_lossy(&out).into_owned()),
                    Err(e) => Reply::json(500, &ApiResponse::failure(e.to_string())),
                }
            }

            (Method::Get, "/gaps") => {
                let params = match serde_urlencoded::from_str::<GapParams>(query) {
                    Ok(params) => params,
                    Err(e) => return Reply::json(400, &ApiResponse::failure(e.to_string())),
                };
                match params.event() {
                    Some(event) => Reply::html(self.view.apply(event).to_string()),
                    None => Reply::json(400, &ApiResponse::failure(format!("unknown view '{}'", params.view))),
                }
            }

            (Method::Get, "/api/gaps") => {
                if !self.view.has_data() {
                    return Reply::json(200, &ApiResponse::failure("Chart data not loaded."));
                }
                let overview = GapsOverview {
                    state: self.view.state(),
                    top_gaps: self.view.top_gaps(),
                    dimensions: self.view.options(),
                };
                Reply::json(200, &ApiResponse::success(overview))
            }

            _ => Reply::not_found(),
        }
    }
}

/// Start server, open browser, serve the deck
pub fn start(port: u16, data: SurveyData, config: DeckConfig) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let url = format!("http://localhost:{}", port);
    eprintln!("\n\x1b[1;32m📊 surveydeck\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Deck: {}\n", config.title);

    if let Err(e) = open::that(&url) {
        warn!(error = %e, "could not open browser");
    }

    let mut app = App::new(data, config);
    for request in server.incoming_requests() {
        if let Err(e) = respond(&mut app, request) {
            warn!(error = %e, "request failed");
        }
    }

    Ok(())
}

fn respond(app: &mut App, request: Request) -> std::io::Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();
    let reply = app.handle(&method, &url);
    info!(%method, %url, status = reply.status, "request");

    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response = response.with_header(header);
    }
    request.respond(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DimensionIndicators, Opportunity};
    use crate::view::{PROMPT_CHOOSE, PROMPT_SELECT};
    use std::collections::BTreeMap;

    fn app() -> App {
        let mut dims = BTreeMap::new();
        dims.insert(
            "1".to_string(),
            DimensionIndicators {
                name: "Health".to_string(),
                indicators: vec![Opportunity {
                    name: "Clinics".to_string(),
                    community: 4.2,
                    offerings: 3.1,
                    gap: 1.1,
                    pct_high: 72.5,
                }],
            },
        );
        let data = SurveyData {
            all_indicators: Some(vec![GapIndicator {
                dimension: "Health".to_string(),
                indicator: "Clinics".to_string(),
                community: 4.2,
                offerings: 3.1,
                gap: 1.1,
                pct_high: 72.5,
            }]),
            dimension_data: Some(dims),
            ..Default::default()
        };
        App::new(data, DeckConfig::default())
    }

    // ==========================================================================
    // QUERY PARSING
    // ==========================================================================

    #[test]
    fn test_params_to_events() {
        let parse = |q: &str| serde_urlencoded::from_str::<GapParams>(q).unwrap().event();
        assert_eq!(parse(""), Some(ViewEvent::ShowOverview));
        assert_eq!(parse("view=dimension"), Some(ViewEvent::ShowDimensionView));
        assert_eq!(parse("view=dimension&dim=4"), Some(ViewEvent::SelectDimension(Some("4".to_string()))));
        assert_eq!(parse("view=matrix"), None);
    }

    // ==========================================================================
    // ROUTES
    // ==========================================================================

    #[test]
    fn test_index_serves_live_deck() {
        let reply = app().handle(&Method::Get, "/");
        assert_eq!(reply.status, 200);
        assert!(reply.content_type.starts_with("text/html"));
        assert!(reply.body.contains("fetch('/gaps?"));
    }

    #[test]
    fn test_gap_events_drive_one_controller() {
        let mut app = app();
        let pane = app.handle(&Method::Get, "/gaps?view=dimension").body;
        assert!(pane.contains(PROMPT_CHOOSE));

        let pane = app.handle(&Method::Get, "/gaps?view=dimension&dim=1").body;
        assert!(pane.contains("Clinics"));
        assert_eq!(app.view().live_charts(), 1);

        let pane = app.handle(&Method::Get, "/gaps?view=dimension&dim=7").body;
        assert!(pane.contains(PROMPT_SELECT));
        assert_eq!(app.view().live_charts(), 0);
    }

    #[test]
    fn test_api_gaps_envelope() {
        let reply = app().handle(&Method::Get, "/api/gaps");
        let value: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["top_gaps"][0]["indicator"], "Clinics");
        assert_eq!(value["data"]["dimensions"][0]["id"], "1");
    }

    #[test]
    fn test_api_gaps_without_data() {
        let reply = App::new(SurveyData::default(), DeckConfig::default()).handle(&Method::Get, "/api/gaps");
        let value: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"], "Chart data not loaded.");
    }

    #[test]
    fn test_unknown_view_and_path() {
        let mut app = app();
        assert_eq!(app.handle(&Method::Get, "/gaps?view=matrix").status, 400);
        assert_eq!(app.handle(&Method::Get, "/nope").status, 404);
        assert_eq!(app.handle(&Method::Post, "/gaps").status, 404);
    }
}
