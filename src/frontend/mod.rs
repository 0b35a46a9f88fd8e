//! Web frontend on port 8501: forms that turn into agent queries, plus a
//! conversation history.

pub mod render;

use crate::adapters::AgentClient;
use crate::config::FrontendConfig;
use crate::utils::error::{AgentError, Result};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, HeaderName},
    response::{AppendHeaders, Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

/// Oldest entries are dropped past this size.
pub const HISTORY_CAPACITY: usize = 50;
/// Past this many browsers the least recently used history is dropped.
pub const MAX_SESSIONS: usize = 1000;
pub const SESSION_COOKIE: &str = "clinic_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryRole {
    User,
    Agent,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub role: EntryRole,
    pub agent: Option<String>,
    pub content: String,
    pub timestamp: String,
}

impl HistoryEntry {
    fn new(role: EntryRole, agent: Option<&str>, content: impl Into<String>) -> Self {
        Self {
            role,
            agent: agent.map(str::to_string),
            content: content.into(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentTarget {
    Doctor,
    Booking,
}

impl AgentTarget {
    pub fn display_name(self) -> &'static str {
        match self {
            AgentTarget::Doctor => "Doctor Directory Agent",
            AgentTarget::Booking => "Booking Agent",
        }
    }

    fn url(self, client: &AgentClient) -> &str {
        match self {
            AgentTarget::Doctor => client.doctor_agent_url(),
            AgentTarget::Booking => client.booking_agent_url(),
        }
    }
}

/// Per-browser history, keyed by the session cookie.
#[derive(Debug, Default)]
struct Sessions {
    histories: HashMap<String, SessionHistory>,
    tick: u64,
}

#[derive(Debug, Default)]
struct SessionHistory {
    entries: VecDeque<HistoryEntry>,
    last_used: u64,
}

impl Sessions {
    fn entry(&mut self, session: &str) -> &mut SessionHistory {
        self.tick += 1;
        if !self.histories.contains_key(session) && self.histories.len() >= MAX_SESSIONS {
            let oldest = self
                .histories
                .iter()
                .min_by_key(|(_, h)| h.last_used)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                self.histories.remove(&oldest);
            }
        }
        let history = self.histories.entry(session.to_string()).or_default();
        history.last_used = self.tick;
        history
    }
}

#[derive(Clone)]
pub struct FrontendState {
    pub client: AgentClient,
    sessions: Arc<Mutex<Sessions>>,
}

impl FrontendState {
    pub fn new(client: AgentClient) -> Self {
        Self {
            client,
            sessions: Arc::new(Mutex::new(Sessions::default())),
        }
    }

    async fn push(&self, session: &str, entry: HistoryEntry) {
        let mut sessions = self.sessions.lock().await;
        let history = &mut sessions.entry(session).entries;
        history.push_back(entry);
        while history.len() > HISTORY_CAPACITY {
            history.pop_front();
        }
    }

    pub async fn history(&self, session: &str) -> Vec<HistoryEntry> {
        self.sessions
            .lock()
            .await
            .histories
            .get(session)
            .map(|h| h.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn clear(&self, session: &str) {
        self.sessions.lock().await.histories.remove(session);
    }

    async fn warn(&self, session: &str, message: &str) {
        self.push(session, HistoryEntry::new(EntryRole::Warning, None, message))
            .await;
    }

    /// Sends `query` to the target agent and records both sides in the
    /// caller's history.
    pub async fn run_query(&self, session: &str, target: AgentTarget, query: String) {
        let name = target.display_name();
        self.push(session, HistoryEntry::new(EntryRole::User, None, query.clone()))
            .await;

        let url = target.url(&self.client);
        if let Err(e) = self.client.require_online(url).await {
            tracing::warn!("{}: {}", name, e);
            self.push(
                session,
                HistoryEntry::new(EntryRole::Error, Some(name), format!("{} is offline!", name)),
            )
            .await;
            return;
        }

        let entry = match self.client.send_message(url, &query).await.into_result() {
            Ok(data) => HistoryEntry::new(EntryRole::Agent, Some(name), data),
            Err(error) => HistoryEntry::new(EntryRole::Error, Some(name), error),
        };
        self.push(session, entry).await;
    }
}

/// Browser session taken from the `clinic_session` cookie, or a fresh one.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    is_new: bool,
}

impl Session {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let existing = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
            .find(|id| Uuid::parse_str(id).is_ok());
        match existing {
            Some(id) => Self {
                id: id.to_string(),
                is_new: false,
            },
            None => Self {
                id: Uuid::new_v4().to_string(),
                is_new: true,
            },
        }
    }

    /// `Set-Cookie` for sessions created by this request.
    pub fn cookie(&self) -> AppendHeaders<Vec<(HeaderName, String)>> {
        let mut headers = Vec::new();
        if self.is_new {
            headers.push((
                header::SET_COOKIE,
                format!(
                    "{}={}; Path=/; HttpOnly; SameSite=Lax",
                    SESSION_COOKIE, self.id
                ),
            ));
        }
        AppendHeaders(headers)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

type Redirected = (AppendHeaders<Vec<(HeaderName, String)>>, Redirect);

fn back_to_index(session: &Session) -> Redirected {
    (session.cookie(), Redirect::to("/"))
}

// Query strings sent to the agents for each form.

pub fn doctor_search_query(specialty: &str) -> String {
    let specialty = specialty.trim();
    if specialty.is_empty() || specialty == "All Specialties" {
        "list doctors".to_string()
    } else {
        format!("find doctors {}", specialty.to_lowercase())
    }
}

pub fn availability_query(doctor_id: &str) -> String {
    format!("slots for {}", doctor_id.trim())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub patient_phone: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub time_preference: String,
}

pub fn booking_query(form: &BookingForm) -> String {
    let mut query = format!("book appointment for {}", form.patient_name.trim());
    let specialty = form.specialty.trim();
    if !specialty.is_empty() && specialty != "Any" {
        query.push_str(&format!(" with {} specialist", specialty));
    }
    let time = form.time_preference.trim();
    if !time.is_empty() && time != "Any Time" {
        query.push_str(&format!(" in the {}", time.to_lowercase()));
    }
    let phone = form.patient_phone.trim();
    if !phone.is_empty() {
        query.push_str(&format!(" phone {}", phone));
    }
    query
}

pub fn appointments_query(patient_name: &str) -> String {
    let name = patient_name.trim();
    if name.is_empty() {
        "list all appointments".to_string()
    } else {
        format!("list appointments for {}", name)
    }
}

pub fn cancel_query(appointment_id: &str) -> String {
    format!("cancel appointment {}", appointment_id.trim())
}

#[derive(Debug, Deserialize)]
pub struct SpecialtyForm {
    #[serde(default)]
    pub specialty: String,
}

#[derive(Debug, Deserialize)]
pub struct DoctorIdForm {
    #[serde(default)]
    pub doctor_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PatientForm {
    #[serde(default)]
    pub patient_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CancelForm {
    #[serde(default)]
    pub appointment_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub agent: AgentTarget,
    #[serde(default)]
    pub message: String,
}

async fn health() -> &'static str {
    "ok"
}

async fn index(State(state): State<FrontendState>, session: Session) -> impl IntoResponse {
    let (doctor_online, booking_online) = tokio::join!(
        state.client.check_agent_status(state.client.doctor_agent_url()),
        state.client.check_agent_status(state.client.booking_agent_url()),
    );
    let history = state.history(&session.id).await;
    (
        session.cookie(),
        Html(render::render_page(doctor_online, booking_online, &history)),
    )
}

async fn search_doctors(
    State(state): State<FrontendState>,
    session: Session,
    Form(form): Form<SpecialtyForm>,
) -> Redirected {
    let query = doctor_search_query(&form.specialty);
    state.run_query(&session.id, AgentTarget::Doctor, query).await;
    back_to_index(&session)
}

async fn check_availability(
    State(state): State<FrontendState>,
    session: Session,
    Form(form): Form<DoctorIdForm>,
) -> Redirected {
    if form.doctor_id.trim().is_empty() {
        state.warn(&session.id, "Please enter a doctor ID").await;
    } else {
        let query = availability_query(&form.doctor_id);
        state.run_query(&session.id, AgentTarget::Doctor, query).await;
    }
    back_to_index(&session)
}

async fn book(
    State(state): State<FrontendState>,
    session: Session,
    Form(form): Form<BookingForm>,
) -> Redirected {
    if form.patient_name.trim().is_empty() {
        state.warn(&session.id, "Please enter patient name").await;
    } else {
        let query = booking_query(&form);
        state.run_query(&session.id, AgentTarget::Booking, query).await;
    }
    back_to_index(&session)
}

async fn list_appointments(
    State(state): State<FrontendState>,
    session: Session,
    Form(form): Form<PatientForm>,
) -> Redirected {
    let query = appointments_query(&form.patient_name);
    state.run_query(&session.id, AgentTarget::Booking, query).await;
    back_to_index(&session)
}

async fn cancel(
    State(state): State<FrontendState>,
    session: Session,
    Form(form): Form<CancelForm>,
) -> Redirected {
    if form.appointment_id.trim().is_empty() {
        state.warn(&session.id, "Please enter an appointment ID").await;
    } else {
        let query = cancel_query(&form.appointment_id);
        state.run_query(&session.id, AgentTarget::Booking, query).await;
    }
    back_to_index(&session)
}

async fn chat(
    State(state): State<FrontendState>,
    session: Session,
    Form(form): Form<ChatForm>,
) -> Redirected {
    let message = form.message.trim();
    if message.is_empty() {
        state.warn(&session.id, "Please enter a message").await;
    } else {
        state
            .run_query(&session.id, form.agent, message.to_string())
            .await;
    }
    back_to_index(&session)
}

async fn clear(State(state): State<FrontendState>, session: Session) -> Redirected {
    state.clear(&session.id).await;
    back_to_index(&session)
}

async fn debug_endpoints(State(state): State<FrontendState>) -> impl IntoResponse {
    let client = &state.client;
    let (doctor, booking) = tokio::join!(
        client.test_agent_endpoints(client.doctor_agent_url()),
        client.test_agent_endpoints(client.booking_agent_url()),
    );
    Json(serde_json::json!({
        "doctor_agent": { "url": client.doctor_agent_url(), "endpoints": doctor },
        "booking_agent": { "url": client.booking_agent_url(), "endpoints": booking },
    }))
}

pub fn frontend_router(state: FrontendState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/_stcore/health", get(health))
        .route("/doctors", post(search_doctors))
        .route("/availability", post(check_availability))
        .route("/book", post(book))
        .route("/appointments", post(list_appointments))
        .route("/cancel", post(cancel))
        .route("/chat", post(chat))
        .route("/clear", post(clear))
        .route("/debug", get(debug_endpoints))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn bind(config: &FrontendConfig) -> Result<TcpListener> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AgentError::InvalidConfigValueError {
            field: "frontend.host".to_string(),
            value: format!("{}:{}", config.host, config.port),
            reason: format!("{}", e),
        })?;
    Ok(TcpListener::bind(addr).await?)
}

/// Serves the UI on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: FrontendState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("🏥 Medical Appointment frontend on http://{}", addr);
    info!(
        "   Agents: doctor={} booking={}",
        state.client.doctor_agent_url(),
        state.client.booking_agent_url()
    );
    axum::serve(listener, frontend_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Frontend stopped");
    Ok(())
}

pub async fn run(config: &FrontendConfig) -> Result<()> {
    let state = FrontendState::new(AgentClient::new(&config.client)?);
    let listener = bind(config).await?;
    serve(listener, state, crate::server::shutdown_signal()).await
}
