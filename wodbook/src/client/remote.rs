//! HTTP client for the remote booking service.
//!
//! One instance serves the single configured box. Sessions are cookie
//! header values captured at login and reused from the session store;
//! redirects stay disabled so the login response's `Set-Cookie` headers
//! are visible instead of being consumed by a redirect hop.

use std::sync::OnceLock;
use std::time::Duration;

use log::{debug, info, warn};
use regex::Regex;
use reqwest::header::{self, HeaderMap};
use serde::Deserialize;
use serde_json::Value;

use super::classify::{classify, value_as_i64, value_as_u64, Action};
use super::BookingApi;
use crate::error::ClientError;
use crate::models::{ClassSlot, Outcome, Session};

/// Login endpoint shared by every box.
const DEFAULT_LOGIN_URL: &str = "https://aimharder.com/login";

/// Value of the `login` form field the site expects verbatim.
const LOGIN_SUBMIT: &str = "Iniciar sesi\u{f3}n";

/// Marker inside the `loginErrors` element that selects the throttling
/// error kind.
const TOO_MANY_ATTEMPTS_MARKER: &str = "too many attempts";

static LOGIN_ERRORS_RE: OnceLock<Regex> = OnceLock::new();

/// Where and how to reach the remote service.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Login endpoint URL.
    pub login_url: String,
    /// Base URL of the box subdomain (no trailing slash).
    pub api_base: String,
    /// Box identifier sent with every bookings query.
    pub box_id: String,
    /// Timeout applied to every remote call.
    pub timeout: Duration,
}

impl RemoteConfig {
    /// Production endpoints for a box subdomain.
    pub fn for_box(box_name: &str, box_id: impl Into<String>) -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            api_base: format!("https://{box_name}.aimharder.com"),
            box_id: box_id.into(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Authenticated client for the list/book/cancel protocol.
pub struct RemoteClient {
    http: reqwest::Client,
    config: RemoteConfig,
    sessions: crate::store::SessionStore,
}

impl RemoteClient {
    /// Build a client with the configured timeout and redirects disabled.
    pub fn new(
        config: RemoteConfig,
        sessions: crate::store::SessionStore,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            sessions,
        })
    }

    /// Submit credentials to the login endpoint and capture the session
    /// cookies. The only path that can fail on bad credentials or
    /// remote-side login throttling.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        debug!("logging in {email}...");
        let response = self
            .http
            .post(&self.config.login_url)
            .form(&[
                ("login", LOGIN_SUBMIT),
                ("loginiframe", "0"),
                ("mail", email),
                ("pw", password),
            ])
            .send()
            .await?;

        let cookie_header = collect_cookies(response.headers());
        let body = response.text().await?;
        validate_login_page(&body)?;

        info!("logged in {email}");
        Ok(Session::new(email, cookie_header))
    }

    async fn outcome_of(action: Action, result: reqwest::Result<reqwest::Response>) -> Outcome {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                return Outcome::TransportFailure {
                    detail: err.to_string(),
                }
            }
        };
        let status = response.status();
        match response.text().await {
            Ok(body) => {
                debug!("{action} response ({status}): {body}");
                classify(action, status, &body)
            }
            Err(err) => Outcome::TransportFailure {
                detail: err.to_string(),
            },
        }
    }
}

impl BookingApi for RemoteClient {
    async fn obtain_session(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        if let Some(session) = self.sessions.get(email) {
            info!("found cached session for {email}");
            return Ok(session);
        }
        info!("no cached session for {email}");
        self.refresh_session(email, password).await
    }

    async fn refresh_session(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let session = self.authenticate(email, password).await?;
        // A failed cache write must not fail the login that produced the
        // session; the next run simply logs in again.
        match self.sessions.put(&session) {
            Ok(()) => info!("cached session for {email}"),
            Err(err) => warn!("failed to cache session for {email}: {err}"),
        }
        Ok(session)
    }

    async fn list_slots(
        &self,
        session: &Session,
        day: &str,
    ) -> Result<Vec<ClassSlot>, ClientError> {
        let url = format!("{}/api/bookings", self.config.api_base);
        let response = self
            .http
            .get(&url)
            .header(header::COOKIE, &session.cookie_header)
            .query(&[
                ("box", self.config.box_id.as_str()),
                ("day", day),
                ("familyId", ""),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The service answers non-200 on this endpoint when there is
            // nothing to book, not as a fault.
            debug!("bookings endpoint returned {status}, treating as no classes");
            return Ok(Vec::new());
        }

        let body = response.text().await?;
        let page: BookingsPage =
            serde_json::from_str(&body).map_err(|_| ClientError::StaleSession)?;
        Ok(page
            .bookings
            .into_iter()
            .map(|raw| raw.into_slot(day))
            .collect())
    }

    async fn book(&self, session: &Session, slot_id: u64, day: &str) -> Outcome {
        let url = format!("{}/api/book", self.config.api_base);
        let id = slot_id.to_string();
        let result = self
            .http
            .post(&url)
            .header(header::COOKIE, &session.cookie_header)
            .form(&[
                ("id", id.as_str()),
                ("day", day),
                ("insist", "0"),
                ("familyId", ""),
            ])
            .send()
            .await;
        Self::outcome_of(Action::Book, result).await
    }

    async fn cancel(&self, session: &Session, confirmation_id: u64) -> Outcome {
        let url = format!("{}/api/cancelBook", self.config.api_base);
        let id = confirmation_id.to_string();
        let result = self
            .http
            .post(&url)
            .header(header::COOKIE, &session.cookie_header)
            .form(&[("id", id.as_str()), ("late", "0"), ("familyId", "")])
            .send()
            .await;
        Self::outcome_of(Action::Cancel, result).await
    }
}

/// Join the login response's `Set-Cookie` values into one `Cookie`
/// header, dropping attributes like `Path` and `Expires`.
fn collect_cookies(headers: &HeaderMap) -> String {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A successful login page carries no `loginErrors` element; when one is
/// present its text selects the error kind.
fn validate_login_page(body: &str) -> Result<(), ClientError> {
    let re = LOGIN_ERRORS_RE.get_or_init(|| {
        Regex::new(r#"(?is)id\s*=\s*["']?loginErrors["']?[^>]*>([^<]*)"#).expect("valid regex")
    });
    let Some(captures) = re.captures(body) else {
        return Ok(());
    };

    let text = captures[1].trim().to_string();
    warn!("login was not accepted: {text}");
    if text.to_lowercase().contains(TOO_MANY_ATTEMPTS_MARKER) {
        Err(ClientError::LoginTooManyAttempts)
    } else {
        Err(ClientError::LoginUnknown(text))
    }
}

/// Wire shape of the bookings listing.
#[derive(Debug, Deserialize)]
struct BookingsPage {
    #[serde(default)]
    bookings: Vec<RawSlot>,
}

/// One slot as the service sends it. Identifier-ish fields arrive as
/// numbers or numeric strings depending on the endpoint, so they are
/// kept loose here and normalized in [`RawSlot::into_slot`].
#[derive(Debug, Deserialize)]
struct RawSlot {
    id: u64,
    #[serde(default)]
    time: String,
    #[serde(default)]
    timeid: String,
    #[serde(rename = "classId", default)]
    class_id: u64,
    #[serde(rename = "className", default)]
    class_name: String,
    #[serde(rename = "coachName", default)]
    coach_name: String,
    #[serde(default)]
    ocupation: i64,
    #[serde(default)]
    limit: i64,
    #[serde(default)]
    idres: Option<Value>,
    #[serde(rename = "bookState", default)]
    book_state: Option<Value>,
}

impl RawSlot {
    fn into_slot(self, day: &str) -> ClassSlot {
        ClassSlot {
            id: self.id,
            time: self.time,
            time_id: self.timeid,
            class_id: self.class_id,
            class_name: self.class_name,
            coach_name: self.coach_name,
            ocupation: self.ocupation,
            limit: self.limit,
            book_state: self.book_state.as_ref().and_then(value_as_i64),
            reservation_id: self.idres.as_ref().and_then(value_as_u64),
            day: day.to_string(),
        }
    }
}
