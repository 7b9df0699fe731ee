//! HTML pages: browsing, booking, registration, login and "my bookings".
//! Session state lives in Redis behind a cookie; handlers that require a
//! logged-in user take the `SessionUser` extractor, which redirects to the
//! login page when the session is missing.

use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tera::Context;
use tower_cookies::{Cookie, Cookies};
use validator::Validate;

use crate::auth;
use crate::controllers::bookings::BookingEntry;
use crate::errors::ApiError;
use crate::forms::{error_messages, BookingForm, LoginForm, RegistrationForm};
use crate::middleware::SessionUser;
use crate::models::{Booking, Exhibit, Museum, Ticket, User, Visitor};
use crate::session::SessionData;
use crate::AppState;

/// Routes mounted under /lol.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/browse/", get(browse))
        .route("/museum/{museum_id}/", get(museum_detail))
        .route(
            "/book_museum/{museum_id}/",
            get(book_museum_page).post(book_museum_submit),
        )
        .route("/success/", get(success_page))
        .route("/register/", get(register_page).post(register_submit))
        .route("/mybookings/", get(mybookings))
        .route(
            "/booking_cancel/{booking_id}/",
            get(booking_cancel_page).post(booking_cancel_submit),
        )
}

/// Home page and account routes mounted at the root.
pub fn account_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/accounts/login/", get(login_page).post(login_submit))
        .route("/accounts/logout/", get(logout))
}

fn render(state: &AppState, name: &str, ctx: &Context) -> Result<Html<String>, ApiError> {
    Ok(Html(state.templates.render(name, ctx)?))
}

fn internal<E: std::fmt::Debug>(e: E) -> ApiError {
    tracing::error!("internal error: {:?}", e);
    ApiError::Internal
}

fn session_cookie(name: &str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.to_string(), value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie
}

async fn start_session(
    state: &AppState,
    cookies: &Cookies,
    user: &User,
    pair: Option<&auth::TokenPair>,
) -> Result<(), ApiError> {
    let mut data = SessionData {
        user_id: user.id,
        access_token: None,
        refresh_token: None,
    };
    if let Some(pair) = pair {
        data.set_token_pair(pair);
    }
    let session_id = state.sessions.create(&data).await.map_err(internal)?;
    cookies.add(session_cookie(&state.sessions.cookie_name, session_id));
    Ok(())
}

// GET /
async fn home(
    State(state): State<Arc<AppState>>,
    user: Option<SessionUser>,
) -> Result<Html<String>, ApiError> {
    let mut ctx = Context::new();
    if let Some(session) = user {
        ctx.insert("user", &session.user);
    }
    render(&state, "home.html", &ctx)
}

// GET /lol/browse/
async fn browse(
    State(state): State<Arc<AppState>>,
    user: Option<SessionUser>,
) -> Result<Html<String>, ApiError> {
    let museums = Museum::all(&state.db).await?;
    let mut ctx = Context::new();
    ctx.insert("museums", &museums);

    // Authenticated visitors get their token pair in the page context so
    // client-side chatbot widgets can reuse it. Reuse the session's pair
    // when present, mint and store a fresh one otherwise.
    if let Some(mut session) = user {
        let pair = match session.data.token_pair() {
            Some(pair) => pair,
            None => {
                let pair =
                    auth::issue_pair(&state.config.jwt, session.user.id, &session.user.username)
                        .map_err(internal)?;
                session.data.set_token_pair(&pair);
                if let Err(e) = state.sessions.save(&session.session_id, &session.data).await {
                    tracing::warn!("failed to persist session tokens: {:?}", e);
                }
                pair
            }
        };
        ctx.insert("user", &session.user);
        ctx.insert("access_token", &pair.access);
        ctx.insert("refresh_token", &pair.refresh);
    }

    render(&state, "browse.html", &ctx)
}

// GET /lol/museum/{museum_id}/
async fn museum_detail(
    State(state): State<Arc<AppState>>,
    Path(museum_id): Path<i64>,
) -> Result<Html<String>, ApiError> {
    let museum = Museum::find(museum_id, &state.db)
        .await?
        .ok_or(ApiError::NotFound("museum"))?;
    let exhibits = Exhibit::for_museum(museum_id, &state.db).await?;

    let mut ctx = Context::new();
    ctx.insert("museum", &museum);
    ctx.insert("exhibits", &exhibits);
    render(&state, "museum_detail.html", &ctx)
}

#[derive(Debug, Serialize)]
struct TicketChoice {
    id: i64,
    label: String,
    selected: bool,
}

async fn ticket_choices(
    state: &AppState,
    selected: Option<i64>,
) -> Result<Vec<TicketChoice>, ApiError> {
    let tickets = Ticket::all(&state.db).await?;
    Ok(tickets
        .iter()
        .map(|t| TicketChoice {
            id: t.id,
            label: t.label(),
            selected: Some(t.id) == selected,
        })
        .collect())
}

fn booking_form_ctx(
    museum: &Museum,
    tickets: &[TicketChoice],
    name: &str,
    email: &str,
    phone: &str,
    visit_date: &str,
    errors: &[String],
) -> Context {
    let mut ctx = Context::new();
    ctx.insert("museum", museum);
    ctx.insert("tickets", tickets);
    ctx.insert("form_name", name);
    ctx.insert("form_email", email);
    ctx.insert("form_phone", phone);
    ctx.insert("form_visit_date", visit_date);
    ctx.insert("errors", errors);
    ctx
}

// GET /lol/book_museum/{museum_id}/
async fn book_museum_page(
    State(state): State<Arc<AppState>>,
    Path(museum_id): Path<i64>,
    user: SessionUser,
) -> Result<Html<String>, ApiError> {
    let museum = Museum::find(museum_id, &state.db)
        .await?
        .ok_or(ApiError::NotFound("museum"))?;
    let tickets = ticket_choices(&state, None).await?;

    // Pre-fill from the visitor profile when one exists, else just the email
    let (name, email, phone) = match Visitor::for_user(user.user.id, &state.db).await? {
        Some(visitor) => (visitor.name, visitor.email, visitor.phone),
        None => (String::new(), user.user.email.clone(), String::new()),
    };

    let ctx = booking_form_ctx(&museum, &tickets, &name, &email, &phone, "", &[]);
    render(&state, "booking_form.html", &ctx)
}

// POST /lol/book_museum/{museum_id}/
async fn book_museum_submit(
    State(state): State<Arc<AppState>>,
    Path(museum_id): Path<i64>,
    user: SessionUser,
    Form(form): Form<BookingForm>,
) -> Result<Response, ApiError> {
    let museum = Museum::find(museum_id, &state.db)
        .await?
        .ok_or(ApiError::NotFound("museum"))?;

    let mut errors = match form.validate() {
        Ok(()) => Vec::new(),
        Err(e) => error_messages(&e),
    };

    // A blank date input or a mangled ticket id reaches this handler as a
    // string that fails to parse; both become field errors on the re-render
    let visit_date = form.visit_date();
    if visit_date.is_none() {
        errors.push("visit_date: enter a valid date".to_string());
    }

    let ticket = match form.ticket_id() {
        Some(id) => Ticket::find(id, &state.db).await?,
        None => None,
    };
    if ticket.is_none() {
        errors.push("ticket: select a valid ticket".to_string());
    }

    match (visit_date, ticket) {
        (Some(visit_date), Some(ticket)) if errors.is_empty() => {
            // One visitor profile per user, reused across bookings
            let visitor = Visitor::get_or_create(
                user.user.id,
                &form.name,
                &form.email,
                &form.phone,
                &state.db,
            )
            .await?;

            Booking::create(visitor.id, ticket.id, museum.id, visit_date, &state.db).await?;
            Ok(Redirect::to("/lol/success/").into_response())
        }
        _ => {
            let tickets = ticket_choices(&state, form.ticket_id()).await?;
            let ctx = booking_form_ctx(
                &museum,
                &tickets,
                &form.name,
                &form.email,
                &form.phone,
                &form.visit_date,
                &errors,
            );
            Ok(render(&state, "booking_form.html", &ctx)?.into_response())
        }
    }
}

// GET /lol/success/
async fn success_page(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
) -> Result<Html<String>, ApiError> {
    let mut ctx = Context::new();
    ctx.insert("user", &user.user);
    render(&state, "success.html", &ctx)
}

fn register_ctx(username: &str, email: &str, errors: &[String]) -> Context {
    let mut ctx = Context::new();
    ctx.insert("form_username", username);
    ctx.insert("form_email", email);
    ctx.insert("errors", errors);
    ctx
}

// GET /lol/register/
async fn register_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    render(&state, "register.html", &register_ctx("", "", &[]))
}

// POST /lol/register/
async fn register_submit(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, ApiError> {
    let mut errors = match form.validate() {
        Ok(()) => Vec::new(),
        Err(e) => error_messages(&e),
    };
    if errors.is_empty() && User::username_taken(&form.username, &state.db).await? {
        errors.push("username: already taken".to_string());
    }
    if !errors.is_empty() {
        let ctx = register_ctx(&form.username, &form.email, &errors);
        return Ok(render(&state, "register.html", &ctx)?.into_response());
    }

    let password_hash = auth::hash_password(&form.password1).map_err(internal)?;
    let user = User::create(&form.username, &form.email, &password_hash, &state.db).await?;

    // Best-effort: registration succeeds and logs the session in even when
    // the token service is unreachable
    let pair = state.tokens.obtain_pair(&form.username, &form.password1).await;
    start_session(&state, &cookies, &user, pair.as_ref()).await?;

    tracing::info!("Registered user {} ({})", user.username, user.id);
    Ok(Redirect::to("/").into_response())
}

// GET /accounts/login/
async fn login_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let mut ctx = Context::new();
    ctx.insert("errors", &Vec::<String>::new());
    ctx.insert("form_username", "");
    render(&state, "login.html", &ctx)
}

// POST /accounts/login/
async fn login_submit(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    // The token pair is fetched with the submitted plaintext credentials
    // before local verification; the pair is only stored once the local
    // check passes
    let pair = state.tokens.obtain_pair(&form.username, &form.password).await;

    let user = User::find_by_username(&form.username, &state.db)
        .await?
        .filter(|u| u.verify_password(&form.password));

    let Some(user) = user else {
        let mut ctx = Context::new();
        ctx.insert("errors", &["invalid username or password"]);
        ctx.insert("form_username", &form.username);
        return Ok(render(&state, "login.html", &ctx)?.into_response());
    };

    start_session(&state, &cookies, &user, pair.as_ref()).await?;
    Ok(Redirect::to("/").into_response())
}

// GET /accounts/logout/
async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    user: Option<SessionUser>,
) -> Result<Response, ApiError> {
    if let Some(session) = user {
        if let Err(e) = state.sessions.destroy(&session.session_id).await {
            tracing::warn!("failed to destroy session: {:?}", e);
        }
    }
    cookies.remove(session_cookie(&state.sessions.cookie_name, String::new()));
    Ok(Redirect::to("/").into_response())
}

// GET /lol/mybookings/
async fn mybookings(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
) -> Result<Html<String>, ApiError> {
    let bookings = Booking::for_user(user.user.id, &state.db).await?;
    let entries: Vec<BookingEntry> = bookings.iter().map(BookingEntry::from).collect();

    let mut ctx = Context::new();
    ctx.insert("user", &user.user);
    ctx.insert("bookings", &entries);
    render(&state, "my_bookings.html", &ctx)
}

// GET /lol/booking_cancel/{booking_id}/
async fn booking_cancel_page(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<i64>,
    user: SessionUser,
) -> Result<Html<String>, ApiError> {
    // Same ownership rule as the API cancel: other users' bookings 404
    let booking = Booking::find_owned(booking_id, user.user.id, &state.db)
        .await?
        .ok_or(ApiError::NotFound("booking"))?;

    let mut ctx = Context::new();
    ctx.insert("booking", &BookingEntry::from(&booking));
    render(&state, "cancel_booking.html", &ctx)
}

// POST /lol/booking_cancel/{booking_id}/
async fn booking_cancel_submit(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<i64>,
    user: SessionUser,
) -> Result<Response, ApiError> {
    Booking::find_owned(booking_id, user.user.id, &state.db)
        .await?
        .ok_or(ApiError::NotFound("booking"))?;

    Booking::delete(booking_id, &state.db).await?;
    tracing::info!("User {} cancelled booking {}", user.user.id, booking_id);
    Ok(Redirect::to("/lol/browse/").into_response())
}
