//! Single binary web server: HTML from templates/, static from /static, photos from
//! /assets/photos, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default; see `tarneeb_tracker::config` for the
//! environment variables it reads.

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get,
    http::header,
    middleware::Logger,
    post, put,
    web::{self, Bytes, Data, Json, Path, Query},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use tarneeb_tracker::{
    aggregate, auth,
    auth::LoginThrottle,
    build_bracket, export_csv, slot_availability, summarize, tournament_names, Config, GameMatch,
    GameStore, MatchInput, StatsFilter, TrackerError,
};

/// Shared across workers: storage, settings and the login throttle.
struct AppState {
    store: GameStore,
    config: Config,
    throttle: LoginThrottle,
}

impl AppState {
    fn new(config: Config) -> Self {
        Self {
            store: GameStore::from_config(&config),
            throttle: LoginThrottle::new(config.max_login_attempts, config.login_lockout),
            config,
        }
    }
}

type SharedState = Data<AppState>;

/// Largest JSON body accepted (bulk import of the whole games list).
const JSON_LIMIT: usize = 16 * 1024 * 1024;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct LoginBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    csrf_token: String,
}

#[derive(Deserialize)]
struct ImportBody {
    games: Vec<GameMatch>,
}

/// Path segment: game id (e.g. /api/games/{id})
#[derive(Deserialize)]
struct GamePath {
    id: String,
}

/// Path segment: tournament name (e.g. /api/tournaments/{name}/bracket)
#[derive(Deserialize)]
struct TournamentPath {
    name: String,
}

#[derive(Deserialize)]
struct SlotsQuery {
    #[serde(default)]
    exclude: Option<String>,
}

/// JSON error body with the status matching the error kind.
fn error_response(e: &TrackerError) -> HttpResponse {
    let body = serde_json::json!({ "success": false, "error": e.to_string() });
    match e {
        TrackerError::InvalidRoster(_)
        | TrackerError::TooManyRounds(_)
        | TrackerError::InvalidSlot(_)
        | TrackerError::InvalidPhoto
        | TrackerError::InvalidCsrf => HttpResponse::BadRequest().json(body),
        TrackerError::NotFound(_) => HttpResponse::NotFound().json(body),
        TrackerError::Unauthorized | TrackerError::InvalidCredentials => {
            HttpResponse::Unauthorized().json(body)
        }
        TrackerError::RateLimited => HttpResponse::TooManyRequests().json(body),
        TrackerError::Session(_)
        | TrackerError::Io(_)
        | TrackerError::Json(_)
        | TrackerError::Csv(_) => {
            log::error!("Request failed: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn respond<T: Serialize>(result: Result<T, TrackerError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

/// Throttle key: the socket peer IP. Forwarding headers are client-controlled
/// and ignored.
fn client_addr(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tarneeb-tracker",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Data directory diagnostics for deployment checks.
#[get("/api/debug")]
async fn api_debug(state: SharedState) -> HttpResponse {
    let diagnostics = state.store.diagnostics().await;
    HttpResponse::Ok().json(serde_json::json!({
        "status": "API is working",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "storage": diagnostics,
        "admin_configured": state.config.admin.is_some(),
    }))
}

#[get("/api/auth/status")]
async fn api_auth_status(session: Session) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "authenticated": auth::is_authenticated(&session) }))
}

#[get("/api/auth/csrf")]
async fn api_csrf_token(session: Session) -> HttpResponse {
    respond(auth::csrf_token(&session).map(|token| serde_json::json!({ "csrf_token": token })))
}

/// Log in as admin. Requires the session's CSRF token; failures count
/// towards the per-client lockout.
#[post("/api/auth/login")]
async fn api_login(
    state: SharedState,
    req: HttpRequest,
    session: Session,
    body: Json<LoginBody>,
) -> HttpResponse {
    if !auth::csrf_matches(&session, &body.csrf_token) {
        log::warn!("Login rejected: invalid CSRF token");
        return error_response(&TrackerError::InvalidCsrf);
    }
    let client = client_addr(&req);
    if let Err(e) = state.throttle.check(&client) {
        return error_response(&e);
    }
    let ok = state
        .config
        .admin
        .as_ref()
        .is_some_and(|admin| admin.verify(&body.username, &body.password));
    state.throttle.record(&client, ok);
    if !ok {
        log::warn!("Authentication failed for user: {}", body.username);
        return error_response(&TrackerError::InvalidCredentials);
    }
    log::info!("Authentication successful for user: {}", body.username);
    respond(
        auth::start_admin_session(&session, &body.username)
            .map(|()| serde_json::json!({ "success": true, "message": "Login successful" })),
    )
}

#[post("/api/auth/logout")]
async fn api_logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "message": "Logged out successfully" }))
}

/// All games with their derived winner and round results.
#[get("/api/games")]
async fn api_list_games(state: SharedState) -> HttpResponse {
    respond(state.store.load().await)
}

/// Add a game (admin). Names are normalized; the new game goes first.
#[post("/api/games")]
async fn api_create_game(state: SharedState, session: Session, body: Json<MatchInput>) -> HttpResponse {
    if let Err(e) = auth::require_admin(&session) {
        return error_response(&e);
    }
    let game = match body.into_inner().into_match(&state.config.known_players) {
        Ok(g) => g,
        Err(e) => return error_response(&e),
    };
    respond(
        state
            .store
            .modify(move |games| {
                games.insert(0, game.clone());
                Ok(game)
            })
            .await,
    )
}

/// Edit a game (admin). Derived fields are recomputed from the new rounds.
#[put("/api/games/{id}")]
async fn api_update_game(
    state: SharedState,
    session: Session,
    path: Path<GamePath>,
    body: Json<MatchInput>,
) -> HttpResponse {
    if let Err(e) = auth::require_admin(&session) {
        return error_response(&e);
    }
    let id = path.into_inner().id;
    let input = body.into_inner();
    let roster = &state.config.known_players;
    respond(
        state
            .store
            .modify(|games| {
                let game = games
                    .iter_mut()
                    .find(|g| g.id == id)
                    .ok_or_else(|| TrackerError::NotFound(id.clone()))?;
                game.edit(input, roster)?;
                Ok(game.clone())
            })
            .await,
    )
}

#[delete("/api/games/{id}")]
async fn api_delete_game(state: SharedState, session: Session, path: Path<GamePath>) -> HttpResponse {
    if let Err(e) = auth::require_admin(&session) {
        return error_response(&e);
    }
    let id = path.into_inner().id;
    respond(
        state
            .store
            .modify(|games| {
                let before = games.len();
                games.retain(|g| g.id != id);
                if games.len() == before {
                    return Err(TrackerError::NotFound(id.clone()));
                }
                Ok(serde_json::json!({ "success": true }))
            })
            .await,
    )
}

/// Replace every game with an uploaded backup (admin).
#[post("/api/games/import")]
async fn api_import_games(state: SharedState, session: Session, body: Json<ImportBody>) -> HttpResponse {
    if let Err(e) = auth::require_admin(&session) {
        return error_response(&e);
    }
    let games = body.into_inner().games;
    let count = games.len();
    respond(
        state
            .store
            .save_all_matches(&games)
            .await
            .map(|()| serde_json::json!({ "success": true, "count": count })),
    )
}

#[get("/api/games/export.csv")]
async fn api_export_csv(state: SharedState) -> HttpResponse {
    let csv = match state.store.load_all_matches().await {
        Ok(games) => export_csv(&games),
        Err(e) => Err(e),
    };
    match csv {
        Ok(bytes) => {
            let filename = format!("tarneeb-backup-{}.csv", chrono::Local::now().date_naive());
            HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ))
                .body(bytes)
        }
        Err(e) => error_response(&e),
    }
}

/// Upload a photo as the raw request body (admin). Returns its file name and URL.
#[post("/api/photos")]
async fn api_upload_photo(
    state: SharedState,
    session: Session,
    req: HttpRequest,
    body: Bytes,
) -> HttpResponse {
    if let Err(e) = auth::require_admin(&session) {
        return error_response(&e);
    }
    if body.len() > state.config.max_photo_bytes {
        return error_response(&TrackerError::InvalidPhoto);
    }
    let extension = match req.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        Some(ct) if ct.starts_with("image/png") => "png",
        Some(ct) if ct.starts_with("image/webp") => "webp",
        _ => "jpg",
    };
    respond(state.store.save_photo(&body, extension).await.map(|filename| {
        serde_json::json!({
            "success": true,
            "url": format!("/assets/photos/{}", filename),
            "filename": filename,
        })
    }))
}

#[get("/api/players/known")]
async fn api_known_players(state: SharedState) -> HttpResponse {
    HttpResponse::Ok().json(state.config.known_players.names())
}

/// Summary counts and ranked player/team standings, optionally for one tournament.
#[get("/api/stats")]
async fn api_stats(state: SharedState, filter: Query<StatsFilter>) -> HttpResponse {
    let filter = filter.into_inner();
    respond(state.store.load_all_matches().await.map(|games| {
        let today = chrono::Local::now().date_naive();
        serde_json::json!({
            "summary": summarize(&games, &filter, today),
            "standings": aggregate(&games, &filter).standings(),
        })
    }))
}

#[get("/api/tournaments")]
async fn api_tournaments(state: SharedState) -> HttpResponse {
    respond(state.store.load_all_matches().await.map(|games| tournament_names(&games)))
}

#[get("/api/tournaments/{name}/bracket")]
async fn api_bracket(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    respond(
        state
            .store
            .load_all_matches()
            .await
            .map(|games| build_bracket(&games, &path.name)),
    )
}

/// Slot labels with a `used` flag, for disabling taken slots in the entry form.
#[get("/api/tournaments/{name}/slots")]
async fn api_slots(state: SharedState, path: Path<TournamentPath>, query: Query<SlotsQuery>) -> HttpResponse {
    respond(state.store.load_all_matches().await.map(|games| {
        slot_availability(&games, &path.name, query.exclude.as_deref())
    }))
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

/// Routes shared by the server and the tests.
fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(serve_index_async))
        .service(api_health)
        .service(favicon)
        .service(api_debug)
        .service(api_auth_status)
        .service(api_csrf_token)
        .service(api_login)
        .service(api_logout)
        .service(api_export_csv)
        .service(api_import_games)
        .service(api_list_games)
        .service(api_create_game)
        .service(api_update_game)
        .service(api_delete_game)
        .service(api_upload_photo)
        .service(api_known_players)
        .service(api_stats)
        .service(api_tournaments)
        .service(api_bracket)
        .service(api_slots);
}

fn session_key(config: &Config) -> Key {
    match &config.session_key {
        Some(bytes) => Key::from(bytes.as_slice()),
        None => {
            log::warn!("No TARNEEB_SESSION_KEY set; sessions will not survive a restart");
            Key::generate()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    for warning in config.startup_warnings() {
        log::warn!("{}", warning);
    }
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);
    log::info!("Data file: {}", config.data_file().display());

    let key = session_key(&config);
    let secure_cookie = config.secure_cookie;
    let max_photo_bytes = config.max_photo_bytes;
    let photos_dir = config.photos_dir();
    std::fs::create_dir_all(&photos_dir)?;
    let state = Data::new(AppState::new(config));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(JSON_LIMIT))
            .app_data(web::PayloadConfig::new(max_photo_bytes))
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_name("tarneeb_session".to_string())
                    .cookie_secure(secure_cookie)
                    .build(),
            )
            .wrap(Logger::default())
            .configure(configure)
            .service(Files::new("/assets/photos", photos_dir.clone()))
            .service(Files::new("/static", "static").show_files_listing())
    })
    .bind(bind)?
    .run()
    .await
}
