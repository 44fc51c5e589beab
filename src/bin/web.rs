//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Configuration comes from the environment (see `anime_tournament_web::config`).

use actix_files::Files;
use actix_web::{
    get, post, put,
    web::{self, Data, Json},
    App, HttpResponse, HttpServer, Responder,
};
use anime_tournament_web::catalog::{
    load_completed_entries, resolve_posters, HttpTransport, ShikimoriClient, TokioDelay,
};
use anime_tournament_web::config::Config;
use anime_tournament_web::storage::{load_tournament, save_tournament, FileStore};
use anime_tournament_web::{
    load_entries, ranking, reset_tournament, set_rounds, start_tournament, tournament_view,
    undo_last_vote, vote, write_ranking_csv, Ballot, TargetType, Tournament, TournamentError,
};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Server state: the one tournament, its store, and the catalog client.
struct AppState {
    tournament: RwLock<Tournament>,
    store: FileStore,
    catalog: ShikimoriClient<HttpTransport, TokioDelay>,
    /// Set while a catalog fetch is running.
    loading: AtomicBool,
}

type State = Data<AppState>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct LoadCatalogBody {
    username: String,
    #[serde(default)]
    target_type: TargetType,
    rounds: Option<u32>,
}

#[derive(Deserialize)]
struct RoundsBody {
    rounds: u32,
}

/// `{"winner": "<title>"}` or `{"draw": true}`.
#[derive(Deserialize)]
struct VoteBody {
    winner: Option<String>,
    #[serde(default)]
    draw: bool,
}

impl VoteBody {
    fn into_ballot(self) -> Option<Ballot> {
        match (self.draw, self.winner) {
            (true, _) => Some(Ballot::Draw),
            (false, Some(title)) => Some(Ballot::Win(title)),
            (false, None) => None,
        }
    }
}

/// Clears the loading flag when the fetch ends, however it ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn error_json(msg: impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": msg.to_string() })
}

/// Snapshot after a mutation; failures are logged only.
fn persist(state: &AppState, t: &Tournament) {
    if let Err(e) = save_tournament(&state.store, t) {
        log::warn!("Failed to save tournament state: {}", e);
    }
}

/// Apply a mutation under the write lock and snapshot it.
fn mutate<F>(state: &AppState, f: F) -> Result<(), HttpResponse>
where
    F: FnOnce(&mut Tournament) -> Result<(), TournamentError>,
{
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return Err(HttpResponse::InternalServerError().body("lock error")),
    };
    match f(&mut *g) {
        Ok(()) => {
            persist(state, &g);
            Ok(())
        }
        Err(e) => Err(HttpResponse::BadRequest().json(error_json(e))),
    }
}

/// Fetch posters for the current pair (outside the lock) and merge them in.
async fn refresh_posters(state: &AppState) {
    let (target, missing) = match state.tournament.read() {
        Ok(g) => (g.target_type, g.entries_missing_poster()),
        Err(_) => return,
    };
    if missing.is_empty() {
        return;
    }
    let found = resolve_posters(&state.catalog, &state.store, target, &missing).await;
    if found.is_empty() {
        return;
    }
    if let Ok(mut g) = state.tournament.write() {
        // The tournament may have been reset or reloaded meanwhile.
        if g.started && g.target_type == target {
            g.posters.extend(found);
            persist(state, &g);
        }
    }
}

/// Current tournament view as JSON.
fn view_response(state: &AppState) -> HttpResponse {
    match state.tournament.read() {
        Ok(g) => HttpResponse::Ok().json(tournament_view(&g)),
        Err(_) => HttpResponse::InternalServerError().body("lock error"),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "anime-tournament-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Get the tournament view.
#[get("/api/tournament")]
async fn api_get_tournament(state: State) -> HttpResponse {
    view_response(&state)
}

/// Fetch the user's completed list and commit it (tournament must not be started).
#[post("/api/catalog")]
async fn api_load_catalog(state: State, body: Json<LoadCatalogBody>) -> HttpResponse {
    let body = body.into_inner();
    let username = body.username.trim().to_string();
    if username.is_empty() {
        return HttpResponse::BadRequest().json(error_json("Username is required"));
    }
    if let Some(rounds) = body.rounds {
        if let Err(resp) = mutate(&state, |t| set_rounds(t, rounds)) {
            return resp;
        }
    }
    if state.loading.swap(true, Ordering::SeqCst) {
        return HttpResponse::Conflict().json(error_json("A list is already being loaded"));
    }
    let _guard = LoadingGuard(&state.loading);

    let entries = match load_completed_entries(&state.catalog, &username, body.target_type).await {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("Error fetching {} list for '{}': {}", body.target_type.as_str(), username, e);
            return HttpResponse::BadGateway().json(error_json(e.user_message(body.target_type)));
        }
    };
    if let Err(resp) = mutate(&state, |t| load_entries(t, username, body.target_type, entries)) {
        return resp;
    }
    view_response(&state)
}

/// Set the number of rounds (before the start).
#[put("/api/rounds")]
async fn api_set_rounds(state: State, body: Json<RoundsBody>) -> HttpResponse {
    match mutate(&state, |t| set_rounds(t, body.rounds)) {
        Ok(()) => view_response(&state),
        Err(resp) => resp,
    }
}

/// Start the tournament (pairs round 1).
#[post("/api/start")]
async fn api_start(state: State) -> HttpResponse {
    if let Err(resp) = mutate(&state, start_tournament) {
        return resp;
    }
    refresh_posters(&state).await;
    view_response(&state)
}

/// Vote on the current pair.
#[post("/api/vote")]
async fn api_vote(state: State, body: Json<VoteBody>) -> HttpResponse {
    let ballot = match body.into_inner().into_ballot() {
        Some(b) => b,
        None => return HttpResponse::BadRequest().json(error_json("Pick a winner or a draw")),
    };
    if let Err(resp) = mutate(&state, |t| vote(t, ballot)) {
        return resp;
    }
    refresh_posters(&state).await;
    view_response(&state)
}

/// Undo the last vote.
#[post("/api/undo")]
async fn api_undo(state: State) -> HttpResponse {
    if let Err(resp) = mutate(&state, undo_last_vote) {
        return resp;
    }
    refresh_posters(&state).await;
    view_response(&state)
}

/// Clear everything back to the initial state.
#[post("/api/reset")]
async fn api_reset(state: State) -> HttpResponse {
    let result = mutate(&state, |t| {
        reset_tournament(t);
        Ok(())
    });
    match result {
        Ok(()) => view_response(&state),
        Err(resp) => resp,
    }
}

/// Ranking as CSV download.
#[get("/api/ranking.csv")]
async fn api_ranking_csv(state: State) -> HttpResponse {
    let standings = match state.tournament.read() {
        Ok(g) => ranking(&g),
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let mut buf = Vec::new();
    if let Err(e) = write_ranking_csv(&standings, &mut buf) {
        log::error!("Failed to write ranking CSV: {}", e);
        return HttpResponse::InternalServerError().json(error_json(e));
    }
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(("Content-Disposition", "attachment; filename=\"ranking.csv\""))
        .body(buf)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let store = FileStore::open(&config.data_dir)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let transport = HttpTransport::new(&config.catalog_url, &config.user_agent)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let tournament = load_tournament(&store);

    let state = Data::new(AppState {
        tournament: RwLock::new(tournament),
        store,
        catalog: ShikimoriClient::new(transport, TokioDelay, config.retry),
        loading: AtomicBool::new(false),
    });

    let bind = (config.host.clone(), config.port);
    log::info!(
        "Starting server at http://{}:{} (data dir {})",
        bind.0,
        bind.1,
        config.data_dir.display()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_get_tournament)
            .service(api_load_catalog)
            .service(api_set_rounds)
            .service(api_start)
            .service(api_vote)
            .service(api_undo)
            .service(api_reset)
            .service(api_ranking_csv)
            .service(Files::new("/static", "static"))
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
