use actix_files::Files;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use chrono::{Local, Months, NaiveDate};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::backend::GroupBackend;
use crate::board::{
    compile_assignments, unlabeled_completed, Assignment, Board, Card, ColumnId, Compiled, DragSession,
    LabelOutcome, RngColorSource,
};
use crate::config::Config;
use crate::display::write_plan_csv;
use crate::error::BoardError;
use crate::session::{BoardSession, Notice};

// Open boards live in memory only and are dropped when the page closes them
pub struct AppState {
    pub backend: Arc<dyn GroupBackend>,
    pub boards: Mutex<HashMap<String, Arc<BoardSession>>>,
    pub term_months: u32,
}

impl AppState {
    pub fn new(backend: Arc<dyn GroupBackend>, term_months: u32) -> Self {
        Self {
            backend,
            boards: Mutex::new(HashMap::new()),
            term_months,
        }
    }

    fn board(&self, board_id: &str) -> Result<Arc<BoardSession>, BoardError> {
        let boards = self.boards.lock().map_err(|_| BoardError::LockPoisoned)?;
        boards
            .get(board_id)
            .cloned()
            .ok_or_else(|| BoardError::BoardNotFound(board_id.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    village_id: i64,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRequest {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    source_column_id: ColumnId,
    dest_column_id: ColumnId,
    source_index: usize,
    dest_index: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverRequest {
    session: DragSession,
    over_column_id: ColumnId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropRequest {
    session: DragSession,
    dest_index: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLabelRequest {
    label_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    board_id: String,
    ready: bool,
    saving: bool,
    board: Board,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    board_id: String,
    ready: bool,
    notices: Vec<Notice>,
    board: Board,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    moved: bool,
    board: Board,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverResponse {
    moved: bool,
    session: DragSession,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelResponse {
    outcome: LabelOutcome,
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    nothing_to_save: bool,
    assignments: Vec<Assignment>,
    unlabeled_completed: Vec<Card>,
}

fn board_view(board_id: &str, session: &BoardSession) -> Result<BoardView, BoardError> {
    Ok(BoardView {
        board_id: board_id.to_string(),
        ready: session.is_ready()?,
        saving: session.is_saving(),
        board: session.snapshot()?,
    })
}

fn default_term(today: NaiveDate, months: u32) -> (NaiveDate, NaiveDate) {
    let end = today.checked_add_months(Months::new(months)).unwrap_or(today);
    (today, end)
}

// Open a board for a village and seed it from the backend
async fn create_board(
    req: web::Json<CreateBoardRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (default_start, default_end) = default_term(Local::now().date_naive(), state.term_months);
    let start_date = req.start_date.unwrap_or(default_start);
    let end_date = req.end_date.unwrap_or(default_end);

    let session = Arc::new(BoardSession::new(
        req.village_id,
        start_date,
        end_date,
        state.backend.clone(),
        Box::new(RngColorSource::new(StdRng::from_entropy())),
    ));
    let report = session.load().await?;

    let board_id = Uuid::new_v4().to_string();
    state
        .boards
        .lock()
        .map_err(|_| BoardError::LockPoisoned)?
        .insert(board_id.clone(), session.clone());
    if report.notices.iter().any(Notice::is_error) {
        warn!("Opened board {} for village {} with load errors", board_id, req.village_id);
    } else {
        info!("Opened board {} for village {}", board_id, req.village_id);
    }

    Ok(HttpResponse::Ok().json(LoadResponse {
        board_id,
        ready: report.ready,
        notices: report.notices,
        board: session.snapshot()?,
    }))
}

async fn get_board(board_id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = state.board(&board_id)?;
    Ok(HttpResponse::Ok().json(board_view(&board_id, &session)?))
}

async fn close_board(board_id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let removed = state
        .boards
        .lock()
        .map_err(|_| BoardError::LockPoisoned)?
        .remove(board_id.as_str());
    match removed {
        Some(_) => {
            info!("Closed board {}", board_id);
            Ok(HttpResponse::NoContent().finish())
        }
        None => Err(BoardError::BoardNotFound(board_id.into_inner()).into()),
    }
}

async fn reload_board(board_id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = state.board(&board_id)?;
    let report = session.load().await?;
    Ok(HttpResponse::Ok().json(LoadResponse {
        board_id: board_id.into_inner(),
        ready: report.ready,
        notices: report.notices,
        board: session.snapshot()?,
    }))
}

async fn set_period(
    board_id: web::Path<String>,
    req: web::Json<PeriodRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let session = state.board(&board_id)?;
    session.set_period(req.start_date, req.end_date)?;
    Ok(HttpResponse::Ok().json(board_view(&board_id, &session)?))
}

async fn move_card(
    board_id: web::Path<String>,
    req: web::Json<MoveRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let session = state.board(&board_id)?;
    let moved = session.move_card(req.source_column_id, req.dest_column_id, req.source_index, req.dest_index)?;
    Ok(HttpResponse::Ok().json(MoveResponse {
        moved,
        board: session.snapshot()?,
    }))
}

async fn hover_card(
    board_id: web::Path<String>,
    req: web::Json<HoverRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let session = state.board(&board_id)?;
    let req = req.into_inner();
    let response = match session.hover_card(&req.session, req.over_column_id)? {
        Some(updated) => HoverResponse {
            moved: true,
            session: updated,
        },
        None => HoverResponse {
            moved: false,
            session: req.session,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

async fn drop_card(
    board_id: web::Path<String>,
    req: web::Json<DropRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let session = state.board(&board_id)?;
    let moved = session.drop_card(&req.session, req.dest_index)?;
    Ok(HttpResponse::Ok().json(MoveResponse {
        moved,
        board: session.snapshot()?,
    }))
}

async fn add_label(
    path: web::Path<(String, String)>,
    req: web::Json<AddLabelRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (board_id, card_id) = path.into_inner();
    let session = state.board(&board_id)?;
    let outcome = session.add_label_to_card(&card_id, req.label_id)?;
    let message = match outcome {
        LabelOutcome::Added => None,
        LabelOutcome::AlreadyAssigned => Some("Leader already assigned to this member".to_string()),
        LabelOutcome::UnknownCard => Some(format!("Card {} is no longer on the board", card_id)),
        LabelOutcome::UnknownLabel => Some(format!("Leader {} is not a candidate", req.label_id)),
    };
    Ok(HttpResponse::Ok().json(LabelResponse { outcome, message }))
}

async fn remove_label(
    path: web::Path<(String, String, i64)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (board_id, card_id, label_id) = path.into_inner();
    let session = state.board(&board_id)?;
    let removed = session.remove_label_from_card(&card_id, label_id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"removed": removed})))
}

async fn preview(board_id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let board = state.board(&board_id)?.snapshot()?;
    let unlabeled: Vec<Card> = unlabeled_completed(&board).into_iter().cloned().collect();

    let response = match compile_assignments(&board) {
        Compiled::NothingToSave => PreviewResponse {
            nothing_to_save: true,
            assignments: Vec::new(),
            unlabeled_completed: unlabeled,
        },
        Compiled::Batch(batch) => PreviewResponse {
            nothing_to_save: false,
            assignments: batch.assignments,
            unlabeled_completed: unlabeled,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

async fn save(board_id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = state.board(&board_id)?;
    let notice = session.save().await?;
    Ok(HttpResponse::Ok().json(notice))
}

async fn export_csv(board_id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let board = state.board(&board_id)?.snapshot()?;
    let batch = match compile_assignments(&board) {
        Compiled::Batch(batch) => batch,
        Compiled::NothingToSave => {
            return Ok(HttpResponse::Ok().json(Notice::NothingToSave));
        }
    };

    let mut body = Vec::new();
    write_plan_csv(&mut body, &batch, &board)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to write CSV: {}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"gbs-village-{}.csv\"", board.village_id),
        ))
        .body(body))
}

/// Registers the board API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/boards")
            .route("", web::post().to(create_board))
            .route("/{board_id}", web::get().to(get_board))
            .route("/{board_id}", web::delete().to(close_board))
            .route("/{board_id}/reload", web::post().to(reload_board))
            .route("/{board_id}/period", web::put().to(set_period))
            .route("/{board_id}/moves", web::post().to(move_card))
            .route("/{board_id}/hover", web::post().to(hover_card))
            .route("/{board_id}/drop", web::post().to(drop_card))
            .route("/{board_id}/cards/{card_id}/labels", web::post().to(add_label))
            .route(
                "/{board_id}/cards/{card_id}/labels/{label_id}",
                web::delete().to(remove_label),
            )
            .route("/{board_id}/preview", web::get().to(preview))
            .route("/{board_id}/save", web::post().to(save))
            .route("/{board_id}/export", web::get().to(export_csv)),
    );
}

pub async fn start_server(config: &Config, backend: Arc<dyn GroupBackend>) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(backend, config.term_months));
    let static_dir = config.static_dir.clone();
    let serve_static = static_dir.is_dir();

    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure);
        if serve_static {
            app = app.service(Files::new("/static", static_dir.clone()).index_file("index.html"));
        }
        app
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
