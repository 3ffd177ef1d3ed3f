use actix_web::{error, middleware, web, App, HttpResponse, HttpServer, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{info, warn};

use crate::error::ScheduleError;
use crate::export::team_schedule_csv;
use crate::pivots::{build_pivots, Pivot};
use crate::request::ScheduleRequest;
use crate::schedule::{compute_schedule, ScheduleResult};

/// A computed schedule together with the request that produced it and every pivot.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub request: ScheduleRequest,
    pub schedule: ScheduleResult,
    pub pivots: Vec<Pivot>,
    pub generated: DateTime<Utc>,
}

impl ScheduleResponse {
    pub fn build(request: ScheduleRequest) -> Result<Self, ScheduleError> {
        let schedule = compute_schedule(&request)?;
        let pivots = build_pivots(&request.judging.pods, &request.robot_game.tables, &schedule.teams);
        Ok(Self {
            request,
            schedule,
            pivots,
            generated: Utc::now(),
        })
    }
}

// Most recent schedule, kept in memory only
pub struct AppState {
    pub last_schedule: Mutex<Option<ScheduleResponse>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            last_schedule: Mutex::new(None),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn failure(message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({"success": false, "error": message.into()})
}

fn state_unavailable<T>(_: PoisonError<T>) -> error::Error {
    error::ErrorInternalServerError("schedule state is unavailable")
}

// Compute and store a schedule
async fn create_schedule(
    body: web::Json<ScheduleRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    let started = Instant::now();

    match ScheduleResponse::build(request) {
        Ok(response) => {
            info!(
                "computed schedule '{}' for {} teams in {:?}",
                response.request.name,
                response.schedule.teams.len(),
                started.elapsed()
            );
            *state.last_schedule.lock().map_err(state_unavailable)? = Some(response.clone());
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            warn!("schedule request failed after {:?}: {}", started.elapsed(), e);
            Ok(HttpResponse::BadRequest().json(failure(e.to_string())))
        }
    }
}

async fn get_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    let last = state.last_schedule.lock().map_err(state_unavailable)?;

    if let Some(ref response) = *last {
        Ok(HttpResponse::Ok().json(response))
    } else {
        Ok(HttpResponse::NotFound().json(failure("No schedule available")))
    }
}

async fn get_schedule_csv(state: web::Data<AppState>) -> Result<HttpResponse> {
    let last = state.last_schedule.lock().map_err(state_unavailable)?;

    if let Some(ref response) = *last {
        let csv = team_schedule_csv(&response.schedule.teams)
            .map_err(|e| error::ErrorInternalServerError(format!("Failed to write CSV: {}", e)))?;
        Ok(HttpResponse::Ok().content_type("text/csv").body(csv))
    } else {
        Ok(HttpResponse::NotFound().json(failure("No schedule available")))
    }
}

/// Routes plus a JSON extractor that answers malformed bodies in the same
/// `{"success": false}` shape as scheduling failures.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(failure(format!("Invalid request: {}", err)));
        error::InternalError::from_response(err, response).into()
    });

    cfg.app_data(json_config).service(
        web::resource("/api/schedule")
            .route(web::post().to(create_schedule))
            .route(web::get().to(get_schedule)),
    )
    .route("/api/schedule/csv", web::get().to(get_schedule_csv));
}

pub async fn start_server(port: u16) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new());

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
