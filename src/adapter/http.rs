//! HTTP transport: upload, preview, compute, progress and export
//! endpoints consumed by the web frontend.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::http::header::ContentDisposition;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use dashmap::DashMap;
use futures_util::StreamExt as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::adapter::{excel, export};
use crate::app::{compute_all, Progress};
use crate::domain::solver::Solver;
use crate::domain::{ComputeResult, DmuRecord, ModelConfig};

/// Shared server state: the upload cache, the batch progress counter and
/// the solver handed to every batch.
pub struct AppState {
    uploads: DashMap<String, Vec<u8>>,
    progress: Arc<Progress>,
    solver: Arc<dyn Solver>,
    max_workers: usize,
}

impl AppState {
    /// Create server state around a solver.
    pub fn new(solver: Arc<dyn Solver>, max_workers: usize) -> Self {
        Self {
            uploads: DashMap::new(),
            progress: Arc::new(Progress::new()),
            solver,
            max_workers,
        }
    }
}

/// Compute request: a model configuration plus the raw panel records.
#[derive(Debug, Deserialize)]
pub struct ComputeRequest {
    pub config: ModelConfig,
    pub data: Vec<DmuRecord>,
}

/// Compute response with aggregate counts; per-DMU failures surface only
/// as absent results.
#[derive(Debug, Serialize)]
pub struct ComputeResponse {
    pub success: bool,
    pub message: String,
    pub results: Option<Vec<ComputeResult>>,
    pub total_count: usize,
    pub computed_count: usize,
}

/// Export request: previously computed results plus the configuration
/// that produced them.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub config: ModelConfig,
    pub results: Vec<ComputeResult>,
}

#[derive(Debug, Deserialize)]
struct SheetDataForm {
    file_id: String,
    sheet_name: String,
}

async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "NDDF dual-model shadow price API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn progress(state: web::Data<AppState>) -> impl Responder {
    let (current, total) = state.progress.snapshot();
    HttpResponse::Ok().json(json!({ "current": current, "total": total }))
}

/// POST /api/upload — cache the workbook bytes and preview its first
/// sheet.
async fn upload(mut payload: Multipart, state: web::Data<AppState>) -> impl Responder {
    let mut filename = String::new();
    let mut bytes: Vec<u8> = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                return HttpResponse::BadRequest()
                    .json(json!({"error": format!("invalid multipart payload: {e}")}))
            }
        };

        if let Some(name) = field.content_disposition().get_filename() {
            filename = name.to_string();
        }
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(data) => bytes.extend_from_slice(&data),
                Err(e) => {
                    return HttpResponse::BadRequest()
                        .json(json!({"error": format!("failed to read upload: {e}")}))
                }
            }
        }
    }

    if !filename.ends_with(".xlsx") && !filename.ends_with(".xls") {
        return HttpResponse::BadRequest()
            .json(json!({"error": "please upload an Excel workbook (.xlsx or .xls)"}));
    }

    let sheets = match excel::sheet_names(&bytes) {
        Ok(sheets) if !sheets.is_empty() => sheets,
        Ok(_) => {
            return HttpResponse::BadRequest().json(json!({"error": "workbook has no sheets"}))
        }
        Err(e) => {
            warn!(error = %e, filename, "failed to parse uploaded workbook");
            return HttpResponse::InternalServerError()
                .json(json!({"error": format!("failed to parse workbook: {e}")}));
        }
    };

    let sheet = match excel::read_sheet(&bytes, &sheets[0]) {
        Ok(sheet) => sheet,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(json!({"error": format!("failed to read sheet: {e}")}))
        }
    };

    let file_id = file_id(&filename, bytes.len());
    state.uploads.insert(file_id.clone(), bytes);
    info!(filename, file_id, sheets = sheets.len(), "workbook uploaded");

    HttpResponse::Ok().json(json!({
        "success": true,
        "filename": filename,
        "fileId": file_id,
        "sheets": sheets,
        "currentSheet": sheet.sheet_name,
        "columns": sheet.columns,
        "preview": sheet.preview,
        "totalRows": sheet.total_rows,
    }))
}

/// POST /api/sheet-data — full contents of one sheet of a cached upload.
async fn sheet_data(form: web::Form<SheetDataForm>, state: web::Data<AppState>) -> impl Responder {
    let Some(bytes) = state.uploads.get(&form.file_id).map(|b| b.value().clone()) else {
        return HttpResponse::BadRequest()
            .json(json!({"error": "file expired, please upload again"}));
    };

    match excel::read_sheet(&bytes, &form.sheet_name) {
        Ok(sheet) => HttpResponse::Ok().json(json!({
            "success": true,
            "sheetName": sheet.sheet_name,
            "columns": sheet.columns,
            "preview": sheet.preview,
            "totalRows": sheet.total_rows,
            "data": sheet.records,
        })),
        Err(e) => HttpResponse::InternalServerError()
            .json(json!({"error": format!("failed to read sheet: {e}")})),
    }
}

/// POST /api/compute — run the batch and return the solved DMUs.
async fn compute(request: web::Json<ComputeRequest>, state: web::Data<AppState>) -> impl Responder {
    let ComputeRequest { config, data } = request.into_inner();
    let total = data.len();

    match compute_all(
        &data,
        &config,
        state.solver.clone(),
        &state.progress,
        state.max_workers,
    )
    .await
    {
        Ok(results) => {
            let computed = results.len();
            HttpResponse::Ok().json(ComputeResponse {
                success: true,
                message: format!("batch complete: {total} submitted, {computed} solved"),
                results: Some(results),
                total_count: total,
                computed_count: computed,
            })
        }
        Err(e) => HttpResponse::Ok().json(ComputeResponse {
            success: false,
            message: format!("compute failed: {e}"),
            results: None,
            total_count: total,
            computed_count: 0,
        }),
    }
}

/// POST /api/export — stream the results back as an xlsx attachment.
async fn export_results(request: web::Json<ExportRequest>) -> impl Responder {
    let ExportRequest { config, results } = request.into_inner();

    match export::results_workbook(&config, &results) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
            .insert_header(ContentDisposition::attachment(export::export_filename(
                &config,
            )))
            .body(bytes),
        Err(e) => HttpResponse::InternalServerError()
            .json(json!({"error": format!("export failed: {e}")})),
    }
}

/// GET /api/columns-info — category labels and an example configuration.
async fn columns_info() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "inputTypes": ["Inputs"],
        "outputTypes": ["Desirable outputs"],
        "undesiredTypes": ["Undesired outputs"],
        "defaultConfig": {
            "inputCols": [
                {"name": "L", "direction": 1, "weight": 0.167},
                {"name": "K", "direction": 1, "weight": 0.167},
                {"name": "E", "direction": 1, "weight": 0.167}
            ],
            "outputCols": [
                {"name": "Y", "direction": 1, "weight": 0.25}
            ],
            "undesiredCols": [
                {"name": "C", "direction": 1, "weight": 0.25},
                {"name": "P", "direction": 0, "weight": 0}
            ],
            "idCol": "id",
            "yearCol": "year",
            "isVRS": false
        }
    }))
}

/// Upload cache key: stable per process for a given name and size.
fn file_id(filename: &str, len: usize) -> String {
    let mut hasher = DefaultHasher::new();
    filename.hash(&mut hasher);
    len.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Large panels arrive as JSON bodies; the default 2 MiB limit is too
/// small for multi-decade national panels.
const JSON_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Route table shared by the server and the test harness.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(JSON_BODY_LIMIT))
        .route("/", web::get().to(root))
        .route("/progress", web::get().to(progress))
        .route("/api/upload", web::post().to(upload))
        .route("/api/sheet-data", web::post().to(sheet_data))
        .route("/api/compute", web::post().to(compute))
        .route("/api/export", web::post().to(export_results))
        .route("/api/columns-info", web::get().to(columns_info));
}

/// Run the HTTP server until shutdown.
pub async fn run_server(bind: &str, state: web::Data<AppState>) -> std::io::Result<()> {
    info!(bind, "starting HTTP server");
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}
