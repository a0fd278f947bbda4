//! Ticket handlers — creation, listings, detail, and workflow actions.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponse, Response};

use ticketdesk_core::error::AppError;
use ticketdesk_entity::ticket::{Ticket, TicketListItem};
use ticketdesk_service::ticket::query::TicketDetail;
use ticketdesk_service::ticket::workflow::{CreateTicketRequest, UploadedFile};

use crate::dto::request::{ApproveAssignRequest, ChangeStatusRequest, TicketListParams};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthSession;
use crate::state::AppState;

/// GET /api/tickets — tickets the caller created.
pub async fn my_created(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(params): Query<TicketListParams>,
) -> Result<Json<ApiResponse<Vec<TicketListItem>>>, ApiError> {
    let tickets = state
        .queries
        .my_created(&auth, &params.filter(), params.sort())
        .await?;
    Ok(Json(ApiResponse::ok(tickets)))
}

/// GET /api/tickets/assigned — tickets assigned to the caller.
pub async fn my_assigned(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(params): Query<TicketListParams>,
) -> Result<Json<ApiResponse<Vec<TicketListItem>>>, ApiError> {
    let tickets = state
        .queries
        .my_assigned(&auth, &params.filter(), params.sort())
        .await?;
    Ok(Json(ApiResponse::ok(tickets)))
}

/// GET /api/tickets/{id} — detail view data.
pub async fn detail(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TicketDetail>>, ApiError> {
    let detail = state.queries.detail(&auth, id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// POST /api/tickets — multipart create with optional file attachments.
///
/// Fields: `title`, `description`, `department_id`, and any number of
/// `files` parts.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthSession,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Ticket>>, ApiError> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut department_id: Option<i64> = None;
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => {
                title = Some(read_text(field).await?);
            }
            "description" => {
                description = Some(read_text(field).await?);
            }
            "department_id" => {
                let text = read_text(field).await?;
                department_id = Some(
                    text.trim()
                        .parse::<i64>()
                        .map_err(|_| AppError::validation("Invalid department_id"))?,
                );
            }
            "files" | "file" => {
                let file_name = field.file_name().unwrap_or("attachment").to_string();
                let content_type = field.content_type().map(String::from);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                files.push(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    let title = title.ok_or_else(|| AppError::validation("title is required"))?;
    let description = description.ok_or_else(|| AppError::validation("description is required"))?;
    let department_id =
        department_id.ok_or_else(|| AppError::validation("department_id is required"))?;

    let ticket = state
        .workflow
        .create(
            &auth,
            CreateTicketRequest {
                title,
                description,
                department_id,
                files,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(ticket)))
}

/// GET /api/tickets/{id}/attachments/{attachment_id} — download one
/// attachment, under the detail-view visibility rule.
pub async fn attachment(
    State(state): State<AppState>,
    auth: AuthSession,
    Path((id, attachment_id)): Path<(i64, i64)>,
) -> Result<Response, ApiError> {
    let (row, data) = state
        .queries
        .attachment_content(&auth, id, attachment_id)
        .await?;

    let mut headers = HeaderMap::new();
    if let Some(value) = row
        .content_type
        .as_deref()
        .and_then(|ct| ct.parse::<HeaderValue>().ok())
    {
        headers.insert(header::CONTENT_TYPE, value);
    }
    let disposition = format!("attachment; filename=\"{}\"", row.file_name);
    if let Ok(value) = disposition.parse::<HeaderValue>() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, data).into_response())
}

/// POST /api/tickets/{id}/manage — empowered-user self-assign.
pub async fn self_manage(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Ticket>>, ApiError> {
    let ticket = state.workflow.self_manage(&auth, id).await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// POST /api/tickets/{id}/approve — manager approve-and-assign.
pub async fn approve_and_assign(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<i64>,
    Json(req): Json<ApproveAssignRequest>,
) -> Result<Json<ApiResponse<Ticket>>, ApiError> {
    let ticket = state
        .workflow
        .approve_and_assign(&auth, id, req.assigned_user_id, req.priority)
        .await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// POST /api/tickets/{id}/solve — manager starts working directly.
pub async fn solve_myself(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Ticket>>, ApiError> {
    let ticket = state.workflow.solve_myself(&auth, id).await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// POST /api/tickets/{id}/close-solved — manager closes a solved ticket.
pub async fn close_solved(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Ticket>>, ApiError> {
    let ticket = state.workflow.manager_close_solved(&auth, id).await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// POST /api/tickets/{id}/status — generic role-scoped status change.
pub async fn change_status(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<i64>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<Ticket>>, ApiError> {
    let ticket = state
        .workflow
        .change_status(&auth, id, req.new_status, req.comment)
        .await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::validation(format!("Read error: {e}")))
}
