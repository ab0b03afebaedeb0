// src/handlers/reports.rs

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{ReadAverbacao, RequirePermission},
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportParams {
    /// `true` abre no navegador em vez de baixar
    #[serde(default)]
    pub inline: bool,
}

#[utoipa::path(
    get,
    path = "/dashboard/relatorios/averbacoes/{id}",
    tag = "Reports",
    params(
        ("id" = Uuid, Path, description = "ID da averbação"),
        ReportParams
    ),
    responses(
        (status = 200, description = "PDF da averbação", content_type = "application/pdf"),
        (status = 403, description = "Sem AVERBACAO:READ"),
        (status = 404, description = "Averbação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn averbacao_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<ReadAverbacao>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(params): Query<ReportParams>,
) -> Result<Response, ApiError> {
    let report = app_state
        .report_service
        .generate_averbacao_pdf(&session, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let disposition = if params.inline { "inline" } else { "attachment" };
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("{}; filename=\"{}\"", disposition, report.file_name),
        ),
    ];

    Ok((headers, report.bytes).into_response())
}
