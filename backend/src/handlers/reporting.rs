//! Report and dashboard handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use shared::ledger::ProfitLossReport;

use crate::error::AppResult;
use crate::middleware::FactoryContext;
use crate::services::dashboard::DashboardMetrics;
use crate::services::reporting::{export_file_name, ReportQuery};
use crate::services::{DashboardService, ReportingService};
use crate::AppState;

/// Profit and loss for a date range
pub async fn profit_loss_report(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ProfitLossReport>> {
    let period = query.range()?;
    let service = ReportingService::new(state.db.clone());
    let report = service
        .profit_loss(ctx.factory_id(), period, state.config.rates.piece_rates())
        .await?;

    Ok(Json(report))
}

/// Detailed report as a CSV download
pub async fn export_profit_loss_csv(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let period = query.range()?;
    let service = ReportingService::new(state.db.clone());
    let csv = service
        .export(ctx.factory_id(), period, state.config.rates.piece_rates())
        .await?;

    let disposition = format!("attachment; filename=\"{}\"", export_file_name(period));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

/// Get dashboard metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
    ctx: FactoryContext,
) -> AppResult<Json<DashboardMetrics>> {
    let service = DashboardService::new(state.db.clone());
    let metrics = service.metrics(ctx.factory_id(), Utc::now().date_naive()).await?;

    Ok(Json(metrics))
}
