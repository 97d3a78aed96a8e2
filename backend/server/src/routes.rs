use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::debug;

use crate::{
    error::AppError,
    models::{BubblePoint, CityAggregate, LinePoint, PieSlice, Row},
    state::AppState,
};

pub async fn restaurants_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Row>>, AppError> {
    let restaurants = state.service.list_restaurants().await?;
    debug!("Serving {} restaurants", restaurants.len());

    Ok(Json(restaurants))
}

pub async fn kpis_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CityAggregate>>, AppError> {
    Ok(Json(state.service.city_kpis().await?))
}

pub async fn bubble_chart_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BubblePoint>>, AppError> {
    Ok(Json(state.service.bubble_chart().await?))
}

pub async fn pie_chart_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PieSlice>>, AppError> {
    Ok(Json(state.service.pie_chart().await?))
}

pub async fn line_chart_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LinePoint>>, AppError> {
    Ok(Json(state.service.line_chart().await?))
}
