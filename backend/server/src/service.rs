use std::sync::Arc;

use tracing::debug;

use crate::{
    aggregate::{CityGroups, decode_records, line_points, pie_slices},
    database::RestaurantStore,
    error::AppError,
    models::{BubblePoint, CITY_COLUMN, CityAggregate, LinePoint, PieSlice, Row},
};

/// Request-time views over one full scan of the restaurant table.
#[derive(Clone)]
pub struct AggregationService {
    store: Arc<dyn RestaurantStore>,
}

impl AggregationService {
    pub fn new(store: Arc<dyn RestaurantStore>) -> Self {
        Self { store }
    }

    /// Raw rows, ordered by city by the store itself.
    pub async fn list_restaurants(&self) -> Result<Vec<Row>, AppError> {
        Ok(self.store.fetch_rows(Some(CITY_COLUMN)).await?)
    }

    pub async fn city_kpis(&self) -> Result<Vec<CityAggregate>, AppError> {
        Ok(self.city_groups().await?.kpis())
    }

    pub async fn bubble_chart(&self) -> Result<Vec<BubblePoint>, AppError> {
        Ok(self.city_groups().await?.bubble_points())
    }

    pub async fn pie_chart(&self) -> Result<Vec<PieSlice>, AppError> {
        let rows = self.store.fetch_rows(None).await?;

        Ok(pie_slices(rows)?)
    }

    /// Sorted by city, unlike the other views.
    pub async fn line_chart(&self) -> Result<Vec<LinePoint>, AppError> {
        let rows = self.store.fetch_rows(None).await?;

        Ok(line_points(rows)?)
    }

    async fn city_groups(&self) -> Result<CityGroups, AppError> {
        let rows = self.store.fetch_rows(None).await?;
        let total = rows.len();

        let groups = CityGroups::from_records(decode_records(rows)?);
        debug!("Grouped {total} restaurants into {} cities", groups.len());

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::database::MemoryStore;

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()
    }

    fn service(values: Vec<Value>) -> AggregationService {
        AggregationService::new(Arc::new(MemoryStore::new(rows(values))))
    }

    #[tokio::test]
    async fn test_list_restaurants_ordered_by_city() {
        let service = service(vec![
            json!({"id": 1, "ville": "Paris", "note": 4.0, "nb_avis": 10}),
            json!({"id": 2, "ville": "Lyon", "note": 3.0, "nb_avis": 5}),
        ]);

        let listed = service.list_restaurants().await.unwrap();

        assert_eq!(listed[0]["ville"], "Lyon");
        assert_eq!(listed[0]["id"], 2);
        assert_eq!(listed[1]["ville"], "Paris");
    }

    #[tokio::test]
    async fn test_missing_rating_only_breaks_rating_views() {
        let service = service(vec![
            json!({"ville": "Paris", "note": 4.0, "nb_avis": 10}),
            json!({"ville": "Lyon", "nb_avis": 5}),
        ]);

        assert!(matches!(
            service.city_kpis().await,
            Err(AppError::MalformedRecord(_))
        ));
        assert!(service.bubble_chart().await.is_err());
        assert!(service.line_chart().await.is_err());
        assert_eq!(service.pie_chart().await.unwrap().len(), 2);
        assert_eq!(service.list_restaurants().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_line_chart_ignores_review_count() {
        let service = service(vec![
            json!({"ville": "Paris", "note": 4.0}),
            json!({"ville": "Lyon", "note": 3.0, "nb_avis": null}),
        ]);

        let points = service.line_chart().await.unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].city, "Lyon");
        assert_eq!(points[0].average_rating, 3.0);
        assert_eq!(points[1].city, "Paris");
        assert_eq!(points[1].average_rating, 4.0);
        assert!(service.city_kpis().await.is_err());
    }

    #[tokio::test]
    async fn test_null_city_fails_every_view() {
        let service = service(vec![
            json!({"ville": "Paris", "note": 4.0, "nb_avis": 10}),
            json!({"ville": null, "note": 3.0, "nb_avis": 5}),
        ]);

        assert!(service.city_kpis().await.is_err());
        assert!(service.bubble_chart().await.is_err());
        assert!(service.pie_chart().await.is_err());
        assert!(service.line_chart().await.is_err());
        assert_eq!(service.list_restaurants().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let service = AggregationService::new(Arc::new(MemoryStore::failing("auth failed")));

        assert!(matches!(
            service.list_restaurants().await,
            Err(AppError::DataAccess(_))
        ));
        assert!(service.city_kpis().await.is_err());
        assert!(service.bubble_chart().await.is_err());
        assert!(service.pie_chart().await.is_err());
        assert!(service.line_chart().await.is_err());
    }
}
