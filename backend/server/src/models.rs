//! # Restaurant Table
//!
//! Records come from the hosted `restaurant` table filled by the scraper. Column names are
//! French and are kept on the wire so the front-end reads them unchanged.
//!
//! ## Schema
//! - ville (**string**): grouping key, compared byte for byte
//! - note (**float**): rating, 0.0 to 5.0 expected but never checked
//! - nb_avis (**int**): review count
//! - id and anything else: opaque, passed through by the listing endpoint only
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CITY_COLUMN: &str = "ville";

/// One raw table row as returned by the store.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RestaurantRecord {
    #[serde(rename = "ville")]
    pub city: String,

    #[serde(rename = "note")]
    pub rating: f64,

    #[serde(rename = "nb_avis")]
    pub review_count: u64,
}

impl RestaurantRecord {
    pub fn from_row(row: Row) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(row))
    }
}

/// Only the grouping key, for views that never touch ratings.
#[derive(Deserialize)]
pub struct CityOnly {
    #[serde(rename = "ville")]
    pub city: String,
}

/// City and rating, for views that ignore review counts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityRating {
    #[serde(rename = "ville")]
    pub city: String,

    #[serde(rename = "note")]
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAggregate {
    #[serde(rename = "ville")]
    pub city: String,

    #[serde(rename = "nombre_restaurants")]
    pub restaurant_count: u64,

    #[serde(rename = "moyenne_note")]
    pub average_rating: f64,

    #[serde(rename = "total_avis")]
    pub total_reviews: u64,

    #[serde(rename = "meilleure_note")]
    pub max_rating: f64,

    #[serde(rename = "pire_note")]
    pub min_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubblePoint {
    #[serde(rename = "ville")]
    pub city: String,

    #[serde(rename = "moyenne_note")]
    pub average_rating: f64,

    #[serde(rename = "total_avis")]
    pub total_reviews: u64,

    #[serde(rename = "nombre_restaurants")]
    pub restaurant_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    #[serde(rename = "ville")]
    pub city: String,

    #[serde(rename = "nombre_restaurants")]
    pub restaurant_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    #[serde(rename = "ville")]
    pub city: String,

    #[serde(rename = "moyenne_note")]
    pub average_rating: f64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_record_ignores_extra_columns() {
        let record = RestaurantRecord::from_row(row(json!({
            "id": 42,
            "nom": "Chez Paul",
            "ville": "Paris",
            "note": 4.5,
            "nb_avis": 120
        })))
        .unwrap();

        assert_eq!(record.city, "Paris");
        assert_eq!(record.rating, 4.5);
        assert_eq!(record.review_count, 120);
    }

    #[test]
    fn test_record_accepts_integer_rating() {
        let record =
            RestaurantRecord::from_row(row(json!({"ville": "Lyon", "note": 4, "nb_avis": 0})))
                .unwrap();

        assert_eq!(record.rating, 4.0);
    }

    #[test]
    fn test_record_missing_rating() {
        let err = RestaurantRecord::from_row(row(json!({"ville": "Lyon", "nb_avis": 3})))
            .unwrap_err();

        assert!(err.to_string().contains("note"));
    }

    #[test]
    fn test_city_rating_ignores_review_count() {
        let missing: CityRating =
            serde_json::from_value(json!({"ville": "Paris", "note": 4.0})).unwrap();
        let null: CityRating =
            serde_json::from_value(json!({"ville": "Lyon", "note": 3.0, "nb_avis": null}))
                .unwrap();

        assert_eq!(missing.rating, 4.0);
        assert_eq!(null.city, "Lyon");
    }

    #[test]
    fn test_null_city_rejected() {
        assert!(
            RestaurantRecord::from_row(row(json!({"ville": null, "note": 4.0, "nb_avis": 1})))
                .is_err()
        );
        assert!(serde_json::from_value::<CityOnly>(json!({"ville": null})).is_err());
    }

    #[test]
    fn test_aggregate_wire_names() {
        let value = serde_json::to_value(CityAggregate {
            city: "Paris".to_string(),
            restaurant_count: 2,
            average_rating: 4.5,
            total_reviews: 30,
            max_rating: 5.0,
            min_rating: 4.0,
        })
        .unwrap();

        assert_eq!(
            value,
            json!({
                "ville": "Paris",
                "nombre_restaurants": 2,
                "moyenne_note": 4.5,
                "total_avis": 30,
                "meilleure_note": 5.0,
                "pire_note": 4.0
            })
        );
    }
}
