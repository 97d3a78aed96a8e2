//! # City Aggregation
//!
//! Every view is derived from one full scan of the table, recomputed on each request.
//!
//! ## Fold
//! - One linear pass over the snapshot, grouped by exact city string
//! - Per group: count, rating sum, review sum, best and worst rating
//! - A group only exists once a record was seen for it, so min/max start from
//!   that first rating and the count is never zero
//! - Groups keep first-seen order
//!
//! ## Projections
//! - KPIs: all six fields
//! - Bubble chart: average, reviews, count
//! - Pie chart: count only, so it never decodes ratings
//! - Line chart: average only, sorted by city, never decodes review counts
use indexmap::IndexMap;

use crate::models::{
    BubblePoint, CityAggregate, CityOnly, CityRating, LinePoint, PieSlice, RestaurantRecord, Row,
};

struct CityStats {
    count: u64,
    rating_sum: f64,
    review_sum: u64,
    max_rating: f64,
    min_rating: f64,
}

impl CityStats {
    fn first(record: &RestaurantRecord) -> Self {
        Self {
            count: 1,
            rating_sum: record.rating,
            review_sum: record.review_count,
            max_rating: record.rating,
            min_rating: record.rating,
        }
    }

    fn observe(&mut self, record: &RestaurantRecord) {
        self.count += 1;
        self.rating_sum += record.rating;
        self.review_sum += record.review_count;
        self.max_rating = self.max_rating.max(record.rating);
        self.min_rating = self.min_rating.min(record.rating);
    }

    fn average(&self) -> f64 {
        average(self.rating_sum, self.count)
    }
}

/// Rounds half away from zero.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn average(sum: f64, count: u64) -> f64 {
    round_one_decimal(sum / count as f64)
}

pub struct CityGroups {
    groups: IndexMap<String, CityStats>,
}

impl CityGroups {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RestaurantRecord>,
    {
        let mut groups: IndexMap<String, CityStats> = IndexMap::new();

        for record in records {
            if let Some(stats) = groups.get_mut(&record.city) {
                stats.observe(&record);
            } else {
                let stats = CityStats::first(&record);
                groups.insert(record.city, stats);
            }
        }

        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn kpis(&self) -> Vec<CityAggregate> {
        self.groups
            .iter()
            .map(|(city, stats)| CityAggregate {
                city: city.clone(),
                restaurant_count: stats.count,
                average_rating: stats.average(),
                total_reviews: stats.review_sum,
                max_rating: stats.max_rating,
                min_rating: stats.min_rating,
            })
            .collect()
    }

    pub fn bubble_points(&self) -> Vec<BubblePoint> {
        self.groups
            .iter()
            .map(|(city, stats)| BubblePoint {
                city: city.clone(),
                average_rating: stats.average(),
                total_reviews: stats.review_sum,
                restaurant_count: stats.count,
            })
            .collect()
    }
}

pub fn decode_records(rows: Vec<Row>) -> Result<Vec<RestaurantRecord>, serde_json::Error> {
    rows.into_iter().map(RestaurantRecord::from_row).collect()
}

/// Reads only `ville`, so rows without ratings still count.
pub fn pie_slices(rows: Vec<Row>) -> Result<Vec<PieSlice>, serde_json::Error> {
    let mut counts: IndexMap<String, u64> = IndexMap::new();

    for row in rows {
        let CityOnly { city } = serde_json::from_value(row.into())?;
        *counts.entry(city).or_insert(0) += 1;
    }

    Ok(counts
        .into_iter()
        .map(|(city, restaurant_count)| PieSlice {
            city,
            restaurant_count,
        })
        .collect())
}

/// Reads only `ville` and `note`, sorted by city.
pub fn line_points(rows: Vec<Row>) -> Result<Vec<LinePoint>, serde_json::Error> {
    let mut sums: IndexMap<String, (u64, f64)> = IndexMap::new();

    for row in rows {
        let CityRating { city, rating } = serde_json::from_value(row.into())?;
        let (count, total) = sums.entry(city).or_insert((0, 0.0));
        *count += 1;
        *total += rating;
    }

    let mut points: Vec<LinePoint> = sums
        .into_iter()
        .map(|(city, (count, total))| LinePoint {
            city,
            average_rating: average(total, count),
        })
        .collect();

    points.sort_by(|a, b| a.city.cmp(&b.city));

    Ok(points)
}
