// Integration tests for the IslandHop pooling service

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use chrono::NaiveDate;
use islandhop_pooling::core::{MatchingConfig, PoolMatcher};
use islandhop_pooling::models::{Pacing, PoolSuggestionsResponse, TravelerProfile, Trip, TripPool};
use islandhop_pooling::routes::{self, AppState};
use islandhop_pooling::services::{
    ClientError, InMemoryPoolRepository, PoolLimits, PoolingService, ProfileSource, TripSource,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

const NATURE_CULTURE: [&str; 2] = ["Nature", "Culture"];

fn create_trip(
    id: &str,
    user: &str,
    start: NaiveDate,
    end: NaiveDate,
    categories: &[&str],
    pacing: Pacing,
) -> Trip {
    Trip {
        trip_id: id.to_string(),
        user_id: user.to_string(),
        trip_name: None,
        start_date: start,
        end_date: end,
        base_city: "Colombo".to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        pacing,
        places: None,
    }
}

fn create_profile(id: &str) -> TravelerProfile {
    TravelerProfile {
        id: id.to_string(),
        email: Some(id.to_string()),
        first_name: Some(format!("Traveler {}", id)),
        last_name: None,
        nationality: "Sri Lankan".to_string(),
        languages: vec!["English".to_string()],
    }
}

fn profiles_for(trips: &[Trip]) -> HashMap<String, TravelerProfile> {
    trips
        .iter()
        .map(|t| (t.user_id.clone(), create_profile(&t.user_id)))
        .collect()
}

#[::core::prelude::v1::test]
fn test_integration_end_to_end_matching() {
    let matcher = PoolMatcher::default();
    let target =
        create_trip("target", "me", date(6, 1), date(6, 10), &NATURE_CULTURE, Pacing::Normal);

    let candidates = vec![
        // Itself
        target.clone(),
        // Good matches
        create_trip("1", "u1", date(6, 1), date(6, 10), &NATURE_CULTURE, Pacing::Normal),
        create_trip("2", "u2", date(6, 8), date(6, 20), &["Nature"], Pacing::Relaxed),
        // Only via flexibility
        create_trip("3", "u3", date(6, 12), date(6, 14), &NATURE_CULTURE, Pacing::Normal),
        // No overlap
        create_trip("4", "u4", date(6, 20), date(6, 25), &NATURE_CULTURE, Pacing::Normal),
    ];

    let result = matcher.find_timeline_matches(
        &target,
        &create_profile("me"),
        &candidates,
        &profiles_for(&candidates),
    );

    let ids: Vec<&str> = result.iter().map(|m| m.candidate_trip.trip_id.as_str()).collect();
    assert!(!ids.contains(&"target"), "Trip matched against itself");
    assert!(!ids.contains(&"4"), "Non-overlapping trip was returned");
    assert!(ids.contains(&"1"));
    assert!(ids.contains(&"3"));

    for m in &result {
        assert!(m.timeline_overlap.overlap_days >= 1);
        assert!(m.overall_score() >= 0.6);
    }

    for i in 1..result.len() {
        assert!(
            result[i - 1].overall_score() >= result[i].overall_score(),
            "Matches not sorted by score"
        );
    }
}

#[::core::prelude::v1::test]
fn test_non_overlapping_trip_excluded_regardless_of_scores() {
    let matcher = PoolMatcher::new(MatchingConfig {
        min_compatibility_score: 0.0,
        ..MatchingConfig::default()
    });
    let target = create_trip("target", "me", date(6, 1), date(6, 10), &["Nature"], Pacing::Normal);

    // Identical in every respect except dates, still apart after flexibility
    let twin = create_trip("twin", "u1", date(6, 17), date(6, 26), &["Nature"], Pacing::Normal);

    let result = matcher.find_timeline_matches(
        &target,
        &create_profile("me"),
        &[twin.clone()],
        &profiles_for(&[twin]),
    );

    assert!(result.is_empty());
}

#[::core::prelude::v1::test]
fn test_flexibility_window_boundary() {
    let target = create_trip("target", "me", date(6, 1), date(6, 10), &["Nature"], Pacing::Normal);
    // Starts four days after the target ends: two days of flexibility on each side just bridge it
    let candidate = create_trip("c", "u1", date(6, 14), date(6, 16), &["Nature"], Pacing::Normal);
    let profiles = profiles_for(&[candidate.clone()]);

    let strict = PoolMatcher::new(MatchingConfig {
        flexibility_days: 1,
        ..MatchingConfig::default()
    });
    let flexible = PoolMatcher::new(MatchingConfig {
        flexibility_days: 2,
        ..MatchingConfig::default()
    });

    assert!(strict
        .find_timeline_matches(&target, &create_profile("me"), &[candidate.clone()], &profiles)
        .is_empty());

    let result =
        flexible.find_timeline_matches(&target, &create_profile("me"), &[candidate], &profiles);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].timeline_overlap.overlap_days, 1);
}

// HTTP surface, backed by in-memory trip and profile sources

struct StaticTrips(Vec<Trip>);

#[async_trait]
impl TripSource for StaticTrips {
    async fn fetch_trip(&self, trip_id: &str, _user_id: &str) -> Result<Option<Trip>, ClientError> {
        Ok(self.0.iter().find(|t| t.trip_id == trip_id).cloned())
    }

    async fn fetch_trips_for_user(&self, user_id: &str) -> Result<Vec<Trip>, ClientError> {
        Ok(self.0.iter().filter(|t| t.user_id == user_id).cloned().collect())
    }

    async fn fetch_trips_in_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Trip>, ClientError> {
        Ok(self
            .0
            .iter()
            .filter(|t| t.start_date <= end && t.end_date >= start)
            .cloned()
            .collect())
    }

    async fn fetch_trips_by_base_city(&self, base_city: &str) -> Result<Vec<Trip>, ClientError> {
        Ok(self.0.iter().filter(|t| t.base_city == base_city).cloned().collect())
    }
}

struct StaticProfiles(HashMap<String, TravelerProfile>);

#[async_trait]
impl ProfileSource for StaticProfiles {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<TravelerProfile>, ClientError> {
        Ok(self.0.get(user_id).cloned())
    }
}

fn app_state() -> AppState {
    let trips = vec![
        create_trip("trip-me", "me", date(6, 1), date(6, 10), &NATURE_CULTURE, Pacing::Normal),
        create_trip("trip-alex", "alex", date(6, 3), date(6, 12), &NATURE_CULTURE, Pacing::Normal),
    ];
    let profiles = profiles_for(&trips);

    AppState {
        pooling: Arc::new(PoolingService::new(
            Arc::new(StaticTrips(trips)),
            Arc::new(StaticProfiles(profiles)),
            Arc::new(InMemoryPoolRepository::new()),
            PoolMatcher::default(),
            PoolLimits::default(),
        )),
    }
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(
                    web::JsonConfig::default().error_handler(routes::handle_json_payload_error),
                )
                .app_data(
                    web::QueryConfig::default().error_handler(routes::handle_query_payload_error),
                )
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_endpoint() {
    let app = test_app!(app_state());

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_compatibility_endpoint() {
    let app = test_app!(app_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/pooling/compatibility")
        .set_json(json!({
            "trip1": {"tripId": "a", "userId": "u1",
                      "startDate": "2024-06-01", "endDate": "2024-06-10",
                      "baseCity": "Colombo", "categories": ["Nature"], "pacing": "RELAXED"},
            "trip2": {"tripId": "b", "userId": "u2",
                      "startDate": "2024-06-01", "endDate": "2024-06-10",
                      "baseCity": "Colombo", "categories": ["Nature"], "pacing": "ACTIVE"},
            "profile1": {"id": "u1", "nationality": "Sri Lankan", "languages": ["Sinhala"]},
            "profile2": {"id": "u2", "nationality": "Sri Lankan", "languages": ["Sinhala"]}
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["compatibility"]["pacingCompatibility"], 0.3);
    assert_eq!(body["routeCompatibility"], 0.3);
    assert_eq!(body["timelineOverlap"]["overlapDays"], 14);
}

#[actix_web::test]
async fn test_invalid_json_is_bad_request() {
    let app = test_app!(app_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/pooling/find-matches")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_validation_failure_is_bad_request() {
    let app = test_app!(app_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/pooling/find-matches")
        .set_json(json!({"userId": "me", "tripId": "trip-me", "minCompatibilityScore": 3.0}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_unknown_trip_is_not_found() {
    let app = test_app!(app_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/pooling/find-matches")
        .set_json(json!({"userId": "me", "tripId": "missing"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_pool_lifecycle_over_http() {
    let app = test_app!(app_state());

    // Suggestions before any pool exists
    let req = test::TestRequest::post()
        .uri("/api/v1/pooling/find-matches")
        .set_json(json!({"userId": "me", "tripId": "trip-me"}))
        .to_request();
    let suggestions: PoolSuggestionsResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(suggestions.total_results, 1);
    assert_eq!(suggestions.suggestions[0].candidate_user_id.as_deref(), Some("alex"));

    // Create
    let req = test::TestRequest::post()
        .uri("/api/v1/pooling/pools")
        .set_json(json!({"userId": "me", "tripId": "trip-me", "poolName": "Cultural triangle"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let pool: TripPool = test::read_body_json(resp).await;
    assert_eq!(pool.pool_name, "Cultural triangle");

    // Join
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/pooling/pools/{}/join", pool.pool_id))
        .set_json(json!({"userId": "alex", "tripId": "trip-alex"}))
        .to_request();
    let joined: TripPool = test::call_and_read_body_json(&app, req).await;
    assert_eq!(joined.current_members, 2);

    // Joining twice conflicts
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/pooling/pools/{}/join", pool.pool_id))
        .set_json(json!({"userId": "alex", "tripId": "trip-alex"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // List
    let req = test::TestRequest::get()
        .uri("/api/v1/pooling/pools?userId=alex")
        .to_request();
    let pools: Vec<TripPool> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(pools.len(), 1);

    // Leave
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/pooling/pools/{}/leave", pool.pool_id))
        .set_json(json!({"userId": "alex"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/pooling/pools/{}/leave", pool.pool_id))
        .set_json(json!({"userId": "alex"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Details after the last change
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/pooling/pools/{}", pool.pool_id))
        .to_request();
    let details: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(details["poolId"], pool.pool_id.as_str());
    assert_eq!(details["status"], "CANCELLED");
    assert_eq!(details["version"], 2);
}

#[actix_web::test]
async fn test_unknown_pool_is_not_found() {
    let app = test_app!(app_state());

    let req = test::TestRequest::get()
        .uri("/api/v1/pooling/pools/does-not-exist")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_pool_on_someone_elses_trip_is_rejected() {
    let app = test_app!(app_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/pooling/pools")
        .set_json(json!({"userId": "me", "tripId": "trip-alex"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_compatibility_at_calendar_edge() {
    let app = test_app!(app_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/pooling/compatibility")
        .set_json(json!({
            "trip1": {"tripId": "a", "userId": "u1",
                      "startDate": "2024-06-01", "endDate": "+262142-12-31",
                      "baseCity": "Colombo", "categories": [], "pacing": "NORMAL"},
            "trip2": {"tripId": "b", "userId": "u2",
                      "startDate": "2024-06-01", "endDate": "2024-06-10",
                      "baseCity": "Colombo", "categories": [], "pacing": "NORMAL"},
            "profile1": {"id": "u1", "nationality": "Sri Lankan", "languages": []},
            "profile2": {"id": "u2", "nationality": "Sri Lankan", "languages": []}
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["timelineOverlap"]["overlapDays"], 14);
}
