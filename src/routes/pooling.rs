use actix_web::{web, HttpResponse};
use std::sync::Arc;
use validator::Validate;

use crate::core::{
    calculate_compatibility, calculate_route_compatibility, calculate_timeline_overlap,
    PoolMatcher,
};
use crate::error::PoolingError;
use crate::models::{
    CompatibilityRequest, CompatibilityResponse, CreatePoolRequest, FindTimelineMatchesRequest,
    FindTimelineMatchesResponse, HealthResponse, JoinPoolRequest, LeavePoolRequest,
    LeavePoolResponse, PoolSuggestionsResponse, PoolingRequest, UserPoolsQuery,
};
use crate::services::PoolingService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pooling: Arc<PoolingService>,
}

/// Configure all pooling routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/pooling/matches", web::post().to(find_timeline_matches))
        .route("/pooling/compatibility", web::post().to(check_compatibility))
        .route("/pooling/find-matches", web::post().to(find_potential_pools))
        .route("/pooling/pools", web::post().to(create_pool))
        .route("/pooling/pools", web::get().to(user_pools))
        .route("/pooling/pools/{pool_id}", web::get().to(get_pool))
        .route("/pooling/pools/{pool_id}/join", web::post().to(join_pool))
        .route("/pooling/pools/{pool_id}/leave", web::post().to(leave_pool));
}

fn validate<T: Validate>(request: &T) -> Result<(), PoolingError> {
    request.validate().map_err(|errors| {
        tracing::info!("Validation failed: {}", errors);
        PoolingError::InvalidRequest(errors.to_string())
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let storage_healthy = state.pooling.storage_healthy().await;

    let status = if storage_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Rank inline candidate trips against a target trip
///
/// POST /api/v1/pooling/matches
///
/// Request body:
/// ```json
/// {
///   "targetTrip": { "tripId": "t1", "userId": "u1", ... },
///   "targetProfile": { "id": "u1", "nationality": "Sri Lankan", ... },
///   "candidateTrips": [ ... ],
///   "candidateProfiles": { "u2": { ... } },
///   "flexibilityDays": 2,
///   "minCompatibilityScore": 0.6,
///   "maxDistanceKm": 50.0
/// }
/// ```
async fn find_timeline_matches(
    state: web::Data<AppState>,
    req: web::Json<FindTimelineMatchesRequest>,
) -> Result<HttpResponse, PoolingError> {
    validate(&*req)?;

    let config = state.pooling.matcher().config().with_overrides(
        req.flexibility_days,
        req.min_compatibility_score,
        req.max_distance_km,
    );

    let matches = PoolMatcher::new(config).find_timeline_matches(
        &req.target_trip,
        &req.target_profile,
        &req.candidate_trips,
        &req.candidate_profiles,
    );

    Ok(HttpResponse::Ok().json(FindTimelineMatchesResponse {
        matches,
        total_candidates: req.candidate_trips.len(),
    }))
}

/// Score a single pair of trips
///
/// POST /api/v1/pooling/compatibility
async fn check_compatibility(
    state: web::Data<AppState>,
    req: web::Json<CompatibilityRequest>,
) -> Result<HttpResponse, PoolingError> {
    validate(&*req)?;

    let config = state.pooling.matcher().config().with_overrides(
        req.flexibility_days,
        None,
        req.max_distance_km,
    );

    let compatibility = calculate_compatibility(
        &req.trip1,
        &req.trip2,
        &req.profile1,
        &req.profile2,
        config.flexibility_days,
    );

    Ok(HttpResponse::Ok().json(CompatibilityResponse {
        compatibility,
        timeline_overlap: calculate_timeline_overlap(
            &req.trip1,
            &req.trip2,
            config.flexibility_days,
        ),
        route_compatibility: calculate_route_compatibility(
            &req.trip1,
            &req.trip2,
            config.max_distance_km,
        ),
    }))
}

/// Suggest companions and joinable pools for a stored trip
///
/// POST /api/v1/pooling/find-matches
///
/// Request body:
/// ```json
/// {
///   "userId": "traveler@example.com",
///   "tripId": "string",
///   "dateFlexibilityDays": 3
/// }
/// ```
async fn find_potential_pools(
    state: web::Data<AppState>,
    req: web::Json<PoolingRequest>,
) -> Result<HttpResponse, PoolingError> {
    validate(&*req)?;

    tracing::info!("Finding pools for user {} trip {}", req.user_id, req.trip_id);

    let suggestions = state.pooling.find_potential_pools(&req).await?;

    Ok(HttpResponse::Ok().json(PoolSuggestionsResponse {
        total_results: suggestions.len(),
        suggestions,
    }))
}

/// POST /api/v1/pooling/pools
async fn create_pool(
    state: web::Data<AppState>,
    req: web::Json<CreatePoolRequest>,
) -> Result<HttpResponse, PoolingError> {
    validate(&*req)?;

    let pool = state.pooling.create_pool(&req).await?;
    Ok(HttpResponse::Created().json(pool))
}

/// GET /api/v1/pooling/pools/{pool_id}
async fn get_pool(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, PoolingError> {
    let pool = state.pooling.get_pool(&path).await?;
    Ok(HttpResponse::Ok().json(pool))
}

/// POST /api/v1/pooling/pools/{pool_id}/join
async fn join_pool(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<JoinPoolRequest>,
) -> Result<HttpResponse, PoolingError> {
    validate(&*req)?;

    let pool = state.pooling.join_pool(&path, &req).await?;
    Ok(HttpResponse::Ok().json(pool))
}

/// POST /api/v1/pooling/pools/{pool_id}/leave
async fn leave_pool(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<LeavePoolRequest>,
) -> Result<HttpResponse, PoolingError> {
    validate(&*req)?;

    let pool = state.pooling.leave_pool(&path, &req.user_id).await?;
    Ok(HttpResponse::Ok().json(LeavePoolResponse {
        success: true,
        pool_id: pool.pool_id,
    }))
}

/// GET /api/v1/pooling/pools?userId=...
async fn user_pools(
    state: web::Data<AppState>,
    query: web::Query<UserPoolsQuery>,
) -> Result<HttpResponse, PoolingError> {
    validate(&*query)?;

    let pools = state.pooling.user_pools(&query.user_id).await?;
    Ok(HttpResponse::Ok().json(pools))
}
