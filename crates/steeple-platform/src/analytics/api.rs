//! Analytics API
//!
//! Read-only dashboard figures counted across the content registry.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::announcement::Announcement;
use crate::contact::ContactMessage;
use crate::event::Event;
use crate::ministry::Ministry;
use crate::prayer_request::{PrayerRequest, PrayerRequestResponse};
use crate::sermon::Sermon;
use crate::shared::api_common::BrandQuery;
use crate::shared::error::Result;
use crate::shared::middleware::AdminAuth;
use crate::store::{DocumentStore, Filter, FindOptions, Record, Repository};
use crate::subscriber::Subscriber;
use crate::testimonial::Testimonial;
use crate::volunteer::{VolunteerApplication, VolunteerApplicationResponse};

/// Entries per recent-activity list
const RECENT_ACTIVITY_LIMIT: i64 = 5;

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct AnalyticsTotals {
    pub events: u64,
    pub ministries: u64,
    pub announcements: u64,
    pub volunteers: u64,
    pub subscribers: u64,
    pub prayers: u64,
    pub testimonials: u64,
    pub sermons: u64,
    pub contacts: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentActivity {
    pub volunteers: Vec<VolunteerApplicationResponse>,
    pub prayers: Vec<PrayerRequestResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsOverviewResponse {
    pub totals: AnalyticsTotals,
    pub recent_activity: RecentActivity,
}

#[derive(Clone)]
pub struct AnalyticsState {
    store: Arc<dyn DocumentStore>,
}

impl AnalyticsState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn count<T: Record>(&self, brand: Option<&str>) -> Result<u64> {
        self.store
            .count(T::collection_name(), Filter::new().brand(brand).into_document())
            .await
    }

    async fn newest<T: Record>(&self, brand: Option<&str>) -> Result<Vec<T>> {
        Repository::<T>::new(self.store.clone())
            .find(Filter::new().brand(brand), FindOptions::newest_first(RECENT_ACTIVITY_LIMIT))
            .await
    }

    async fn totals(&self, brand: Option<&str>) -> Result<AnalyticsTotals> {
        let (events, ministries, announcements, volunteers, subscribers) = futures::try_join!(
            self.count::<Event>(brand),
            self.count::<Ministry>(brand),
            self.count::<Announcement>(brand),
            self.count::<VolunteerApplication>(brand),
            self.count::<Subscriber>(brand),
        )?;
        let (prayers, testimonials, sermons, contacts) = futures::try_join!(
            self.count::<PrayerRequest>(brand),
            self.count::<Testimonial>(brand),
            self.count::<Sermon>(brand),
            self.count::<ContactMessage>(brand),
        )?;

        Ok(AnalyticsTotals {
            events,
            ministries,
            announcements,
            volunteers,
            subscribers,
            prayers,
            testimonials,
            sermons,
            contacts,
        })
    }

    async fn recent_activity(&self, brand: Option<&str>) -> Result<RecentActivity> {
        let (volunteers, prayers) = futures::try_join!(
            self.newest::<VolunteerApplication>(brand),
            self.newest::<PrayerRequest>(brand),
        )?;

        Ok(RecentActivity {
            volunteers: volunteers.into_iter().map(Into::into).collect(),
            prayers: prayers.into_iter().map(Into::into).collect(),
        })
    }
}

/// Dashboard overview
#[utoipa::path(
    get,
    path = "/api/analytics/overview",
    tag = "analytics",
    params(BrandQuery),
    responses((status = 200, description = "Totals and recent activity", body = AnalyticsOverviewResponse)),
    security(("bearer_auth" = []))
)]
pub async fn get_overview(
    State(state): State<AnalyticsState>,
    _admin: AdminAuth,
    Query(query): Query<BrandQuery>,
) -> Result<Json<AnalyticsOverviewResponse>> {
    let brand = query.brand();
    let (totals, recent_activity) =
        futures::try_join!(state.totals(brand), state.recent_activity(brand))?;

    Ok(Json(AnalyticsOverviewResponse { totals, recent_activity }))
}

pub fn analytics_router(state: AnalyticsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_overview))
        .with_state(state)
}
