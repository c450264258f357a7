//! Application assembly
//!
//! Wires repositories and services into the per-aggregate routers and
//! merges them into one OpenAPI-documented API.

use std::sync::Arc;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;

use crate::admin::{admin_auth_router, AdminState};
use crate::analytics::{analytics_router, AnalyticsState};
use crate::announcement::{announcements_router, AnnouncementsState};
use crate::auth::{AuthService, PasswordService};
use crate::brand::{brands_router, BrandsState};
use crate::contact::{contact_router, ContactState};
use crate::donation::{donations_router, DonationsState};
use crate::event::{events_router, EventsState};
use crate::foundation::{foundations_router, FoundationLedger, FoundationsState};
use crate::gallery::{gallery_router, GalleryState};
use crate::giving_category::{giving_categories_router, GivingCategoriesState};
use crate::live_stream::{live_streams_router, LiveStreamsState};
use crate::member::{members_router, MembersState};
use crate::ministry::{ministries_router, MinistriesState};
use crate::payment::{payments_router, CheckoutProvider, PaymentService, PaymentsState};
use crate::prayer_request::{prayer_requests_router, PrayerRequestsState};
use crate::sermon::{sermons_router, SermonsState};
use crate::shared::middleware::{AuthLayer, AuthState};
use crate::store::{DocumentStore, Repository};
use crate::subscriber::{subscribers_router, SubscribersState};
use crate::testimonial::{testimonials_router, TestimonialsState};
use crate::volunteer::{volunteers_router, VolunteersState};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Steeple API",
        description = "Church content management, foundation giving and online payments"
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Administrator authentication"),
        (name = "members", description = "Member accounts"),
        (name = "brands", description = "Tenants"),
        (name = "events", description = "Events and registrations"),
        (name = "foundations", description = "Fundraising campaigns and donations"),
        (name = "payments", description = "Online giving via hosted checkout"),
        (name = "analytics", description = "Dashboard figures"),
    )
)]
pub struct ApiDoc;

/// Everything the API needs, shared across routers
#[derive(Clone)]
pub struct PlatformServices {
    pub store: Arc<dyn DocumentStore>,
    pub auth_service: Arc<AuthService>,
    pub password_service: Arc<PasswordService>,
    pub checkout: Arc<dyn CheckoutProvider>,
    /// Currency for online checkouts
    pub currency: String,
}

impl PlatformServices {
    fn repo<T: crate::store::Record>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }

    pub fn auth_state(&self) -> AuthState {
        AuthState {
            auth_service: self.auth_service.clone(),
            admins: self.repo(),
            members: self.repo(),
        }
    }

    pub fn ledger(&self) -> FoundationLedger {
        FoundationLedger::new(self.repo(), self.repo())
    }

    pub fn payments(&self) -> PaymentService {
        PaymentService::new(self.repo(), self.checkout.clone(), self.currency.clone())
    }

    /// All API routes with their OpenAPI paths
    pub fn openapi_router(&self) -> OpenApiRouter {
        OpenApiRouter::with_openapi(ApiDoc::openapi())
            .merge(admin_auth_router(AdminState {
                admins: self.repo(),
                auth_service: self.auth_service.clone(),
                password_service: self.password_service.clone(),
            }))
            .merge(members_router(MembersState {
                members: self.repo(),
                auth_service: self.auth_service.clone(),
                password_service: self.password_service.clone(),
            }))
            .merge(brands_router(BrandsState { brands: self.repo() }))
            .merge(events_router(EventsState {
                events: self.repo(),
                attendees: self.repo(),
            }))
            .merge(ministries_router(MinistriesState { ministries: self.repo() }))
            .merge(announcements_router(AnnouncementsState { announcements: self.repo() }))
            .merge(volunteers_router(VolunteersState { applications: self.repo() }))
            .merge(subscribers_router(SubscribersState { subscribers: self.repo() }))
            .merge(contact_router(ContactState { messages: self.repo() }))
            .merge(sermons_router(SermonsState { sermons: self.repo() }))
            .merge(testimonials_router(TestimonialsState { testimonials: self.repo() }))
            .merge(prayer_requests_router(PrayerRequestsState { prayers: self.repo() }))
            .merge(donations_router(DonationsState { donations: self.repo() }))
            .merge(gallery_router(GalleryState { images: self.repo() }))
            .merge(live_streams_router(LiveStreamsState { streams: self.repo() }))
            .merge(giving_categories_router(GivingCategoriesState { categories: self.repo() }))
            .merge(foundations_router(FoundationsState { ledger: self.ledger() }))
            .merge(payments_router(PaymentsState { payments: self.payments() }))
            .merge(analytics_router(AnalyticsState::new(self.store.clone())))
    }

    /// Authenticated API router plus its OpenAPI document
    pub fn api(&self) -> (axum::Router, utoipa::openapi::OpenApi) {
        let (router, openapi) = self.openapi_router().split_for_parts();
        (router.layer(AuthLayer::new(self.auth_state())), openapi)
    }
}
