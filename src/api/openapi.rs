//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, loans, media, members, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Médiathèque API",
        version = "1.0.0",
        description = "Media Lending Tracker REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Members
        members::list_members,
        members::get_member,
        members::create_member,
        members::update_member,
        members::delete_member,
        // Media
        media::list_media,
        media::get_media,
        media::create_media,
        media::update_media,
        media::delete_media,
        // Loans
        loans::get_member_loans,
        loans::get_media_loan,
        loans::get_loan,
        loans::create_loan,
        loans::return_loan,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Members
            crate::models::member::Member,
            crate::models::member::MemberShort,
            crate::models::member::MemberQuery,
            crate::models::member::CreateMember,
            crate::models::member::UpdateMember,
            // Media
            crate::models::media::Media,
            crate::models::media::MediaCategory,
            crate::models::media::CategoryDetails,
            crate::models::media::MediaQuery,
            crate::models::media::CreateMedia,
            crate::models::media::UpdateMedia,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanMedia,
            crate::models::loan::LoanMember,
            crate::models::loan::CreateLoan,
            crate::models::loan::ReturnLoan,
            loans::LoanResponse,
            loans::ReturnResponse,
            // Stats
            stats::StatsResponse,
            stats::MemberStats,
            stats::MediaStats,
            stats::LoanStats,
            stats::StatEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "members", description = "Member directory"),
        (name = "media", description = "Media directory"),
        (name = "loans", description = "Loan lifecycle"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
