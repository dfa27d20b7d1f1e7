//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan, LoanDetails, ReturnLoan},
};

/// Loan response with computed dates
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    /// Loan ID
    pub id: i32,
    /// Loan start date
    pub loan_date: NaiveDate,
    /// Expected return date (loan date + lending window)
    pub expected_return_date: NaiveDate,
    /// Status message
    pub message: String,
}

/// Return response with loan details
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    /// Loan details
    pub loan: LoanDetails,
}

/// Get open loans for a specific member (step one of the return flow)
#[utoipa::path(
    get,
    path = "/members/{id}/loans",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member's open loans", body = Vec<LoanDetails>),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member_loans(
    State(state): State<crate::AppState>,
    Path(member_id): Path<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.member_loans(member_id).await?;
    Ok(Json(loans))
}

/// Get the open loan holding a media item, if any
#[utoipa::path(
    get,
    path = "/media/{id}/loan",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "The open loan, or null", body = Option<LoanDetails>),
        (status = 404, description = "Media not found")
    )
)]
pub async fn get_media_loan(
    State(state): State<crate::AppState>,
    Path(media_id): Path<i32>,
) -> AppResult<Json<Option<LoanDetails>>> {
    let loan = state.services.loans.media_loan(media_id).await?;
    Ok(Json(loan))
}

/// Get a loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.get_loan(loan_id).await?;
    Ok(Json(loan))
}

/// Open a new loan (borrow a media item)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan opened", body = LoanResponse),
        (status = 400, description = "Loan date in the future"),
        (status = 404, description = "Member or media not found"),
        (status = 409, description = "Media unavailable, borrowing limit reached or overdue loans")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    let loan = state.services.loans.open_loan(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            id: loan.id,
            loan_date: loan.loan_date,
            expected_return_date: loan.expected_return_date,
            message: "Media borrowed successfully".to_string(),
        }),
    ))
}

/// Return a borrowed media item (step two of the return flow)
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body = ReturnLoan,
    responses(
        (status = 200, description = "Media returned", body = ReturnResponse),
        (status = 400, description = "Return date precedes loan date"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
    Json(request): Json<ReturnLoan>,
) -> AppResult<Json<ReturnResponse>> {
    let loan = state
        .services
        .loans
        .close_loan(loan_id, request.effective_return_date)
        .await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        loan,
    }))
}
