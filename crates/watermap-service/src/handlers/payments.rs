//! Payment handlers: the loyalty ledger surface.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use watermap_core::{settle_purchase, Payment, PaymentMethod, PointId, UserId};
use watermap_store::{PaymentOrder, Store};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Payment request.
///
/// `bonus_earned` is not part of the schema: accrual is always computed
/// server-side, and any such field in the body is ignored.
#[derive(Debug, Deserialize)]
pub struct PayRequest {
    /// The paying user.
    pub user_id: UserId,
    /// Where the water is purchased.
    pub water_point_id: PointId,
    /// Purchased volume in liters. Must be positive.
    pub volume: f64,
    /// Paid amount. Must be positive.
    pub amount: f64,
    /// One of the accepted method labels (`bonus`, `card`).
    pub payment_method: String,
    /// Bonus liters to redeem alongside a non-bonus method.
    #[serde(default)]
    pub bonus_used: f64,
}

/// Record a payment: validate, settle, and apply atomically.
///
/// Non-admin callers may only pay for their own user id.
pub async fn pay(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<PayRequest>,
) -> Result<Json<Payment>, ApiError> {
    if !auth.is_admin && auth.user_id != body.user_id {
        return Err(ApiError::Forbidden);
    }

    let method: PaymentMethod = body.payment_method.parse().map_err(ApiError::from)?;
    let settlement = settle_purchase(method, body.volume, body.amount, body.bonus_used)?;

    let payment = state
        .store
        .record_payment(&PaymentOrder {
            user_id: body.user_id,
            water_point_id: body.water_point_id,
            volume: body.volume,
            amount: body.amount,
            method,
            debit: settlement.debit,
            bonus_earned: settlement.bonus_earned,
        })
        .await?;

    tracing::info!(
        payment_id = %payment.id,
        user_id = %payment.user_id,
        water_point_id = %payment.water_point_id,
        volume = %payment.volume,
        method = %payment.payment_method,
        bonus_used = %payment.bonus_used,
        bonus_earned = %payment.bonus_earned,
        "Payment recorded"
    );

    Ok(Json(payment))
}

/// A user's payment history, oldest first.
pub async fn list_user_payments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    if state.store.get_user(id).await?.is_none() {
        return Err(ApiError::NotFound(format!("user not found: {id}")));
    }

    let payments = state.store.list_payments_by_user(id).await?;
    Ok(Json(payments))
}
