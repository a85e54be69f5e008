//! Refund request contract handed to the policy engine by the order system.

use chrono::{DateTime, Utc};
use refund_primitives::{Amount, Error, OrderId, RefundId, Result};
use serde::Serialize;

use crate::policy::{OrderState, RefundType};

/// Refund raised against an order. Immutable once built.
///
/// Only constructed through [`RefundRequest::builder`], which enforces a
/// positive amount and a named customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundRequest {
    id: RefundId,
    order_id: OrderId,
    amount: Amount,
    refund_type: RefundType,
    order_state: OrderState,
    customer: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    items: Vec<String>,
    requested_at: DateTime<Utc>,
}

impl RefundRequest {
    /// Starts building a request. The refund type defaults to
    /// [`RefundType::Full`] and the order state to [`OrderState::Placed`].
    #[must_use]
    pub fn builder(
        id: RefundId,
        order_id: OrderId,
        requested_at: DateTime<Utc>,
    ) -> RefundRequestBuilder {
        RefundRequestBuilder {
            id,
            order_id,
            requested_at,
            amount: None,
            refund_type: RefundType::Full,
            order_state: OrderState::Placed,
            customer: None,
            items: Vec::new(),
        }
    }

    /// Returns the refund identifier.
    #[must_use]
    pub fn id(&self) -> &RefundId {
        &self.id
    }

    /// Returns the order the refund belongs to.
    #[must_use]
    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Returns the requested amount; always positive.
    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    /// Returns whether the refund is full or partial.
    #[must_use]
    pub const fn refund_type(&self) -> RefundType {
        self.refund_type
    }

    /// Returns the order state at request time.
    #[must_use]
    pub const fn order_state(&self) -> OrderState {
        self.order_state
    }

    /// Returns the customer display name.
    #[must_use]
    pub fn customer(&self) -> &str {
        &self.customer
    }

    /// Returns the refunded line descriptions in order.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Returns when the refund was requested.
    #[must_use]
    pub const fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }
}

/// Builder used to assemble [`RefundRequest`] values safely.
#[derive(Debug)]
pub struct RefundRequestBuilder {
    id: RefundId,
    order_id: OrderId,
    requested_at: DateTime<Utc>,
    amount: Option<Amount>,
    refund_type: RefundType,
    order_state: OrderState,
    customer: Option<String>,
    items: Vec<String>,
}

impl RefundRequestBuilder {
    /// Sets the refund amount.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAmount`] when `amount` is zero.
    pub fn amount(mut self, amount: u64) -> Result<Self> {
        self.amount = Some(Amount::positive(amount)?);
        Ok(self)
    }

    /// Sets the refund type.
    #[must_use]
    pub fn refund_type(mut self, refund_type: RefundType) -> Self {
        self.refund_type = refund_type;
        self
    }

    /// Sets the order state observed when the refund was raised.
    #[must_use]
    pub fn order_state(mut self, order_state: OrderState) -> Self {
        self.order_state = order_state;
        self
    }

    /// Sets the customer display name.
    #[must_use]
    pub fn customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    /// Appends a refunded line description.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when the description is blank.
    pub fn item(mut self, item: impl Into<String>) -> Result<Self> {
        let item = item.into();
        if item.trim().is_empty() {
            return Err(Error::InvalidRequest {
                reason: "item descriptions must not be empty",
            });
        }
        self.items.push(item);
        Ok(self)
    }

    /// Appends several line descriptions, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if any description is blank.
    pub fn items<I, S>(mut self, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in items {
            self = self.item(item)?;
        }
        Ok(self)
    }

    /// Finalises the builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when the amount or customer is missing
    /// or the customer name is blank.
    pub fn build(self) -> Result<RefundRequest> {
        let amount = self.amount.ok_or(Error::InvalidRequest {
            reason: "refund amount is required",
        })?;
        let customer = self
            .customer
            .filter(|name| !name.trim().is_empty())
            .ok_or(Error::InvalidRequest {
                reason: "customer name is required",
            })?;

        Ok(RefundRequest {
            id: self.id,
            order_id: self.order_id,
            amount,
            refund_type: self.refund_type,
            order_state: self.order_state,
            customer,
            items: self.items,
            requested_at: self.requested_at,
        })
    }
}
