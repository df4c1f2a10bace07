//! Order lifecycle decision table.
//!
//! Pure: no I/O, no clock. Services call the business guard first
//! (`can_confirm` / `can_complete` / `can_cancel`), then
//! [`assert_transition`] against the table. The guard encodes business
//! rules such as payment completeness; the table encodes raw state
//! legality. Both must hold before a status write.

use rust_decimal::Decimal;

use crate::entities::order::{OrderStatus, PaymentStatus};
use crate::errors::ServiceError;

/// Legal targets from a given status. `Completed` and `Cancelled` are
/// absorbing and return the empty slice.
pub fn allowed_transitions(from: OrderStatus) -> &'static [OrderStatus] {
    match from {
        OrderStatus::Draft => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
        OrderStatus::Confirmed => &[OrderStatus::Completed, OrderStatus::Cancelled],
        OrderStatus::Completed | OrderStatus::Cancelled => &[],
    }
}

pub fn is_terminal(status: OrderStatus) -> bool {
    allowed_transitions(status).is_empty()
}

/// Re-validates a transition against the table, independent of any guard
/// the caller already ran.
pub fn assert_transition(from: OrderStatus, to: OrderStatus) -> Result<(), ServiceError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "cannot transition order from '{}' to '{}'",
            from, to
        )))
    }
}

/// An order may be confirmed only while in draft and only if it has items.
pub fn can_confirm(status: OrderStatus, item_count: usize) -> Result<(), ServiceError> {
    if status != OrderStatus::Draft {
        return Err(ServiceError::InvalidState(format!(
            "order must be draft to confirm, current status is '{}'",
            status
        )));
    }
    if item_count == 0 {
        return Err(ServiceError::InvalidState(
            "cannot confirm an order with no items".into(),
        ));
    }
    Ok(())
}

/// A confirmed order may be completed once fully paid; zero-total orders
/// need no payment.
pub fn can_complete(
    status: OrderStatus,
    payment_status: PaymentStatus,
    total_amount: Decimal,
) -> Result<(), ServiceError> {
    if status != OrderStatus::Confirmed {
        return Err(ServiceError::InvalidState(format!(
            "order must be confirmed to complete, current status is '{}'",
            status
        )));
    }
    if total_amount > Decimal::ZERO && payment_status != PaymentStatus::Paid {
        return Err(ServiceError::InvalidState(format!(
            "cannot complete an unpaid order (payment status is '{}')",
            payment_status
        )));
    }
    Ok(())
}

/// Any non-terminal order may be cancelled.
pub fn can_cancel(status: OrderStatus) -> Result<(), ServiceError> {
    if is_terminal(status) {
        return Err(ServiceError::InvalidState(format!(
            "cannot cancel an order that is already '{}'",
            status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    use OrderStatus::*;

    #[test_case(Draft, Confirmed => true)]
    #[test_case(Draft, Cancelled => true)]
    #[test_case(Draft, Completed => false)]
    #[test_case(Draft, Draft => false)]
    #[test_case(Confirmed, Completed => true)]
    #[test_case(Confirmed, Cancelled => true)]
    #[test_case(Confirmed, Draft => false)]
    #[test_case(Confirmed, Confirmed => false)]
    #[test_case(Completed, Draft => false)]
    #[test_case(Completed, Confirmed => false)]
    #[test_case(Completed, Cancelled => false)]
    #[test_case(Completed, Completed => false)]
    #[test_case(Cancelled, Draft => false)]
    #[test_case(Cancelled, Confirmed => false)]
    #[test_case(Cancelled, Completed => false)]
    #[test_case(Cancelled, Cancelled => false)]
    fn transition_table(from: OrderStatus, to: OrderStatus) -> bool {
        assert_transition(from, to).is_ok()
    }

    #[test]
    fn illegal_transition_names_both_states() {
        let err = assert_transition(Completed, Cancelled).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("completed") && msg.contains("cancelled"));
    }

    #[test]
    fn confirm_requires_draft_and_items() {
        assert!(can_confirm(Draft, 2).is_ok());
        assert_matches!(can_confirm(Draft, 0), Err(ServiceError::InvalidState(_)));
        assert_matches!(can_confirm(Confirmed, 2), Err(ServiceError::InvalidState(_)));
    }

    #[test]
    fn complete_requires_full_payment_unless_free() {
        assert!(can_complete(Confirmed, PaymentStatus::Paid, dec!(1000)).is_ok());
        assert!(can_complete(Confirmed, PaymentStatus::Unpaid, Decimal::ZERO).is_ok());
        assert_matches!(
            can_complete(Confirmed, PaymentStatus::Partial, dec!(1000)),
            Err(ServiceError::InvalidState(_))
        );
        assert_matches!(
            can_complete(Draft, PaymentStatus::Paid, dec!(1000)),
            Err(ServiceError::InvalidState(_))
        );
    }

    #[test]
    fn cancel_allowed_from_any_non_terminal_state() {
        assert!(can_cancel(Draft).is_ok());
        assert!(can_cancel(Confirmed).is_ok());
        assert_matches!(can_cancel(Completed), Err(ServiceError::InvalidState(_)));
        assert_matches!(can_cancel(Cancelled), Err(ServiceError::InvalidState(_)));
    }
}
