use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull, DisplayFromStr, PickFirst};

use super::AccountAddress;

pub type RentalId = u64;

/// Rental agreement between a landlord and a tenant.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RentalAgreement {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub rental_id: RentalId,
    pub landlord: Option<AccountAddress>,
    pub tenant: Option<AccountAddress>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub rent_amount: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub security_deposit: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub duration_months: Option<u64>,
    pub agreement_type: Option<String>,
    pub description: Option<String>,
    pub deposit_paid: Option<bool>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub deduction_amount: Option<u64>,
    pub damage_description: Option<String>,
    pub deductions_approved: Option<bool>,
    pub deposit_refunded: Option<bool>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub payments: Vec<RentPayment>,
}

impl RentalAgreement {
    /// Sum of all rent payments recorded so far, in chain units.
    pub fn total_paid(&self) -> u64 {
        self.payments
            .iter()
            .filter_map(|p| p.amount)
            .fold(0u64, |acc, a| acc.saturating_add(a))
    }

    /// Months of the agreement not yet covered by a payment.
    pub fn remaining_months(&self) -> Option<u64> {
        self.duration_months
            .map(|months| months.saturating_sub(self.payments.len() as u64))
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RentPayment {
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub amount: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub timestamp: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub period: Option<u64>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_rental_with_payments() {
        let rental: RentalAgreement = serde_json::from_value(json!({
            "rental_id": "12",
            "landlord": "0xa11ce",
            "tenant": "0xb0b",
            "rent_amount": "10000000000",
            "security_deposit": "50000000000",
            "duration_months": "12",
            "agreement_type": "Residential",
            "description": "None",
            "payments": [
                { "amount": "10000000000", "timestamp": "1717171717", "period": "1" },
                { "amount": "10000000000", "timestamp": "1719763717", "period": "2" }
            ]
        }))
        .unwrap();

        assert_eq!(rental.rental_id, 12);
        assert_eq!(rental.total_paid(), 20_000_000_000);
        assert_eq!(rental.remaining_months(), Some(10));
        assert_eq!(rental.deposit_paid, None);
    }

    #[test]
    fn payment_with_missing_amount_is_skipped_in_total() {
        let rental: RentalAgreement = serde_json::from_value(json!({
            "rental_id": 1,
            "payments": [{ "timestamp": "5" }, { "amount": 7 }]
        }))
        .unwrap();
        assert_eq!(rental.total_paid(), 7);
        assert_eq!(rental.remaining_months(), None);
    }

    #[test]
    fn null_payments_are_no_payments() {
        let rental: RentalAgreement =
            serde_json::from_value(json!({ "rental_id": 2, "payments": null })).unwrap();
        assert!(rental.payments.is_empty());
        assert_eq!(rental.total_paid(), 0);
    }
}
