use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull, DisplayFromStr, PickFirst};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use super::AccountAddress;

pub type PolicyId = u64;

/// Insurance policy as returned by the insurance module's view functions.
///
/// Scalar fields the node did not send stay `None`; they are never
/// defaulted, so callers can tell "zero" from "unknown".
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Policy {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub id: PolicyId,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub policy_id: Option<PolicyId>,
    pub creator: Option<AccountAddress>,
    pub description: Option<String>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub premium_amount: Option<u64>,
    pub yearly: Option<bool>,
    pub type_of_policy: Option<String>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub claimable_amount: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub max_claimable: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub total_premium_collected: Option<u64>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub customers: Vec<CustomerClaim>,
}

impl Policy {
    pub fn customer(&self, address: &AccountAddress) -> Option<&CustomerClaim> {
        self.customers.iter().find(|c| &c.customer == address)
    }

    /// Customers waiting for the creator to verify their claim.
    pub fn pending_verifications(&self) -> impl Iterator<Item = &CustomerClaim> {
        self.customers
            .iter()
            .filter(|c| c.requested() && !c.verified())
    }
}

/// Per-customer claim state. The flags are set independently by the
/// contract, so any combination can be observed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CustomerClaim {
    pub customer: AccountAddress,
    pub is_requested: Option<bool>,
    pub is_verified: Option<bool>,
    pub is_claimed: Option<bool>,
    pub premium_paid: Option<bool>,
}

impl CustomerClaim {
    pub fn requested(&self) -> bool {
        self.is_requested == Some(true)
    }
    pub fn verified(&self) -> bool {
        self.is_verified == Some(true)
    }
    pub fn claimed(&self) -> bool {
        self.is_claimed == Some(true)
    }
    pub fn paid(&self) -> bool {
        self.premium_paid == Some(true)
    }
}

/// Policy categories offered when creating a policy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum PolicyType {
    #[strum(serialize = "Car_Insurance")]
    Car,
    #[strum(serialize = "Bike_Insurance")]
    Bike,
    #[strum(serialize = "Home_Insurance")]
    Home,
    #[strum(serialize = "Life_Insurance")]
    Life,
    #[strum(serialize = "Term_Insurance")]
    Term,
    #[strum(serialize = "Other_Insurance")]
    Other,
}
