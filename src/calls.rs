//! Builders for every mutating entry function of the insurance and rental
//! modules.
//!
//! Arguments are pushed in the exact order the Move functions declare
//! them, and amounts go through the [`AmountCodec`] so that nothing but
//! scaled integers reaches the wire.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, IntoStaticStr};

use crate::{
    amount::{AmountCodec, AmountError},
    model::{AccountAddress, PolicyId, RentalId},
    payload::{EntryFunctionId, EntryFunctionPayload, MoveArg},
};

/// Sent in place of an empty free-text argument; the entry functions
/// have a fixed arity.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "None";

pub const INSURANCE_MODULE: &str = "MicroInsuranceSystem";
pub const RENTAL_MODULE: &str = "RentalAgreementSystem";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Insurance,
    Rental,
}

/// Where the contract modules are published.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContractModules {
    pub address: AccountAddress,
    pub insurance: String,
    pub rental: String,
}

impl ContractModules {
    pub fn new(address: AccountAddress) -> Self {
        ContractModules {
            address,
            insurance: INSURANCE_MODULE.to_string(),
            rental: RENTAL_MODULE.to_string(),
        }
    }

    pub fn function_id(&self, kind: ModuleKind, name: &str) -> EntryFunctionId {
        let module = match kind {
            ModuleKind::Insurance => &self.insurance,
            ModuleKind::Rental => &self.rental,
        };
        EntryFunctionId {
            address: self.address.clone(),
            module: module.clone(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum EntryFunction {
    CreatePolicy,
    PurchasePolicy,
    RequestClaim,
    VerifyClaim,
    PayoutClaim,
    CreateRentalAgreement,
    PayRent,
    MakeSecurityDeposit,
    ProposeDeductions,
    ApproveDeductions,
    RefundSecurityDeposit,
}

impl EntryFunction {
    pub fn module(&self) -> ModuleKind {
        match self {
            EntryFunction::CreatePolicy
            | EntryFunction::PurchasePolicy
            | EntryFunction::RequestClaim
            | EntryFunction::VerifyClaim
            | EntryFunction::PayoutClaim => ModuleKind::Insurance,
            EntryFunction::CreateRentalAgreement
            | EntryFunction::PayRent
            | EntryFunction::MakeSecurityDeposit
            | EntryFunction::ProposeDeductions
            | EntryFunction::ApproveDeductions
            | EntryFunction::RefundSecurityDeposit => ModuleKind::Rental,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewPolicy {
    pub description: String,
    pub premium: f64,
    pub yearly: bool,
    pub max_claimable: f64,
    pub type_of_policy: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewRentalAgreement {
    pub tenant: AccountAddress,
    pub rent: f64,
    pub deposit: f64,
    pub months: u64,
    pub agreement_type: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Deduction {
    pub rental_id: RentalId,
    pub amount: f64,
    pub damage_description: String,
}

fn text_or_placeholder(text: &str) -> MoveArg {
    if text.is_empty() {
        MoveArg::from(EMPTY_TEXT_PLACEHOLDER)
    } else {
        MoveArg::from(text)
    }
}

#[derive(Debug, Clone)]
pub struct CallBuilder {
    pub modules: ContractModules,
    pub codec: AmountCodec,
}

impl CallBuilder {
    pub fn new(modules: ContractModules, codec: AmountCodec) -> Self {
        CallBuilder { modules, codec }
    }

    pub fn entry(&self, function: EntryFunction, arguments: Vec<MoveArg>) -> EntryFunctionPayload {
        EntryFunctionPayload::new(
            self.modules
                .function_id(function.module(), function.as_ref()),
            arguments,
        )
    }

    pub fn create_policy(&self, input: &NewPolicy) -> Result<EntryFunctionPayload, AmountError> {
        Ok(self.entry(
            EntryFunction::CreatePolicy,
            vec![
                text_or_placeholder(&input.description),
                self.codec.to_chain(input.premium)?.into(),
                input.yearly.into(),
                self.codec.to_chain(input.max_claimable)?.into(),
                input.type_of_policy.as_str().into(),
            ],
        ))
    }

    pub fn purchase_policy(&self, policy_id: PolicyId) -> EntryFunctionPayload {
        self.entry(EntryFunction::PurchasePolicy, vec![policy_id.into()])
    }

    pub fn request_claim(&self, policy_id: PolicyId) -> EntryFunctionPayload {
        self.entry(EntryFunction::RequestClaim, vec![policy_id.into()])
    }

    pub fn verify_claim(
        &self,
        policy_id: PolicyId,
        customer: &AccountAddress,
    ) -> EntryFunctionPayload {
        self.entry(
            EntryFunction::VerifyClaim,
            vec![policy_id.into(), customer.into()],
        )
    }

    pub fn payout_claim(&self, policy_id: PolicyId) -> EntryFunctionPayload {
        self.entry(EntryFunction::PayoutClaim, vec![policy_id.into()])
    }

    pub fn create_rental_agreement(
        &self,
        input: &NewRentalAgreement,
    ) -> Result<EntryFunctionPayload, AmountError> {
        Ok(self.entry(
            EntryFunction::CreateRentalAgreement,
            vec![
                (&input.tenant).into(),
                self.codec.to_chain(input.rent)?.into(),
                self.codec.to_chain(input.deposit)?.into(),
                input.months.into(),
                input.agreement_type.as_str().into(),
                text_or_placeholder(&input.description),
            ],
        ))
    }

    pub fn pay_rent(&self, rental_id: RentalId) -> EntryFunctionPayload {
        self.entry(EntryFunction::PayRent, vec![rental_id.into()])
    }

    pub fn make_security_deposit(&self, rental_id: RentalId) -> EntryFunctionPayload {
        self.entry(EntryFunction::MakeSecurityDeposit, vec![rental_id.into()])
    }

    pub fn propose_deductions(
        &self,
        input: &Deduction,
    ) -> Result<EntryFunctionPayload, AmountError> {
        Ok(self.entry(
            EntryFunction::ProposeDeductions,
            vec![
                input.rental_id.into(),
                self.codec.to_chain(input.amount)?.into(),
                text_or_placeholder(&input.damage_description),
            ],
        ))
    }

    pub fn approve_deductions(&self, rental_id: RentalId) -> EntryFunctionPayload {
        self.entry(EntryFunction::ApproveDeductions, vec![rental_id.into()])
    }

    pub fn refund_security_deposit(&self, rental_id: RentalId) -> EntryFunctionPayload {
        self.entry(EntryFunction::RefundSecurityDeposit, vec![rental_id.into()])
    }
}

#[cfg(test)]
mod tests {
    use assertables::assert_err;
    use strum::IntoEnumIterator;

    use super::*;

    fn builder() -> CallBuilder {
        CallBuilder::new(ContractModules::new("0x1d94".into()), AmountCodec::default())
    }

    #[test]
    fn create_rental_agreement_arguments() {
        let payload = builder()
            .create_rental_agreement(&NewRentalAgreement {
                tenant: "0xabc".into(),
                rent: 100.0,
                deposit: 500.0,
                months: 12,
                agreement_type: "Residential".into(),
                description: "".into(),
            })
            .unwrap();

        assert_eq!(
            payload.function.to_string(),
            "0x1d94::RentalAgreementSystem::create_rental_agreement"
        );
        assert_eq!(
            payload.arguments,
            vec![
                MoveArg::Address("0xabc".into()),
                MoveArg::U64(10_000_000_000),
                MoveArg::U64(50_000_000_000),
                MoveArg::U64(12),
                MoveArg::String("Residential".into()),
                MoveArg::String("None".into()),
            ]
        );
    }

    #[test]
    fn create_policy_arguments() {
        let payload = builder()
            .create_policy(&NewPolicy {
                description: "".into(),
                premium: 1.5,
                yearly: true,
                max_claimable: 20.0,
                type_of_policy: "Car_Insurance".into(),
            })
            .unwrap();

        assert_eq!(
            payload.function.to_string(),
            "0x1d94::MicroInsuranceSystem::create_policy"
        );
        assert_eq!(
            payload.arguments,
            vec![
                MoveArg::String("None".into()),
                MoveArg::U64(150_000_000),
                MoveArg::Bool(true),
                MoveArg::U64(2_000_000_000),
                MoveArg::String("Car_Insurance".into()),
            ]
        );
    }

    #[test]
    fn only_empty_text_gets_placeholder() {
        assert_eq!(text_or_placeholder(""), MoveArg::String("None".into()));
        assert_eq!(text_or_placeholder("  "), MoveArg::String("  ".into()));
    }

    #[test]
    fn verify_claim_keeps_policy_then_customer() {
        let payload = builder().verify_claim(4, &"0xbeef".into());
        assert_eq!(
            payload.arguments,
            vec![MoveArg::U64(4), MoveArg::Address("0xbeef".into())]
        );
    }

    #[test]
    fn propose_deductions_keeps_description() {
        let payload = builder()
            .propose_deductions(&Deduction {
                rental_id: 9,
                amount: 0.25,
                damage_description: "broken window".into(),
            })
            .unwrap();
        assert_eq!(
            payload.arguments,
            vec![
                MoveArg::U64(9),
                MoveArg::U64(25_000_000),
                MoveArg::String("broken window".into()),
            ]
        );
    }

    #[test]
    fn amount_out_of_range_is_refused() {
        assert_err!(builder().create_policy(&NewPolicy {
            description: "x".into(),
            premium: -3.0,
            yearly: false,
            max_claimable: 1.0,
            type_of_policy: "Other_Insurance".into(),
        }));
    }

    #[test]
    fn single_id_functions_route_to_their_module() {
        let b = builder();
        for (payload, module, name) in [
            (b.purchase_policy(1), INSURANCE_MODULE, "purchase_policy"),
            (b.request_claim(1), INSURANCE_MODULE, "request_claim"),
            (b.payout_claim(1), INSURANCE_MODULE, "payout_claim"),
            (b.pay_rent(1), RENTAL_MODULE, "pay_rent"),
            (b.make_security_deposit(1), RENTAL_MODULE, "make_security_deposit"),
            (b.approve_deductions(1), RENTAL_MODULE, "approve_deductions"),
            (b.refund_security_deposit(1), RENTAL_MODULE, "refund_security_deposit"),
        ] {
            assert_eq!(payload.function.module, module);
            assert_eq!(payload.function.name, name);
            assert_eq!(payload.arguments, vec![MoveArg::U64(1)]);
        }
    }

    #[test]
    fn entry_function_names_are_snake_case() {
        let names: Vec<&'static str> = EntryFunction::iter().map(Into::into).collect();
        assert!(names.contains(&"create_rental_agreement"));
        assert!(names.contains(&"refund_security_deposit"));
        assert!(names.iter().all(|n| n.chars().all(|c| c.is_ascii_lowercase() || c == '_')));
    }
}
