//! Read-only queries against the contract's view functions.

use anyhow::Result;
use serde::Serialize;
use strum_macros::{AsRefStr, EnumIter, IntoStaticStr};
use tracing::debug;

use crate::{
    calls::{ContractModules, ModuleKind},
    error::ClientError,
    model::{AccountAddress, Policy, PolicyId, RentalAgreement, RentalId},
    payload::{EntryFunctionId, MoveArg},
    reconcile::{reconcile_list, reconcile_one},
    rest::FullnodeApi,
    utils::logger::LogMe,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ViewFunction {
    ViewPoliciesByCreator,
    ViewPoliciesByCustomer,
    ViewAllPolicies,
    ViewPolicyById,
    ViewRentalsByLandlord,
    ViewRentalsByTenant,
    ViewRentalById,
}

impl ViewFunction {
    pub fn module(&self) -> ModuleKind {
        match self {
            ViewFunction::ViewPoliciesByCreator
            | ViewFunction::ViewPoliciesByCustomer
            | ViewFunction::ViewAllPolicies
            | ViewFunction::ViewPolicyById => ModuleKind::Insurance,
            ViewFunction::ViewRentalsByLandlord
            | ViewFunction::ViewRentalsByTenant
            | ViewFunction::ViewRentalById => ModuleKind::Rental,
        }
    }
}

/// Body of a view call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRequest {
    pub function: EntryFunctionId,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<MoveArg>,
}

#[derive(Clone)]
pub struct ViewQueryClient<N> {
    node: N,
    modules: ContractModules,
}

impl<N: FullnodeApi> ViewQueryClient<N> {
    pub fn new(node: N, modules: ContractModules) -> Self {
        ViewQueryClient { node, modules }
    }

    pub fn request(&self, function: ViewFunction, arguments: Vec<MoveArg>) -> ViewRequest {
        ViewRequest {
            function: self.modules.function_id(function.module(), function.as_ref()),
            type_arguments: vec![],
            arguments,
        }
    }

    /// Runs the view function and returns its first result slot.
    pub async fn query(
        &self,
        function: ViewFunction,
        arguments: Vec<MoveArg>,
    ) -> Result<Option<serde_json::Value>, ClientError> {
        let request = self.request(function, arguments);
        debug!("Querying {}", request.function);
        let mut slots = self
            .node
            .view(&request)
            .await
            .map_err(ClientError::QueryFailed)?;
        Ok(if slots.is_empty() {
            None
        } else {
            Some(slots.swap_remove(0))
        })
    }

    /// Same as [`Self::query`], but a failure is logged and reads as absent.
    async fn query_or_absent(
        &self,
        function: ViewFunction,
        arguments: Vec<MoveArg>,
    ) -> Option<serde_json::Value> {
        let name: &'static str = function.into();
        self.query(function, arguments)
            .await
            .log_warn(format!("Failed to query {name}"))
            .ok()
            .flatten()
    }

    pub async fn policies_by_creator(&self, creator: &AccountAddress) -> Vec<Policy> {
        reconcile_list(
            self.query_or_absent(ViewFunction::ViewPoliciesByCreator, vec![creator.into()])
                .await,
        )
    }

    pub async fn policies_by_customer(&self, customer: &AccountAddress) -> Vec<Policy> {
        reconcile_list(
            self.query_or_absent(ViewFunction::ViewPoliciesByCustomer, vec![customer.into()])
                .await,
        )
    }

    pub async fn all_policies(&self) -> Vec<Policy> {
        reconcile_list(
            self.query_or_absent(ViewFunction::ViewAllPolicies, vec![])
                .await,
        )
    }

    pub async fn policy_by_id(&self, policy_id: PolicyId) -> Option<Policy> {
        reconcile_one(
            self.query_or_absent(ViewFunction::ViewPolicyById, vec![policy_id.into()])
                .await,
        )
    }

    pub async fn rentals_by_landlord(&self, landlord: &AccountAddress) -> Vec<RentalAgreement> {
        reconcile_list(
            self.query_or_absent(ViewFunction::ViewRentalsByLandlord, vec![landlord.into()])
                .await,
        )
    }

    pub async fn rentals_by_tenant(&self, tenant: &AccountAddress) -> Vec<RentalAgreement> {
        reconcile_list(
            self.query_or_absent(ViewFunction::ViewRentalsByTenant, vec![tenant.into()])
                .await,
        )
    }

    pub async fn rental_by_id(&self, rental_id: RentalId) -> Option<RentalAgreement> {
        reconcile_one(
            self.query_or_absent(ViewFunction::ViewRentalById, vec![rental_id.into()])
                .await,
        )
    }
}
