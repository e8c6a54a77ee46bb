//! Page-level state: the entity lists a page shows and the actions it
//! offers.
//!
//! Lists are a cache of the last view query. They are only re-fetched by
//! [`ProviderDashboard::refresh`] / [`CustomerDashboard::refresh`], which a
//! caller runs once on mount and which every action runs after its
//! transaction is confirmed. Failed actions leave the cache untouched.

use tracing::info;

use crate::{
    amount::AmountError,
    calls::{CallBuilder, Deduction, NewPolicy, NewRentalAgreement},
    error::{ClientError, Notification},
    model::{AccountAddress, Policy, PolicyId, RentalAgreement, RentalId},
    payload::EntryFunctionPayload,
    rest::FullnodeApi,
    submit::{SubmissionState, SubmissionWatch, TransactionSubmitter},
    view::ViewQueryClient,
    wallet::Session,
};

pub const INVALID_POLICY_ID_MESSAGE: &str = "Please enter a valid Policy ID.";

struct DashboardCore<N> {
    views: ViewQueryClient<N>,
    submitter: TransactionSubmitter<N>,
    calls: CallBuilder,
}

impl<N: FullnodeApi + Clone> DashboardCore<N> {
    fn new(node: N, session: Session, calls: CallBuilder) -> Self {
        DashboardCore {
            views: ViewQueryClient::new(node.clone(), calls.modules.clone()),
            submitter: TransactionSubmitter::new(node, session),
            calls,
        }
    }

    fn account(&self) -> Option<AccountAddress> {
        self.submitter.session().address()
    }

    /// Submits and waits. On failure the returned notification is ready
    /// to show and nothing should be refreshed.
    async fn execute(
        &mut self,
        action: &str,
        payload: Result<EntryFunctionPayload, AmountError>,
    ) -> Result<(), Notification> {
        let payload = payload.map_err(|e| ClientError::from(e).notify(action))?;
        self.submitter
            .submit(&payload)
            .await
            .map(|_| ())
            .map_err(|e| e.notify(action))
    }
}

/// Landlord and insurer page.
pub struct ProviderDashboard<N> {
    core: DashboardCore<N>,
    pub policies: Vec<Policy>,
    pub rentals: Vec<RentalAgreement>,
}

impl<N: FullnodeApi + Clone> ProviderDashboard<N> {
    pub fn new(node: N, session: Session, calls: CallBuilder) -> Self {
        ProviderDashboard {
            core: DashboardCore::new(node, session, calls),
            policies: vec![],
            rentals: vec![],
        }
    }

    pub fn submission(&self) -> SubmissionState {
        self.core.submitter.state()
    }

    pub fn is_busy(&self) -> bool {
        self.core.submitter.is_pending()
    }

    /// Follows the submission state while an action is running.
    pub fn watch_submission(&self) -> SubmissionWatch {
        self.core.submitter.subscribe()
    }

    pub async fn refresh(&mut self) {
        let Some(me) = self.core.account() else {
            self.policies.clear();
            self.rentals.clear();
            return;
        };
        let views = &self.core.views;
        let (policies, rentals) =
            futures::join!(views.policies_by_creator(&me), views.rentals_by_landlord(&me));
        info!(
            "Provider {} has {} policies and {} rentals",
            me.short(),
            policies.len(),
            rentals.len()
        );
        self.policies = policies;
        self.rentals = rentals;
    }

    async fn act(
        &mut self,
        action: &str,
        payload: Result<EntryFunctionPayload, AmountError>,
        success: &str,
    ) -> Notification {
        match self.core.execute(action, payload).await {
            Ok(()) => {
                self.refresh().await;
                Notification::success(success)
            }
            Err(notification) => notification,
        }
    }

    pub async fn create_policy(&mut self, input: &NewPolicy) -> Notification {
        let payload = self.core.calls.create_policy(input);
        self.act("creating policy", payload, "Policy is Created Successfully!")
            .await
    }

    pub async fn verify_claim(
        &mut self,
        policy_id: PolicyId,
        customer: &AccountAddress,
    ) -> Notification {
        let payload = Ok(self.core.calls.verify_claim(policy_id, customer));
        self.act("verifying claim", payload, "Claim is Verified!")
            .await
    }

    pub async fn payout_claim(&mut self, policy_id: PolicyId) -> Notification {
        let payload = Ok(self.core.calls.payout_claim(policy_id));
        self.act("paying claim", payload, "Payout is Successful!")
            .await
    }

    pub async fn create_rental_agreement(&mut self, input: &NewRentalAgreement) -> Notification {
        let payload = self.core.calls.create_rental_agreement(input);
        self.act(
            "creating rental agreement",
            payload,
            "Rental Agreement is Created Successfully!",
        )
        .await
    }

    pub async fn propose_deductions(&mut self, input: &Deduction) -> Notification {
        let payload = self.core.calls.propose_deductions(input);
        self.act("proposing deductions", payload, "Deductions are Proposed!")
            .await
    }

    pub async fn refund_security_deposit(&mut self, rental_id: RentalId) -> Notification {
        let payload = Ok(self.core.calls.refund_security_deposit(rental_id));
        self.act(
            "refunding security deposit",
            payload,
            "Security Deposit is Refunded!",
        )
        .await
    }
}

/// Tenant and insurance customer page.
pub struct CustomerDashboard<N> {
    core: DashboardCore<N>,
    pub all_policies: Vec<Policy>,
    pub my_policies: Vec<Policy>,
    pub rentals: Vec<RentalAgreement>,
    pub selected_policy: Option<Policy>,
}

impl<N: FullnodeApi + Clone> CustomerDashboard<N> {
    pub fn new(node: N, session: Session, calls: CallBuilder) -> Self {
        CustomerDashboard {
            core: DashboardCore::new(node, session, calls),
            all_policies: vec![],
            my_policies: vec![],
            rentals: vec![],
            selected_policy: None,
        }
    }

    pub fn submission(&self) -> SubmissionState {
        self.core.submitter.state()
    }

    pub fn is_busy(&self) -> bool {
        self.core.submitter.is_pending()
    }

    /// Follows the submission state while an action is running.
    pub fn watch_submission(&self) -> SubmissionWatch {
        self.core.submitter.subscribe()
    }

    pub async fn refresh(&mut self) {
        let views = &self.core.views;
        let Some(me) = self.core.account() else {
            self.all_policies = views.all_policies().await;
            self.my_policies.clear();
            self.rentals.clear();
            return;
        };
        let (all_policies, my_policies, rentals) = futures::join!(
            views.all_policies(),
            views.policies_by_customer(&me),
            views.rentals_by_tenant(&me)
        );
        info!(
            "Customer {} holds {} of {} policies and {} rentals",
            me.short(),
            my_policies.len(),
            all_policies.len(),
            rentals.len()
        );
        self.all_policies = all_policies;
        self.my_policies = my_policies;
        self.rentals = rentals;
    }

    /// Loads one policy for the detail panel.
    pub async fn fetch_policy_by_id(&mut self, policy_id: Option<PolicyId>) -> Option<Notification> {
        let Some(policy_id) = policy_id else {
            return Some(Notification::error(INVALID_POLICY_ID_MESSAGE));
        };
        self.selected_policy = self.core.views.policy_by_id(policy_id).await;
        None
    }

    async fn act(
        &mut self,
        action: &str,
        payload: EntryFunctionPayload,
        success: &str,
    ) -> Notification {
        match self.core.execute(action, Ok(payload)).await {
            Ok(()) => {
                self.refresh().await;
                Notification::success(success)
            }
            Err(notification) => notification,
        }
    }

    pub async fn purchase_policy(&mut self, policy_id: PolicyId) -> Notification {
        let payload = self.core.calls.purchase_policy(policy_id);
        self.act("purchasing policy", payload, "Purchase Successful!")
            .await
    }

    pub async fn request_claim(&mut self, policy_id: PolicyId) -> Notification {
        let payload = self.core.calls.request_claim(policy_id);
        self.act("requesting claim", payload, "Requested for Verification!")
            .await
    }

    pub async fn pay_rent(&mut self, rental_id: RentalId) -> Notification {
        let payload = self.core.calls.pay_rent(rental_id);
        self.act("paying rent", payload, "Rent is Paid!").await
    }

    pub async fn make_security_deposit(&mut self, rental_id: RentalId) -> Notification {
        let payload = self.core.calls.make_security_deposit(rental_id);
        self.act(
            "making security deposit",
            payload,
            "Security Deposit is Made!",
        )
        .await
    }

    pub async fn approve_deductions(&mut self, rental_id: RentalId) -> Notification {
        let payload = self.core.calls.approve_deductions(rental_id);
        self.act("approving deductions", payload, "Deductions are Approved!")
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::{
        amount::AmountCodec,
        calls::ContractModules,
        error::{Severity, INVALID_AMOUNT_MESSAGE, USER_REJECTED_MESSAGE},
        utils::testing::{MockFullnode, MockWallet, WalletBehaviour},
        view::ViewFunction,
    };

    fn calls() -> CallBuilder {
        CallBuilder::new(ContractModules::new("0x1d94".into()), AmountCodec::default())
    }

    fn provider(node: &MockFullnode, behaviour: WalletBehaviour) -> ProviderDashboard<MockFullnode> {
        ProviderDashboard::new(
            node.clone(),
            Session::new(MockWallet::new("0xa11ce", behaviour)),
            calls(),
        )
    }

    fn customer(node: &MockFullnode, behaviour: WalletBehaviour) -> CustomerDashboard<MockFullnode> {
        CustomerDashboard::new(
            node.clone(),
            Session::new(MockWallet::new("0xb0b", behaviour)),
            calls(),
        )
    }

    #[test_log::test(tokio::test)]
    async fn confirmed_action_refreshes_each_list_once() {
        let node = MockFullnode::default();
        node.set_view(
            ViewFunction::ViewPoliciesByCreator,
            vec![json!([{ "id": "1", "creator": "0xa11ce", "customers": [] }])],
        );
        let mut page = provider(&node, WalletBehaviour::Sign);

        let notification = page
            .create_policy(&NewPolicy {
                description: "".into(),
                premium: 1.5,
                yearly: false,
                max_claimable: 10.0,
                type_of_policy: "Home_Insurance".into(),
            })
            .await;

        assert_eq!(notification, Notification::success("Policy is Created Successfully!"));
        assert_eq!(node.view_count(ViewFunction::ViewPoliciesByCreator), 1);
        assert_eq!(node.view_count(ViewFunction::ViewRentalsByLandlord), 1);
        assert_eq!(node.view_requests().len(), 2);
        assert_eq!(page.policies.len(), 1);
        assert!(page.rentals.is_empty());
        assert!(matches!(page.submission(), SubmissionState::Confirmed(_)));
    }

    #[test_log::test(tokio::test)]
    async fn busy_while_rent_payment_commits() {
        let node = MockFullnode::default();
        node.delay_transactions(Duration::from_millis(300));
        let mut page = customer(&node, WalletBehaviour::Sign);
        let mut watch = page.watch_submission();
        assert!(!page.is_busy());

        let observer = async { watch.wait_for(SubmissionState::is_pending).await.is_ok() };
        let (notification, saw_busy) = tokio::join!(page.pay_rent(3), observer);

        assert!(saw_busy);
        assert_eq!(notification, Notification::success("Rent is Paid!"));
        assert!(!page.is_busy());
        assert!(matches!(page.submission(), SubmissionState::Confirmed(_)));
    }

    #[test_log::test(tokio::test)]
    async fn rejected_action_does_not_refresh() {
        let node = MockFullnode::default();
        let mut page = customer(&node, WalletBehaviour::Reject);

        let notification = page.purchase_policy(1001).await;

        assert_eq!(notification, Notification::warning(USER_REJECTED_MESSAGE));
        assert!(node.view_requests().is_empty());
        assert!(node.waited_for().is_empty());
        assert!(!page.is_busy());
    }

    #[test_log::test(tokio::test)]
    async fn aborted_action_does_not_refresh() {
        let node = MockFullnode::default();
        node.abort_transactions("Move abort: ENOT_TENANT");
        let mut page = customer(&node, WalletBehaviour::Sign);

        let notification = page.pay_rent(3).await;

        assert_eq!(notification.severity, Severity::Error);
        assert_eq!(node.waited_for().len(), 1);
        assert!(node.view_requests().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn invalid_amount_never_reaches_the_wallet() {
        let node = MockFullnode::default();
        let wallet = MockWallet::new("0xa11ce", WalletBehaviour::Sign);
        let mut page = ProviderDashboard::new(node.clone(), Session::new(wallet.clone()), calls());

        let notification = page
            .create_rental_agreement(&NewRentalAgreement {
                tenant: "0xb0b".into(),
                rent: f64::NAN,
                deposit: 1.0,
                months: 6,
                agreement_type: "Commercial".into(),
                description: "shop".into(),
            })
            .await;

        assert_eq!(notification, Notification::error(INVALID_AMOUNT_MESSAGE));
        assert!(wallet.signed().is_empty());
        assert_eq!(page.submission(), SubmissionState::Idle);
    }

    #[test_log::test(tokio::test)]
    async fn customer_refresh_queries_three_lists() {
        let node = MockFullnode::default();
        node.set_view(
            ViewFunction::ViewAllPolicies,
            vec![json!([{ "id": "1" }, { "id": "2" }])],
        );
        node.set_view(
            ViewFunction::ViewRentalsByTenant,
            vec![json!([{ "rental_id": "8", "tenant": "0xb0b", "payments": [] }])],
        );
        let mut page = customer(&node, WalletBehaviour::Sign);

        let notification = page.request_claim(2).await;

        assert_eq!(notification, Notification::success("Requested for Verification!"));
        for function in [
            ViewFunction::ViewAllPolicies,
            ViewFunction::ViewPoliciesByCustomer,
            ViewFunction::ViewRentalsByTenant,
        ] {
            assert_eq!(node.view_count(function), 1);
        }
        assert_eq!(page.all_policies.len(), 2);
        assert!(page.my_policies.is_empty());
        assert_eq!(page.rentals[0].rental_id, 8);
    }

    #[test_log::test(tokio::test)]
    async fn disconnected_customer_only_sees_all_policies() {
        let node = MockFullnode::default();
        node.set_view(ViewFunction::ViewAllPolicies, vec![json!([{ "id": "1" }])]);
        let mut page = CustomerDashboard::new(node.clone(), Session::disconnected(), calls());

        page.refresh().await;

        assert_eq!(page.all_policies.len(), 1);
        assert_eq!(node.view_requests().len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn failed_refresh_leaves_page_usable() {
        let node = MockFullnode::default();
        node.fail_views("503 Service Unavailable");
        let mut page = provider(&node, WalletBehaviour::Sign);
        page.policies = vec![serde_json::from_value(json!({ "id": "1" })).unwrap()];

        page.refresh().await;

        assert!(page.policies.is_empty());
        assert!(page.rentals.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn policy_lookup_requires_an_id() {
        let node = MockFullnode::default();
        node.set_view(ViewFunction::ViewPolicyById, vec![json!({ "id": "5" })]);
        let mut page = customer(&node, WalletBehaviour::Sign);

        assert_eq!(
            page.fetch_policy_by_id(None).await,
            Some(Notification::error(INVALID_POLICY_ID_MESSAGE))
        );
        assert!(node.view_requests().is_empty());

        assert_eq!(page.fetch_policy_by_id(Some(5)).await, None);
        assert_eq!(page.selected_policy.map(|p| p.id), Some(5));
    }

    #[test_log::test(tokio::test)]
    async fn provider_actions_target_the_right_functions() {
        let node = MockFullnode::default();
        let wallet = MockWallet::new("0xa11ce", WalletBehaviour::Sign);
        let mut page = ProviderDashboard::new(node.clone(), Session::new(wallet.clone()), calls());

        page.verify_claim(1, &"0xb0b".into()).await;
        page.payout_claim(1).await;
        page.propose_deductions(&Deduction {
            rental_id: 2,
            amount: 10.0,
            damage_description: "".into(),
        })
        .await;
        page.refund_security_deposit(2).await;

        let names: Vec<String> = wallet
            .signed()
            .into_iter()
            .map(|p| p.function.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "verify_claim",
                "payout_claim",
                "propose_deductions",
                "refund_security_deposit"
            ]
        );
        assert_eq!(node.view_count(ViewFunction::ViewPoliciesByCreator), 4);
    }

    #[test_log::test(tokio::test)]
    async fn customer_deposit_flow() {
        let node = MockFullnode::default();
        let wallet = MockWallet::new("0xb0b", WalletBehaviour::Sign);
        let mut page = CustomerDashboard::new(node.clone(), Session::new(wallet.clone()), calls());

        assert_eq!(
            page.make_security_deposit(4).await,
            Notification::success("Security Deposit is Made!")
        );
        assert_eq!(
            page.approve_deductions(4).await,
            Notification::success("Deductions are Approved!")
        );
        assert_eq!(wallet.signed().len(), 2);
        assert_eq!(node.waited_for().len(), 2);
    }
}
