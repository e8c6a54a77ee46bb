use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use rentsure::{
    amount::AmountCodec,
    calls::{CallBuilder, Deduction, NewPolicy, NewRentalAgreement},
    model::{AccountAddress, Policy, PolicyId, PolicyType, RentalAgreement, RentalId, TxHash},
    rest::client::FullnodeApiHttpClient,
    utils::{conf::Conf, logger::setup_tracing},
    view::ViewQueryClient,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    pub config_file: Option<String>,

    /// mainnet, testnet, devnet or local
    #[arg(long)]
    pub network: Option<String>,

    #[arg(long)]
    pub node_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read contract state through view functions
    View {
        /// One line per record, amounts in human units
        #[arg(long, action = clap::ArgAction::SetTrue)]
        summary: bool,

        #[command(subcommand)]
        query: ViewCommand,
    },
    /// Print an entry function payload, ready for a wallet to sign
    Build {
        #[command(subcommand)]
        call: BuildCommand,
    },
    /// Wait until a submitted transaction is committed
    Wait { hash: String },
    /// Convert between human and on-chain amounts
    Amount {
        #[command(subcommand)]
        conversion: AmountCommand,
    },
    /// Print the fullnode's ledger version
    Ledger,
}

#[derive(Subcommand, Debug)]
enum ViewCommand {
    /// Defaults to the configured creator_address
    ListByCreator {
        #[arg(value_parser = AccountAddress::from_str)]
        creator: Option<AccountAddress>,
    },
    ListByCustomer {
        #[arg(value_parser = AccountAddress::from_str)]
        customer: AccountAddress,
    },
    ListAll,
    Policy { policy_id: PolicyId },
    /// Defaults to the configured creator_address
    RentalsByLandlord {
        #[arg(value_parser = AccountAddress::from_str)]
        landlord: Option<AccountAddress>,
    },
    RentalsByTenant {
        #[arg(value_parser = AccountAddress::from_str)]
        tenant: AccountAddress,
    },
    Rental { rental_id: RentalId },
}

#[derive(Subcommand, Debug)]
enum BuildCommand {
    CreatePolicy {
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        premium: f64,
        #[arg(long, action = clap::ArgAction::SetTrue)]
        yearly: bool,
        #[arg(long)]
        max_claimable: f64,
        #[arg(long, default_value = "Other_Insurance")]
        type_of_policy: PolicyType,
    },
    PurchasePolicy { policy_id: PolicyId },
    RequestClaim { policy_id: PolicyId },
    VerifyClaim {
        policy_id: PolicyId,
        #[arg(value_parser = AccountAddress::from_str)]
        customer: AccountAddress,
    },
    PayoutClaim { policy_id: PolicyId },
    CreateRental {
        #[arg(long, value_parser = AccountAddress::from_str)]
        tenant: AccountAddress,
        #[arg(long)]
        rent: f64,
        #[arg(long)]
        deposit: f64,
        #[arg(long)]
        months: u64,
        #[arg(long, default_value = "")]
        agreement_type: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    PayRent { rental_id: RentalId },
    MakeSecurityDeposit { rental_id: RentalId },
    ProposeDeductions {
        rental_id: RentalId,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "")]
        damage_description: String,
    },
    ApproveDeductions { rental_id: RentalId },
    RefundSecurityDeposit { rental_id: RentalId },
}

#[derive(Subcommand, Debug)]
enum AmountCommand {
    ToChain { value: f64 },
    ToHuman { value: u64 },
}

#[derive(Serialize)]
#[serde(untagged)]
enum Listing {
    Policies(Vec<Policy>),
    Rentals(Vec<RentalAgreement>),
}

impl Listing {
    fn summary(&self, codec: &AmountCodec, customer: Option<&AccountAddress>) -> Vec<String> {
        match self {
            Listing::Policies(policies) => policies
                .iter()
                .map(|p| policy_line(codec, p, customer))
                .collect(),
            Listing::Rentals(rentals) => rentals.iter().map(|r| rental_line(codec, r)).collect(),
        }
    }
}

fn human(codec: &AmountCodec, amount: Option<u64>) -> String {
    codec
        .to_human_opt(amount)
        .map_or_else(|| "?".to_string(), |v| v.to_string())
}

fn policy_line(codec: &AmountCodec, policy: &Policy, customer: Option<&AccountAddress>) -> String {
    let mut line = format!(
        "policy #{} {} premium {} max claimable {} pending verifications {}",
        policy.id,
        policy.type_of_policy.as_deref().unwrap_or("?"),
        human(codec, policy.premium_amount),
        human(codec, policy.max_claimable),
        policy.pending_verifications().count()
    );
    if let Some(claim) = customer.and_then(|c| policy.customer(c)) {
        line.push_str(&format!(
            " | paid {} requested {} verified {} claimed {}",
            claim.paid(),
            claim.requested(),
            claim.verified(),
            claim.claimed()
        ));
    }
    line
}

fn rental_line(codec: &AmountCodec, rental: &RentalAgreement) -> String {
    format!(
        "rental #{} tenant {} rent {} deposit {} paid {} months left {}",
        rental.rental_id,
        rental.tenant.as_ref().map_or("?", |t| t.short()),
        human(codec, rental.rent_amount),
        human(codec, rental.security_deposit),
        codec.to_human(rental.total_paid()),
        rental
            .remaining_months()
            .map_or_else(|| "?".to_string(), |m| m.to_string())
    )
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let conf = Conf::new_shared(args.config_file, args.network, args.node_url)
        .context("reading config file")?;

    setup_tracing(conf.tracing_mode()?)?;

    info!("Using fullnode {}", conf.node_url());

    let node = FullnodeApiHttpClient::from_conf(&conf)?;
    let codec = conf.codec()?;

    match args.command {
        Commands::View { summary, query } => {
            let views = ViewQueryClient::new(node, conf.modules());
            let configured_creator = || {
                conf.creator_address
                    .clone()
                    .context("no address given and creator_address is not configured")
            };
            let mut customer = None;
            let listing = match query {
                ViewCommand::ListByCreator { creator } => {
                    let creator = creator.map_or_else(configured_creator, Ok)?;
                    Listing::Policies(views.policies_by_creator(&creator).await)
                }
                ViewCommand::ListByCustomer { customer: address } => {
                    let policies = views.policies_by_customer(&address).await;
                    customer = Some(address);
                    Listing::Policies(policies)
                }
                ViewCommand::ListAll => Listing::Policies(views.all_policies().await),
                ViewCommand::Policy { policy_id } => {
                    Listing::Policies(views.policy_by_id(policy_id).await.into_iter().collect())
                }
                ViewCommand::RentalsByLandlord { landlord } => {
                    let landlord = landlord.map_or_else(configured_creator, Ok)?;
                    Listing::Rentals(views.rentals_by_landlord(&landlord).await)
                }
                ViewCommand::RentalsByTenant { tenant } => {
                    Listing::Rentals(views.rentals_by_tenant(&tenant).await)
                }
                ViewCommand::Rental { rental_id } => {
                    Listing::Rentals(views.rental_by_id(rental_id).await.into_iter().collect())
                }
            };
            if summary {
                for line in listing.summary(&codec, customer.as_ref()) {
                    println!("{line}");
                }
            } else {
                print_json(&listing)?;
            }
        }
        Commands::Build { call } => {
            let calls = CallBuilder::new(conf.modules(), codec);
            let payload = match call {
                BuildCommand::CreatePolicy {
                    description,
                    premium,
                    yearly,
                    max_claimable,
                    type_of_policy,
                } => calls.create_policy(&NewPolicy {
                    description,
                    premium,
                    yearly,
                    max_claimable,
                    type_of_policy: type_of_policy.to_string(),
                })?,
                BuildCommand::PurchasePolicy { policy_id } => calls.purchase_policy(policy_id),
                BuildCommand::RequestClaim { policy_id } => calls.request_claim(policy_id),
                BuildCommand::VerifyClaim {
                    policy_id,
                    customer,
                } => calls.verify_claim(policy_id, &customer),
                BuildCommand::PayoutClaim { policy_id } => calls.payout_claim(policy_id),
                BuildCommand::CreateRental {
                    tenant,
                    rent,
                    deposit,
                    months,
                    agreement_type,
                    description,
                } => calls.create_rental_agreement(&NewRentalAgreement {
                    tenant,
                    rent,
                    deposit,
                    months,
                    agreement_type,
                    description,
                })?,
                BuildCommand::PayRent { rental_id } => calls.pay_rent(rental_id),
                BuildCommand::MakeSecurityDeposit { rental_id } => {
                    calls.make_security_deposit(rental_id)
                }
                BuildCommand::ProposeDeductions {
                    rental_id,
                    amount,
                    damage_description,
                } => calls.propose_deductions(&Deduction {
                    rental_id,
                    amount,
                    damage_description,
                })?,
                BuildCommand::ApproveDeductions { rental_id } => {
                    calls.approve_deductions(rental_id)
                }
                BuildCommand::RefundSecurityDeposit { rental_id } => {
                    calls.refund_security_deposit(rental_id)
                }
            };
            print_json(&payload)?;
        }
        Commands::Wait { hash } => {
            let committed = node.wait_for_transaction(&TxHash(hash)).await?;
            print_json(&committed)?;
        }
        Commands::Amount { conversion } => match conversion {
            AmountCommand::ToChain { value } => println!("{}", codec.to_chain(value)?),
            AmountCommand::ToHuman { value } => println!("{}", codec.to_human(value)),
        },
        Commands::Ledger => {
            let version = node.get_ledger_version().await?;
            println!("{version}");
        }
    }

    Ok(())
}
