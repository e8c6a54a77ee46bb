//! # RentSure
//!
//! *Client for the RentSure micro-insurance and rental-agreement contracts on Aptos.*
//!
//! Builds entry-function payloads for both contract modules, reads their state
//! through fullnode view functions and tracks a signed transaction until the
//! network commits it. The provider and customer dashboards tie these together.
//!
//! ## Useful links
//!
//! * [Aptos fullnode REST API](https://aptos.dev/en/build/apis/fullnode-rest-api)

pub mod amount;
pub mod calls;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod payload;
pub mod reconcile;
pub mod rest;
pub mod submit;
pub mod utils;
pub mod view;
pub mod wallet;
