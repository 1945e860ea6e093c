pub mod groups;
pub mod ledger;
pub mod netting;
pub mod store;
pub mod transaction;
