pub mod add;
pub mod delete;
pub mod settle;
pub mod settle_person;
