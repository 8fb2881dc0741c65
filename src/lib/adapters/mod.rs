pub mod memory_ledger;
pub mod memory_token;
pub mod owner;
