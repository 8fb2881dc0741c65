pub mod allocation;
pub mod claim;
pub mod leaf;
pub mod merkle;
