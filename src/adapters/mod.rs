pub mod world_bank;

pub use world_bank::WorldBankClient;
