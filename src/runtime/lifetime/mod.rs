pub mod reload;
pub mod shutdown;
pub mod startup;
