pub mod health;
pub mod incidents;
