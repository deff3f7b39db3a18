pub mod callback;
pub mod initiate;
pub mod orders;
pub mod products;
