pub mod client;
pub mod labrinth;
