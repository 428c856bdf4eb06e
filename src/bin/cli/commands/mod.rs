pub mod generate;
pub mod history;
pub mod review;
pub mod saved;
pub mod serve;
