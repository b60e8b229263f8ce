pub mod check;
pub mod profile;
