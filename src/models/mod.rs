pub mod application;
pub mod district;
pub mod region;
pub mod school;
pub mod school_admin;
pub mod user;
pub mod vacancy;
