pub mod client;

pub use client::HospitalApiClient;
