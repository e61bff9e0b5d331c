pub mod backend;
pub mod error;
pub mod models;
pub mod presentation;
pub mod services;
pub mod view;

pub use backend::{BookingBackend, HttpBookingBackend};
pub use error::*;
pub use models::*;
pub use services::*;
pub use view::{BookingSnapshot, BookingView, BookingViewHandle, Route, UserAction, ViewExit, ViewSettings};
