pub mod authenticated;
pub mod events;
pub mod request;
pub mod single_flight;

pub use authenticated::AuthenticatedRequestClient;
pub use events::{AuthEvent, AuthEvents};
pub use request::RequestOptions;
