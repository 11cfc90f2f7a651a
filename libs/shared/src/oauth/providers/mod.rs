//! Built-in provider presets

mod auth0;
mod google;
mod okta;

pub use auth0::Auth0Provider;
pub use google::GoogleProvider;
pub use okta::OktaProvider;
