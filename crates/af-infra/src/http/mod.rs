//! HTTP adapters: the storefront backend and the PAN / DigiLocker service.

mod backend;
mod kyc_services;
mod response;

pub use backend::HttpBackendApi;
pub use kyc_services::HttpKycServices;
