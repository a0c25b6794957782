//! Fundamental types for the Agora governance engine.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account identities, timestamps, token amounts, governance parameters, and the
//! capability trait through which the engine moves tokens and base-currency value.

pub mod address;
pub mod amount;
pub mod error;
pub mod gateway;
pub mod params;
pub mod time;

pub use address::AccountId;
pub use amount::{mul_div, tokens, TOKEN_UNIT};
pub use error::ParamError;
pub use gateway::{AssetGateway, GatewayError};
pub use params::{validate_percentages, DaoParams, EconomicParams};
pub use time::Timestamp;
