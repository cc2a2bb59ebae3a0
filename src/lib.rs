pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod http;
pub mod model;

#[cfg(test)]
mod testing;

pub mod prelude {
    pub use crate::client::{Client, ClientBuilder, Context, Registry};
    pub use crate::config::ClientConfig;
    pub use crate::entity::{Entity, Field, LoadMode, Model, Snowflake};
    pub use crate::error::{ClientError, Result};
    pub use crate::gateway::{GatewayOptions, SessionInfo};
    pub use crate::model::constants::*;
    pub use crate::model::*;
}
