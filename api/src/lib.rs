pub mod schema;

mod client;
mod error;

pub use self::{
    client::{NewsClient, NewsSource},
    error::ApiError,
};
