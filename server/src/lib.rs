#[macro_use]
extern crate rocket;

pub mod configuration;
pub mod markdown;
pub mod search;
pub mod webserver;

#[cfg(test)]
mod test_helpers;
