//! Strapi REST client for the nail feed backend.

pub mod client;
mod comments;
mod posts;
pub mod query;
mod reactions;
mod upload;

pub use client::StrapiClient;
