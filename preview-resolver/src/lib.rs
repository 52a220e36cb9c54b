//! Resolution-and-snapshot pipeline for NFT link previews.
//!
//! Resolves a token identifier into on-chain data at a finalized block,
//! decodes the tokenURI into structured metadata, and maintains a
//! content-addressed cache of rendered preview images. HTTP dispatch, page
//! templating and the storage backends themselves live with the callers.

pub mod app;
pub mod config;
pub mod error;
pub mod metadata;
pub mod patch;
pub mod render;
pub mod resolver;
pub mod snapshot;
