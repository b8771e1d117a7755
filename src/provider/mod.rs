//! Provider selection and chat model construction.
//!
//! A configuration block is rewritten for exactly one [`ProviderId`] by
//! [`transform`], then [`connect`] builds the matching wire client behind a
//! [`ChatModel`] handle. Supports OpenAI-compatible endpoints, Azure OpenAI,
//! Google AI Studio, Dashscope and DeepSeek.

mod client;
mod dispatch;
mod gemini;
mod http;
mod kind;
mod openai;
mod settings;
mod transform;

pub use client::ChatModel;
pub use dispatch::{connect, Connector, ProviderConnector};
pub use http::Transport;
pub use kind::ProviderId;
pub use transform::{select, transform, PreparedBlock, ProviderRequest};
