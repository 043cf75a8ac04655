//! # fragment-store: owner-scoped storage for typed data fragments
//!
//! `fragment-store` stores opaque, typed byte blobs ("fragments") on behalf of
//! distinct owners, tracks per-fragment metadata, and serves on-demand format
//! conversions of the stored bytes (Markdown→HTML, image transcoding, and
//! friends). It is infrastructure, not a service: an HTTP layer resolves
//! identity and parses requests, then embeds a [`FragmentAdapter`] for
//! everything below that.
//!
//! ## Key features
//!
//! - **Dual backends**: an in-process pair for development and testing, and an
//!   AWS pair (S3 for bytes, DynamoDB for metadata) for production - selected
//!   once at startup, never mixed, never branched on downstream
//! - **Validated metadata**: owner, supported content type, and true byte
//!   size are enforced at the entity boundary
//! - **Conversion matrix**: a fixed table of which formats a fragment can be
//!   served as, with real transforms for images and Markdown
//! - **Server agnostic**: no HTTP coupling; errors are typed so any transport
//!   can map them to its own responses
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use fragment_store::prelude::*;
//! use bytes::Bytes;
//!
//! # #[tokio::main]
//! # async fn main() -> FragmentResult<()> {
//! // 1. Pick a backend pair from the environment (AWS_REGION → S3+DynamoDB)
//! let config = StorageConfig::from_env();
//! let fragments = FragmentAdapter::from_config(&config).await?;
//!
//! // 2. Store a fragment for an owner
//! let fragment = fragments
//!     .create("user-123", "text/markdown", Bytes::from("# Hello"))
//!     .await?;
//!
//! // 3. Serve it as HTML
//! if fragment.can_convert_to(".html") {
//!     let converted = fragments.convert_data(&fragment, ".html").await?;
//!     assert_eq!(converted.content_type, "text/html");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │      Your service    │  ← identity, routing, response envelopes
//! ├──────────────────────┤
//! │    FragmentAdapter   │  ← entity rules, conversion, sequencing
//! ├──────────┬───────────┤
//! │ Metadata │   Blob    │  ← storage primitives, two impls each
//! │  Store   │   Store   │
//! └──────────┴───────────┘
//! ```
//!
//! The metadata record and the blob are written to two independent stores;
//! the blob write is sequenced first, and a metadata failure after it leaves
//! the pair transiently inconsistent by design. Concurrent writes to the
//! same fragment are last-writer-wins.

pub mod adapter;
mod config;
pub mod convert;
mod dynamo_store;
mod error;
pub mod fragment;
mod memory_store;
mod s3_store;
pub mod store;
mod types;

// Re-export main types for clean API
pub use adapter::FragmentAdapter;
pub use config::StorageConfig;
pub use convert::{convert, Converted};
pub use dynamo_store::DynamoMetadataStore;
pub use error::{FragmentError, FragmentResult};
pub use fragment::{
    base_mime, conversion_targets, mime_for_extension, Fragment, SUPPORTED_TYPES,
};
pub use memory_store::{MemoryBlobStore, MemoryMetadataStore};
pub use s3_store::S3BlobStore;
pub use store::{blob_object_key, BlobStore, MetadataStore};
pub use types::{FragmentId, FragmentListing};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobStore, Converted, Fragment, FragmentAdapter, FragmentError, FragmentId,
        FragmentListing, FragmentResult, MetadataStore, StorageConfig,
    };
}
