//! Chroma vector store integration for `DashFlow` Rust.
//!
//! This crate provides a Rust implementation of the Chroma vector store for `DashFlow`.
//! Chroma is an open-source embedding database that provides an efficient way to store
//! and query vector embeddings.
//!
//! # Prerequisites
//!
//! You need a running Chroma server. The easiest way is with Docker:
//!
//! ```bash
//! docker run -p 8000:8000 chromadb/chroma
//! ```
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```ignore
//! use dashflow_chroma::ChromaVectorStore;
//! use dashflow::core::embeddings::{Embeddings, MockEmbeddings};
//! use dashflow::core::vector_stores::VectorStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let embeddings: Arc<dyn Embeddings> = Arc::new(MockEmbeddings::new(384));
//! // Create a Chroma vector store
//! let mut store = ChromaVectorStore::new(
//!     "my_collection",
//!     embeddings,
//!     Some("http://localhost:8000"),
//! ).await?;
//!
//! // Add documents
//! let texts = ["Hello world", "Goodbye world"];
//! let ids = store.add_texts(&texts, None, None).await?;
//!
//! // Search
//! let results = store._similarity_search("Hello", 2, None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Complete Example
//!
//! For a comprehensive example demonstrating all features including metadata filtering,
//! MMR search, and CRUD operations, run:
//!
//! ```bash
//! cargo run --package dashflow-chroma --example chroma_basic
//! ```
//!
//! See `examples/chroma_basic.rs` for the full source code.
//!
//! # See Also
//!
//! - [`VectorStore`](dashflow::core::vector_stores::VectorStore) - The trait this implements
//! - [`Embeddings`](dashflow::core::embeddings::Embeddings) - Required for generating vectors
//! - [`dashflow-qdrant`](https://docs.rs/dashflow-qdrant) - Alternative: Qdrant vector store with similar API
//! - [`dashflow-pinecone`](https://docs.rs/dashflow-pinecone) - Alternative: Pinecone cloud-native vector store
//! - [Chroma Documentation](https://docs.trychroma.com/) - Official Chroma docs

mod chroma;
mod config_ext;

pub use chroma::ChromaVectorStore;
pub use config_ext::build_vector_store;
