//! # Docdex
//!
//! A local-first document ingestion and lexical retrieval core for chat
//! applications.
//!
//! Docdex accepts uploaded files (plain text, Markdown, PDF, Word), extracts
//! their text, splits it into bounded-size retrievable chunks, persists
//! documents and chunks in an embedded SQLite database, and ranks chunks
//! against a query with a lexical relevance score. The ranked hits are what
//! a chat layer prepends to a model prompt for retrieval-augmented
//! generation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌─────────┐   ┌────────┐
//! │  Upload  │──▶│ Extractor │──▶│ Chunker │──▶│ SQLite │
//! │ txt md   │   │ pdf/docx  │   │ 500-char│   │ store  │
//! │ pdf docx │   │ delegated │   │ budget  │   └───┬────┘
//! └──────────┘   └───────────┘   └─────────┘       │
//!                                                  ▼
//!                               ┌──────────┐   ┌──────────┐
//!                               │  Lexical │◀──│ Retrieval│
//!                               │  scorer  │   │  façade  │
//!                               └──────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docdex init                       # create database
//! docdex add notes.md               # ingest a file
//! docdex search "deployment steps"  # ranked chunk retrieval
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Structured error taxonomy |
//! | [`extract`] | Multi-format text extraction |
//! | [`chunk`] | Paragraph-boundary chunking |
//! | [`store`] | SQLite document persistence |
//! | [`score`] | Lexical relevance scoring |
//! | [`search`] | Cross-document retrieval façade |

pub mod chunk;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod score;
pub mod search;
pub mod store;
