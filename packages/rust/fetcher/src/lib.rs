//! Candidate URL generation and the fetch-and-verify executor.
//!
//! This crate provides:
//! - [`candidates`]: filename derivation and URL guessing from a standard code
//! - [`verify`]: PDF signature and size checks
//! - [`client`]: sequential HTTP executor writing the first verified PDF

pub mod candidates;
pub mod client;
pub mod verify;

pub use candidates::{CandidateSource, TemplateCandidates, code_variants, pdf_filename};
pub use client::{FetchOutcome, PdfFetcher};
pub use verify::{PDF_SIGNATURE, has_pdf_signature, sha256_hex, verify_pdf};
