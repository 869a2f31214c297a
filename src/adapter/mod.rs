//! I/O adapters around the core's consumed and produced data shapes:
//! spreadsheet ingestion, result export, and the HTTP transport.

pub mod excel;
pub mod export;
pub mod http;
