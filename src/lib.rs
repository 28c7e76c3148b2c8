//! SOAP adapter for the CBS subscriber-management backend.
//!
//! Issues subscriber enquiries, basic-info lookups and new-subscriber
//! requests, and turns CBS's XML answers into typed results or classified
//! errors.
//!
//! # Features
//!
//! - Envelope construction with session credentials and serial numbers
//! - Sanitization of CBS's non-conformant XML before parsing
//! - Fault and result-code classification (400 / 500 / 503)
//! - Payment-mode and lifecycle-state normalization
//! - MSISDN list hygiene
//!
//! # Example
//!
//! ```ignore
//! use cbs_adapter::{CbsClient, CbsConfig};
//! use std::sync::Arc;
//!
//! let client = CbsClient::new(Arc::new(CbsConfig::load("config.yaml")?))?;
//! let info = client.enquiry("req-1", "123456789").await?;
//! println!("{} {}", info.state, info.payment_mode);
//! ```

pub mod client;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod msisdn;
pub mod parser;
pub mod response;
pub mod transport;

pub use client::CbsClient;
pub use config::CbsConfig;
pub use domain::{CustomerDetails, LifecycleState, PaymentMode, SubscriberInfo};
pub use error::{CbsError, ClassifiedError, ErrorClass};
