//! Authentication module for Azure services
//!
//! This module provides authentication against Azure Active Directory using
//! a chained token credential, with the device-code flow as the guaranteed
//! fallback for environments without ambient credentials.

pub mod device_code;
pub mod provider;

pub use device_code::DeviceCodeCredential;
pub use provider::*;
