//! Finds the AMIs of an account that are still in use.
//!
//! Instances, launch configurations and launch templates of autoscaling
//! groups (including groups scaled to zero) each pin images. The
//! [`UsageCollector`] unions them into a [`ProtectedImageSet`] which a cleanup
//! stage subtracts from the [`ImageInventory`].

pub mod autoscaling;
pub mod aws_config;
pub mod client;
pub mod collector;
pub mod ec2;
pub mod error;
pub mod model;
pub mod probes;

pub use client::{AwsCloud, CloudCall, CloudQuery, QueryError};
pub use collector::{ImageInventory, UsageCollector};
pub use error::{Error, Result};
pub use model::{ImageId, ProtectedImageSet};
pub use probes::Probe;
