//! Common test utilities
//!
//! ```rust,ignore
//! use crate::common::{BrokerHarness, ScriptedProvider, fixtures};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let primary = ScriptedProvider::new("primary");
//!     let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;
//!     let response = h.broker.process(&fixtures::generation("r1")).await;
//! }
//! ```

pub mod database;
pub mod fixtures;
pub mod observer;
pub mod providers;

pub use database::TestDatabase;
pub use harness::BrokerHarness;
pub use observer::RecordingObserver;
pub use providers::ScriptedProvider;
pub use store::FlakyStore;

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}
