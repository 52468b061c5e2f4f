pub mod email;

use anyhow::Result;
use async_trait::async_trait;

pub use email::{EmailConfig, EmailSender};

/// Delivery channel for a rendered digest.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_digest(&self, subject: &str, text: &str, html: &str) -> Result<()>;

    /// Connectivity/credential check; `Ok(false)` means reachable but refused.
    async fn verify(&self) -> Result<bool>;

    fn name(&self) -> &'static str;
}
