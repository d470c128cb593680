//! Connection pool: one channel per endpoint, all-or-nothing lifecycle.

use crate::channel::{Channel, ChannelState};
use crate::error::ClientError;
use tracing::info;

/// The set of channels fronting one cluster.
///
/// A pool is built completely or not at all: if any endpoint cannot be
/// dialed, no pool exists. On reconnect the owning client builds a fresh
/// pool and swaps it in as a whole value; channels are never patched in
/// place.
#[derive(Debug)]
pub struct Pool {
    channels: Vec<Channel>,
}

impl Pool {
    /// Dial every endpoint. Fails with [`ClientError::NoEndpoints`] on an
    /// empty list and with [`ClientError::Dial`] naming every unreachable
    /// endpoint if any dial fails.
    pub async fn connect(endpoints: &[String]) -> Result<Pool, ClientError> {
        if endpoints.is_empty() {
            return Err(ClientError::NoEndpoints);
        }

        let mut channels = Vec::with_capacity(endpoints.len());
        let mut unreachable = Vec::new();
        let mut causes = Vec::new();
        for endpoint in endpoints {
            match Channel::dial(endpoint).await {
                Ok(channel) => channels.push(channel),
                Err(e) => {
                    unreachable.push(endpoint.clone());
                    causes.push(e.to_string());
                }
            }
        }

        if channels.len() != endpoints.len() {
            return Err(ClientError::Dial {
                unreachable,
                reason: causes.join("; "),
            });
        }

        info!("connected to {} dgraph alpha server(s)", channels.len());
        Ok(Pool { channels })
    }

    /// True only if every channel reports a ready transport state.
    pub fn ready(&self) -> bool {
        self.channels
            .iter()
            .all(|c| c.state() == ChannelState::Ready)
    }

    /// Release every channel.
    pub fn close(&mut self) {
        for channel in &mut self.channels {
            channel.close();
        }
    }

    /// Channel for the given rotation index.
    pub fn channel(&self, index: usize) -> &Channel {
        &self.channels[index % self.channels.len()]
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_endpoint_list_is_a_config_error() {
        let err = Pool::connect(&[]).await.unwrap_err();
        assert!(matches!(err, ClientError::NoEndpoints));
    }
}
