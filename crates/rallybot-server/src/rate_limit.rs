//! Per guild-user command throttling.
//!
//! Each (guild, user) pair keeps a single "theoretical arrival time" (GCRA):
//! every accepted command pushes it one emission interval into the future,
//! and a command is refused once it would sit more than `burst - 1` intervals
//! ahead of now.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rallybot_shared::{GuildId, UserId};
use tokio::sync::Mutex;

/// Sustained rate and burst allowance for one guild user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quota {
    pub per_second: f64,
    pub burst: f64,
}

impl Quota {
    fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.per_second)
    }

    fn tolerance(&self) -> Duration {
        self.interval().mul_f64((self.burst - 1.0).max(0.0))
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    arrivals: Arc<Mutex<HashMap<(GuildId, UserId), Instant>>>,
    quota: Quota,
}

impl RateLimiter {
    pub fn new(quota: Quota) -> Self {
        Self {
            arrivals: Arc::new(Mutex::new(HashMap::new())),
            quota,
        }
    }

    /// Record a command attempt; `false` means the user is over quota.
    pub async fn check(&self, guild_id: GuildId, user_id: UserId) -> bool {
        let now = Instant::now();
        let mut arrivals = self.arrivals.lock().await;
        let tat = arrivals
            .get(&(guild_id, user_id))
            .copied()
            .map_or(now, |t| t.max(now));

        if tat.duration_since(now) > self.quota.tolerance() {
            return false;
        }
        arrivals.insert((guild_id, user_id), tat + self.quota.interval());
        true
    }

    /// Forget users whose allowance has been fully restored for `idle`.
    pub async fn purge_idle(&self, idle: Duration) {
        let now = Instant::now();
        self.arrivals
            .lock()
            .await
            .retain(|_, tat| *tat + idle > now);
    }
}
