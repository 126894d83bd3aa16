use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{ interval_at, Instant, MissedTickBehavior };

use super::ChatSession;
use crate::models::chat::ChatMessage;

pub const FUN_FACT_INTERVAL: Duration = Duration::from_secs(300);

pub const FUN_FACTS: [&str; 4] = [
    "Every minute, an area of forest equivalent to 20 football fields is lost worldwide.",
    "Mangroves sequester carbon much faster per area than many other forests.",
    "A single mature tree can absorb ~22 kg CO₂ per year (varies by species).",
    "Reforestation helps stabilize local rainfall and reduces erosion.",
];

/// The `n`th fun fact, wrapping around the pool.
pub fn fun_fact_message(n: usize) -> ChatMessage {
    let fact = FUN_FACTS[n % FUN_FACTS.len()];
    ChatMessage::assistant(format!("🌿 Fun fact: {}", fact))
}

/// Appends a rotating fun fact every `period`, first one after one full
/// period. Runs until the handle is aborted.
pub fn spawn_fun_facts(session: Arc<ChatSession>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut n = 0usize;
        loop {
            ticker.tick().await;
            debug!("Session {}: posting fun fact #{}", session.id(), n);
            session.conversation().append(fun_fact_message(n));
            n = n.wrapping_add(1);
        }
    })
}
