// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Member liveness monitor for centralized groups.
//!
//! Every interval the provider pings each other member. A member that
//! misses `max_num_timeouts` pings in a row is removed from the view.

use std::collections::HashMap;
use std::sync::Arc;

use flock_core::Member;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::backend::{GroupBackend, Mutation};
use crate::config::PingSettings;
use crate::errors::FlockError;
use crate::network::{Address, RpcClient};
use crate::persistence::BootstrapStore;
use crate::provider::commit;

pub(crate) struct MonitorContext {
    pub self_member: Member,
    pub backend: Arc<dyn GroupBackend>,
    pub store: Option<Arc<BootstrapStore>>,
    pub rpc: RpcClient,
    pub settings: PingSettings,
}

pub(crate) fn spawn_monitor(ctx: MonitorContext) -> JoinHandle<()> {
    tokio::spawn(run_monitor(ctx))
}

async fn run_monitor(ctx: MonitorContext) {
    let mut interval = tokio::time::interval(ctx.settings.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;

    let mut misses: HashMap<Member, u32> = HashMap::new();

    loop {
        interval.tick().await;

        let view = ctx.backend.snapshot();
        let targets: Vec<Member> = view
            .members()
            .filter(|m| **m != ctx.self_member)
            .cloned()
            .collect();
        misses.retain(|m, _| targets.contains(m));

        let probes = targets.iter().map(|m| probe(&ctx, m));
        let results = join_all(probes).await;

        for (member, alive) in targets.into_iter().zip(results) {
            if alive {
                misses.remove(&member);
                continue;
            }

            let count = {
                let entry = misses.entry(member.clone()).or_insert(0);
                *entry += 1;
                *entry
            };
            tracing::warn!(
                "Member {} missed ping ({}/{})",
                member,
                count,
                ctx.settings.max_num_timeouts
            );
            if count < ctx.settings.max_num_timeouts {
                continue;
            }

            misses.remove(&member);
            let leave = Mutation::Leave(member.clone());
            let provider_id = ctx.self_member.provider_id;
            match commit(provider_id, ctx.backend.as_ref(), ctx.store.as_deref(), leave).await {
                Ok(outcome) => {
                    metrics::increment_counter!("flock_monitor_evictions_total");
                    tracing::warn!(
                        "Removed unresponsive member {} (view version {})",
                        member,
                        outcome.version
                    );
                }
                // Someone else removed it first.
                Err(FlockError::MemberNotFound(_)) => {}
                Err(e) => tracing::error!("Failed to remove member {}: {}", member, e),
            }
        }
    }
}

async fn probe(ctx: &MonitorContext, member: &Member) -> bool {
    let addr = match Address::parse(&member.address) {
        Ok(addr) => addr,
        Err(e) => {
            tracing::debug!("Cannot ping {}: {}", member, e);
            return false;
        }
    };
    match ctx.rpc.ping(&addr, member.provider_id, ctx.settings.timeout).await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Ping to {} failed: {}", member, e);
            false
        }
    }
}
