use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::context::AgentContext;
use crate::model::{App, Instance};

use super::error::QueryError;

/// Zone-affinity filtering of the discovery snapshot by app name, VIP, or SVIP.
pub struct QueryEngine;

impl QueryEngine {
    pub fn access_app(ctx: &dyn AgentContext, name: &str) -> Result<App, QueryError> {
        require_discovery(ctx)?;
        let apps = zone_affinity_select(ctx, |app| {
            app.matches_name(name).then(|| app.restricted_to_up()).flatten()
        });
        apps.into_iter()
            .next()
            .ok_or_else(|| QueryError::NoAvailableService(name.to_string()))
    }

    pub fn access_apps_by_vip(ctx: &dyn AgentContext, vip: &str) -> Result<Vec<App>, QueryError> {
        require_discovery(ctx)?;
        let apps = zone_affinity_select(ctx, |app| app.filtered_by_vip(vip));
        if apps.is_empty() {
            return Err(QueryError::NoAvailableService(vip.to_string()));
        }
        Ok(apps)
    }

    pub fn access_apps_by_svip(ctx: &dyn AgentContext, svip: &str) -> Result<Vec<App>, QueryError> {
        require_discovery(ctx)?;
        let apps = zone_affinity_select(ctx, |app| app.filtered_by_svip(svip));
        if apps.is_empty() {
            return Err(QueryError::NoAvailableService(svip.to_string()));
        }
        Ok(apps)
    }

    pub fn access_instances_by_vip(ctx: &dyn AgentContext, vip: &str) -> Result<Vec<Instance>, QueryError> {
        let instances = flatten_instances(Self::access_apps_by_vip(ctx, vip)?);
        if instances.is_empty() {
            return Err(QueryError::NoAvailableInstance(vip.to_string()));
        }
        Ok(instances)
    }

    pub fn access_instances_by_svip(ctx: &dyn AgentContext, svip: &str) -> Result<Vec<Instance>, QueryError> {
        let instances = flatten_instances(Self::access_apps_by_svip(ctx, svip)?);
        if instances.is_empty() {
            return Err(QueryError::NoAvailableInstance(svip.to_string()));
        }
        Ok(instances)
    }

    pub fn access_instance_by_vip(ctx: &dyn AgentContext, vip: &str) -> Result<Instance, QueryError> {
        let instances = Self::access_instances_by_vip(ctx, vip)?;
        Ok(instances
            .choose(&mut thread_rng())
            .expect("non-empty, checked above")
            .defensive_copy())
    }

    pub fn access_instance_by_svip(ctx: &dyn AgentContext, svip: &str) -> Result<Instance, QueryError> {
        let instances = Self::access_instances_by_svip(ctx, svip)?;
        Ok(instances
            .choose(&mut thread_rng())
            .expect("non-empty, checked above")
            .defensive_copy())
    }
}

fn require_discovery(ctx: &dyn AgentContext) -> Result<(), QueryError> {
    if ctx.config().client.discovery_enabled {
        Ok(())
    } else {
        Err(QueryError::FeatureDisabled)
    }
}

fn flatten_instances(apps: Vec<App>) -> Vec<Instance> {
    apps.into_iter().flat_map(|app| app.instances).collect()
}

/// Home zone first, then the remaining zones in a fair random order; first non-empty filtered
/// result wins.
fn zone_affinity_select(
    ctx: &dyn AgentContext,
    filter: impl Fn(&App) -> Option<App>,
) -> Vec<App> {
    let snapshot = ctx.current_snapshot();
    let config = ctx.config();
    let home_zone = &config.client.zone;

    let mut home_attempted = false;
    if config.client.prefer_same_zone_eureka {
        if let Some(apps) = snapshot.zone(home_zone) {
            home_attempted = true;
            let matched = select_in_zone(apps, &filter);
            if !matched.is_empty() {
                return matched;
            }
        }
    }

    let mut remaining: Vec<String> = snapshot
        .zones()
        .filter(|zone| !(home_attempted && *zone == home_zone))
        .cloned()
        .collect();
    remaining.shuffle(&mut thread_rng());

    for zone in remaining {
        if let Some(apps) = snapshot.zone(&zone) {
            let matched = select_in_zone(apps, &filter);
            if !matched.is_empty() {
                return matched;
            }
        }
    }
    Vec::new()
}

fn select_in_zone(apps: &[App], filter: impl Fn(&App) -> Option<App>) -> Vec<App> {
    apps.iter().filter_map(|app| filter(app)).collect()
}
