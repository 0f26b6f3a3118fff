use std::collections::HashMap;

use crate::models::{ClusterId, GenEdCluster};
use crate::services::eligibility::Eligibility;

/// Completed courses required before a cluster counts as satisfied
pub const COURSES_PER_CLUSTER: u32 = 3;

/// Counts each cluster's completed member courses for one student.
pub fn progress(clusters: &[GenEdCluster], eligibility: &Eligibility) -> HashMap<ClusterId, u32> {
    clusters
        .iter()
        .map(|cluster| {
            let completed = cluster
                .courses
                .iter()
                .filter(|course_id| eligibility.has_completed(**course_id))
                .count() as u32;
            (cluster.id, completed)
        })
        .collect()
}

pub fn is_satisfied(completed: u32) -> bool {
    completed >= COURSES_PER_CLUSTER
}

/// Picks the open cluster with the fewest completed courses, considering
/// only clusters for which `has_candidate` finds a recommendable member.
/// Ties go to the earliest cluster in declaration order.
pub fn least_satisfied_open<'a, F>(
    clusters: &'a [GenEdCluster],
    progress: &HashMap<ClusterId, u32>,
    mut has_candidate: F,
) -> Option<&'a GenEdCluster>
where
    F: FnMut(&GenEdCluster) -> bool,
{
    let mut best: Option<(&GenEdCluster, u32)> = None;
    for cluster in clusters {
        let completed = progress.get(&cluster.id).copied().unwrap_or(0);
        if is_satisfied(completed) {
            continue;
        }
        if let Some((_, best_completed)) = best {
            if completed >= best_completed {
                continue;
            }
        }
        if has_candidate(cluster) {
            best = Some((cluster, completed));
        }
    }
    best.map(|(cluster, _)| cluster)
}
