use crate::core::clusterer::Cluster;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Weighted F-measure of `clusters` against ground-truth groups.
///
/// Each group scores its best-matching cluster with
/// `2 |g ∩ c| / (|g| + |c|)`, weighted by group size. An empty ground truth
/// scores 0.
pub fn f_measure(groups: &IndexMap<String, Vec<String>>, clusters: &[Cluster]) -> f64 {
    let mut cluster_of: HashMap<&str, usize> = HashMap::new();
    for (index, cluster) in clusters.iter().enumerate() {
        for member in &cluster.members {
            cluster_of.insert(member.as_str(), index);
        }
    }

    let mut weighted = 0.0;
    let mut total = 0usize;

    for members in groups.values() {
        let mut overlap: HashMap<usize, usize> = HashMap::new();
        for member in members {
            if let Some(&index) = cluster_of.get(member.as_str()) {
                *overlap.entry(index).or_insert(0) += 1;
            }
        }

        // Clusters sharing no member with the group score 0
        let best = overlap
            .iter()
            .map(|(&index, &shared)| {
                2.0 * shared as f64 / (members.len() + clusters[index].len()) as f64
            })
            .fold(0.0, f64::max);

        weighted += members.len() as f64 * best;
        total += members.len();
    }

    if total == 0 {
        0.0
    } else {
        weighted / total as f64
    }
}
