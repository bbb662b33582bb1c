/// Species-complex detection over sequence clusters
///
/// Labels that share a sequence cluster form a complex group. Groups are
/// linked into a label graph, clustered with the same primitive as the
/// sequences, and every merged complex keeps only its best-supported label.
use crate::bio::labels::ClassTable;
use crate::core::clusterer::{cluster_points, Cluster, Point};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Distinct labels inside one sequence cluster, with member counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterComposition {
    pub cluster_id: usize,
    /// First-seen order
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

impl ClusterComposition {
    pub fn of(cluster: &Cluster, classes: &ClassTable) -> Self {
        let mut tally: IndexMap<&str, usize> = IndexMap::new();
        for member in &cluster.members {
            *tally.entry(classes.label_of(member)).or_insert(0) += 1;
        }

        Self {
            cluster_id: cluster.id,
            labels: tally.keys().map(|label| label.to_string()).collect(),
            counts: tally.values().copied().collect(),
        }
    }

    /// Majority label, the earliest one on ties
    pub fn predicted(&self) -> &str {
        let mut best: Option<(usize, usize)> = None;
        for (index, &count) in self.counts.iter().enumerate() {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((index, count));
            }
        }
        best.map_or("", |(index, _)| self.labels[index].as_str())
    }

    pub fn is_complex(&self) -> bool {
        self.labels.len() > 1
    }
}

pub fn compositions(clusters: &[Cluster], classes: &ClassTable) -> Vec<ClusterComposition> {
    clusters
        .iter()
        .map(|cluster| ClusterComposition::of(cluster, classes))
        .collect()
}

/// Labels of `groups` merged through shared membership.
///
/// Two labels are linked when they appear in the same group; components of
/// that graph are the merged complexes, in first-seen order.
pub fn merge_complexes(groups: &[Vec<String>]) -> Vec<Cluster> {
    let mut adjacency: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
    for group in groups {
        for label in group {
            let neighbors = adjacency.entry(label.as_str()).or_default();
            for other in group {
                if other != label {
                    neighbors.insert(other.as_str());
                }
            }
        }
    }

    let points = adjacency
        .into_iter()
        .map(|(label, neighbors)| {
            let point = Point::<()>::new(label, neighbors.into_iter().map(str::to_string).collect());
            (label.to_string(), point)
        })
        .collect();

    cluster_points(points)
}

/// Labels to drop: every label of a merged complex except the one with the
/// most sequences in `classes` (the first such label on ties).
///
/// The empty label takes part only when the label file assigns it; for
/// sequences the file does not cover it carries no support and is skipped.
pub fn resolve_complexes(compositions: &[ClusterComposition], classes: &ClassTable) -> IndexSet<String> {
    let groups: Vec<Vec<String>> = compositions
        .iter()
        .map(|composition| {
            composition
                .labels
                .iter()
                .filter(|label| !label.is_empty() || classes.support(label) > 0)
                .cloned()
                .collect()
        })
        .collect();

    let mut removed = IndexSet::new();
    for complex in merge_complexes(&groups) {
        let mut keep: Option<(&str, usize)> = None;
        for label in &complex.members {
            let support = classes.support(label);
            if keep.map_or(true, |(_, best)| support > best) {
                keep = Some((label.as_str(), support));
            }
        }

        let Some((kept, _)) = keep else {
            continue;
        };
        for label in &complex.members {
            if label != kept {
                removed.insert(label.clone());
            }
        }
    }

    removed
}
