/// Connected-component clustering over an id -> neighbor-list mapping
///
/// The same primitive clusters sequences and taxon labels. Traversal is an
/// explicit depth-first walk, so component size is not bounded by the call
/// stack.
use indexmap::IndexMap;
use serde::Serialize;

/// A node handed to the clusterer
#[derive(Debug, Clone)]
pub struct Point<P> {
    pub id: String,
    pub visited: bool,
    pub neighbors: Vec<String>,
    pub payload: Option<P>,
}

impl<P> Point<P> {
    pub fn new(id: impl Into<String>, neighbors: Vec<String>) -> Self {
        Self {
            id: id.into(),
            visited: false,
            neighbors,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: P) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub id: usize,
    /// Members in discovery order
    pub members: Vec<String>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Collect points into a map keyed by id, keeping their order
pub fn points_by_id<P, I>(points: I) -> IndexMap<String, Point<P>>
where
    I: IntoIterator<Item = Point<P>>,
{
    points.into_iter().map(|p| (p.id.clone(), p)).collect()
}

/// Partition `points` into connected components.
///
/// Points are seeded in map order; each component is grown depth first in
/// neighbor-list order. Cluster ids count up from 0 in discovery order.
/// Neighbor ids with no point are ignored.
pub fn cluster_points<P>(mut points: IndexMap<String, Point<P>>) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    // (point index, next neighbor to look at)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for seed in 0..points.len() {
        if points[seed].visited {
            continue;
        }
        points[seed].visited = true;
        let mut members = vec![points[seed].id.clone()];
        stack.push((seed, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            if next >= points[node].neighbors.len() {
                stack.pop();
                continue;
            }
            frame.1 += 1;

            let Some(target) = points.get_index_of(points[node].neighbors[next].as_str()) else {
                continue;
            };
            if !points[target].visited {
                points[target].visited = true;
                members.push(points[target].id.clone());
                stack.push((target, 0));
            }
        }

        clusters.push(Cluster {
            id: clusters.len(),
            members,
        });
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn point(id: &str, neighbors: &[&str]) -> Point<()> {
        Point::new(id, neighbors.iter().map(|n| n.to_string()).collect())
    }

    fn members(cluster: &Cluster) -> Vec<&str> {
        cluster.members.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_two_components() {
        let points = points_by_id(vec![
            point("A", &["B"]),
            point("B", &["A"]),
            point("C", &["D"]),
            point("D", &["C"]),
        ]);
        let clusters = cluster_points(points);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].id, 0);
        assert_eq!(members(&clusters[0]), vec!["A", "B"]);
        assert_eq!(clusters[1].id, 1);
        assert_eq!(members(&clusters[1]), vec!["C", "D"]);
    }

    #[test]
    fn test_depth_first_discovery_order() {
        // A's first neighbor B is fully explored before A's second neighbor C
        let points = points_by_id(vec![
            point("A", &["B", "C"]),
            point("B", &["A", "D"]),
            point("C", &["A"]),
            point("D", &["B"]),
        ]);
        let clusters = cluster_points(points);

        assert_eq!(clusters.len(), 1);
        assert_eq!(members(&clusters[0]), vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn test_isolated_points_are_singletons() {
        let points = points_by_id(vec![point("A", &[]), point("B", &[])]);
        let clusters = cluster_points(points);

        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_unknown_neighbors_are_ignored() {
        let points = points_by_id(vec![point("A", &["ghost", "B"]), point("B", &["A"])]);
        let clusters = cluster_points(points);

        assert_eq!(clusters.len(), 1);
        assert_eq!(members(&clusters[0]), vec!["A", "B"]);
    }

    #[test]
    fn test_long_chain_does_not_exhaust_the_stack() {
        let n = 200_000;
        let ids: Vec<String> = (0..n).map(|i| format!("s{}", i)).collect();
        let points = points_by_id((0..n).map(|i| {
            let mut neighbors = Vec::new();
            if i > 0 {
                neighbors.push(ids[i - 1].clone());
            }
            if i + 1 < n {
                neighbors.push(ids[i + 1].clone());
            }
            Point::<()>::new(ids[i].clone(), neighbors)
        }));

        let clusters = cluster_points(points);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), n);
        assert_eq!(clusters[0].members[n - 1], format!("s{}", n - 1));
    }

    #[test]
    fn test_empty_input() {
        let clusters = cluster_points(IndexMap::<String, Point<()>>::new());
        assert!(clusters.is_empty());
    }
}
