use crate::core::similarity::SimilarityMatrix;
use indexmap::{IndexMap, IndexSet};

/// Undirected adjacency derived by thresholding a similarity matrix
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborGraph {
    adjacency: IndexMap<String, IndexSet<String>>,
}

impl NeighborGraph {
    /// A graph over `ids` with no edges yet
    pub fn with_nodes<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            adjacency: ids
                .into_iter()
                .map(|id| (id.to_string(), IndexSet::new()))
                .collect(),
        }
    }

    /// Link `i` and `j` in both directions; repeated links are no-ops
    pub fn link(&mut self, i: &str, j: &str) {
        self.adjacency
            .entry(i.to_string())
            .or_default()
            .insert(j.to_string());
        self.adjacency
            .entry(j.to_string())
            .or_default()
            .insert(i.to_string());
    }

    /// Neighbors of `id` in the order they were linked
    pub fn neighbors(&self, id: &str) -> Option<&IndexSet<String>> {
        self.adjacency.get(id)
    }

    pub fn contains_edge(&self, i: &str, j: &str) -> bool {
        self.adjacency
            .get(i)
            .is_some_and(|neighbors| neighbors.contains(j))
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(IndexSet::len).sum::<usize>() / 2
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.adjacency.iter().map(|(id, n)| (id.as_str(), n))
    }

    pub fn into_adjacency(self) -> IndexMap<String, IndexSet<String>> {
        self.adjacency
    }
}

/// Link every pair of distinct `ids` whose recorded score reaches `threshold`.
///
/// Pairs without a recorded score are never linked, whatever the threshold.
/// Pairs are visited row by row in `ids` order, and within a row in `ids`
/// order, which fixes the order of every neighbor list.
pub fn build_graph(ids: &[&str], matrix: &SimilarityMatrix, threshold: f64) -> NeighborGraph {
    let mut graph = NeighborGraph::with_nodes(ids.iter().copied());
    let position: IndexSet<&str> = ids.iter().copied().collect();

    for &i in ids {
        let Some(row) = matrix.row(i) else {
            continue;
        };

        let mut linked: Vec<(usize, &str)> = row
            .iter()
            .filter(|(j, score)| j.as_str() != i && **score >= threshold)
            .filter_map(|(j, _)| position.get_index_of(j.as_str()).map(|p| (p, j.as_str())))
            .collect();
        linked.sort_unstable_by_key(|(p, _)| *p);

        for (_, j) in linked {
            graph.link(i, j);
        }
    }

    graph
}
