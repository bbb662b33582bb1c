mod common;

use common::class_table;
use decomplex::bio::sequence::Sequence;
use decomplex::core::clusterer::{cluster_points, points_by_id, Cluster, Point};
use decomplex::core::complexes::{compositions, resolve_complexes};
use decomplex::core::evaluation::f_measure;
use decomplex::core::graph::build_graph;
use decomplex::core::similarity::{matrix_from_hits, SimilarityMatrix};
use decomplex::tools::traits::AlignmentHit;
use indexmap::IndexMap;
use proptest::prelude::*;
use std::collections::HashSet;

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("s{}", i)).collect()
}

/// Hits between random pairs of `n` sequences
fn hits_strategy(n: usize) -> impl Strategy<Value = Vec<AlignmentHit>> {
    prop::collection::vec(
        (0..n, 0..n, 50.0f64..=100.0, 1usize..600),
        0..40,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(q, s, identity, span)| {
                AlignmentHit::new(format!("s{}", q), format!("s{}", s), identity, 1, 1 + span)
            })
            .collect()
    })
}

fn cluster_at(ids: &[String], matrix: &SimilarityMatrix, threshold: f64) -> Vec<Cluster> {
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let graph = build_graph(&refs, matrix, threshold);
    cluster_points(points_by_id(
        graph
            .into_adjacency()
            .into_iter()
            .map(|(id, n)| Point::<()>::new(id, n.into_iter().collect())),
    ))
}

proptest! {
    #[test]
    fn prop_matrix_is_symmetric_with_unit_diagonal(n in 1usize..12, seed_hits in hits_strategy(12)) {
        let names = ids(n);
        let sequences: Vec<Sequence> = names
            .iter()
            .map(|id| Sequence::new(id.clone(), b"ACGT".to_vec()))
            .collect();
        let matrix = matrix_from_hits(&sequences, &seed_hits, 400);

        for (i, j, score) in matrix.iter() {
            prop_assert_eq!(matrix.get(j, i), Some(score));
            prop_assert!((0.0..=1.0).contains(&score));
        }
        for id in &names {
            prop_assert_eq!(matrix.get(id, id), Some(1.0));
        }
    }

    #[test]
    fn prop_clusters_partition_the_ids(n in 1usize..15, hits in hits_strategy(15), threshold in 0.0f64..=1.0) {
        let names = ids(n);
        let sequences: Vec<Sequence> = names
            .iter()
            .map(|id| Sequence::new(id.clone(), b"ACGT".to_vec()))
            .collect();
        let matrix = matrix_from_hits(&sequences, &hits, 400);
        let clusters = cluster_at(&names, &matrix, threshold);

        let mut seen = HashSet::new();
        for (index, cluster) in clusters.iter().enumerate() {
            prop_assert_eq!(cluster.id, index);
            for member in &cluster.members {
                prop_assert!(seen.insert(member.clone()), "{} in two clusters", member);
            }
        }
        let all: HashSet<String> = names.iter().cloned().collect();
        prop_assert_eq!(seen, all);
    }

    #[test]
    fn prop_higher_threshold_refines_clusters(
        hits in hits_strategy(12),
        low in 0.0f64..=1.0,
        delta in 0.0f64..=0.5,
    ) {
        let names = ids(12);
        let sequences: Vec<Sequence> = names
            .iter()
            .map(|id| Sequence::new(id.clone(), b"ACGT".to_vec()))
            .collect();
        let matrix = matrix_from_hits(&sequences, &hits, 400);

        let coarse = cluster_at(&names, &matrix, low);
        let fine = cluster_at(&names, &matrix, low + delta);
        prop_assert!(fine.len() >= coarse.len());

        let mut home: IndexMap<&str, usize> = IndexMap::new();
        for cluster in &coarse {
            for member in &cluster.members {
                home.insert(member.as_str(), cluster.id);
            }
        }
        for cluster in &fine {
            let owners: HashSet<usize> = cluster.members.iter().map(|m| home[m.as_str()]).collect();
            prop_assert_eq!(owners.len(), 1);
        }
    }

    #[test]
    fn prop_f_measure_is_bounded(
        labels in prop::collection::vec(0usize..4, 1..20),
        hits in hits_strategy(20),
        threshold in 0.0f64..=1.0,
    ) {
        let names = ids(labels.len());
        let sequences: Vec<Sequence> = names
            .iter()
            .map(|id| Sequence::new(id.clone(), b"ACGT".to_vec()))
            .collect();
        let rows: Vec<(String, String)> = names
            .iter()
            .zip(&labels)
            .map(|(id, label)| (id.clone(), format!("sp{}", label)))
            .collect();
        let row_refs: Vec<(&str, &str)> = rows.iter().map(|(i, l)| (i.as_str(), l.as_str())).collect();
        let classes = class_table(&row_refs);

        let matrix = matrix_from_hits(&sequences, &hits, 400);
        let clusters = cluster_at(&names, &matrix, threshold);
        let score = f_measure(classes.groups(), &clusters);
        prop_assert!((0.0..=1.0 + 1e-12).contains(&score));
    }

    #[test]
    fn prop_resolution_is_idempotent(
        labels in prop::collection::vec(0usize..5, 1..20),
        hits in hits_strategy(20),
    ) {
        let names = ids(labels.len());
        let sequences: Vec<Sequence> = names
            .iter()
            .map(|id| Sequence::new(id.clone(), b"ACGT".to_vec()))
            .collect();
        let rows: Vec<(String, String)> = names
            .iter()
            .zip(&labels)
            .map(|(id, label)| (id.clone(), format!("sp{}", label)))
            .collect();
        let row_refs: Vec<(&str, &str)> = rows.iter().map(|(i, l)| (i.as_str(), l.as_str())).collect();
        let classes = class_table(&row_refs);

        let matrix = matrix_from_hits(&sequences, &hits, 400);
        let clusters = cluster_at(&names, &matrix, 0.8);
        let comps = compositions(&clusters, &classes);

        let first = resolve_complexes(&comps, &classes);
        let second = resolve_complexes(&comps, &classes);
        prop_assert_eq!(&first, &second);

        // Only labels that shared a cluster with another label can go
        let mixed: HashSet<&String> = comps
            .iter()
            .filter(|c| c.is_complex())
            .flat_map(|c| c.labels.iter())
            .collect();
        for label in &first {
            prop_assert!(mixed.contains(label));
        }
    }
}

#[test]
fn perfect_partition_scores_one() {
    let classes = class_table(&[("A", "sp1"), ("B", "sp1"), ("C", "sp2"), ("D", "sp2")]);
    let clusters = vec![
        Cluster { id: 0, members: vec!["A".to_string(), "B".to_string()] },
        Cluster { id: 1, members: vec!["C".to_string(), "D".to_string()] },
    ];
    assert_eq!(f_measure(classes.groups(), &clusters), 1.0);
}
