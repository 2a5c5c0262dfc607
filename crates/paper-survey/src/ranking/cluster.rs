//! Duplicate clustering over fuzzy title similarity.
//!
//! Pairs above the threshold are unioned, so `A~B` and `B~C` collapse into one
//! cluster even when `A` and `C` are dissimilar. Output depends only on the
//! input order, never on hash iteration.

use std::collections::HashMap;

use tracing::debug;

use super::similarity::{key_similarity, sorted_token_key};
use crate::models::Paper;

/// Disjoint-set forest with path compression and union by rank.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// `n` singleton sets.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { parent: (0..n).collect(), rank: vec![0; n] }
    }

    /// Representative of `x`'s set.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge the sets containing `a` and `b`.
    pub fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Group indices of `papers` into logical-paper clusters.
///
/// Clusters are ordered by their first member, members by input position.
#[must_use]
pub fn cluster_duplicates(papers: &[Paper], threshold: f64) -> Vec<Vec<usize>> {
    let mut sets = UnionFind::new(papers.len());

    let mut first_by_id: HashMap<&str, usize> = HashMap::with_capacity(papers.len());
    for (i, paper) in papers.iter().enumerate() {
        if let Some(&j) = first_by_id.get(paper.id.as_str()) {
            sets.union(j, i);
        } else {
            first_by_id.insert(&paper.id, i);
        }
    }

    let keys: Vec<String> = papers.iter().map(|p| sorted_token_key(&p.title)).collect();
    for i in 0..papers.len() {
        for j in (i + 1)..papers.len() {
            let similarity = key_similarity(&keys[i], &keys[j]);
            if similarity >= threshold {
                debug!(
                    a = %papers[i].id,
                    b = %papers[j].id,
                    similarity,
                    "Fuzzy duplicate"
                );
                sets.union(i, j);
            }
        }
    }

    let mut slot_by_root: HashMap<usize, usize> = HashMap::new();
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    for i in 0..papers.len() {
        let root = sets.find(i);
        let slot = *slot_by_root.entry(root).or_insert_with(|| {
            clusters.push(Vec::new());
            clusters.len() - 1
        });
        clusters[slot].push(i);
    }
    clusters
}

/// Pick the record that stands for a cluster.
///
/// Prefers a PDF link, then more citations, then the earliest record.
#[must_use]
pub fn choose_representative(papers: &[Paper], members: &[usize]) -> usize {
    let mut best = members[0];
    for &i in &members[1..] {
        let (candidate, current) = (&papers[i], &papers[best]);
        let better = (candidate.has_pdf(), candidate.citations())
            > (current.has_pdf(), current.citations());
        if better {
            best = i;
        }
    }
    best
}

/// Collapse duplicates, keeping one representative per logical paper.
#[must_use]
pub fn deduplicate(papers: &[Paper], threshold: f64) -> Vec<Paper> {
    cluster_duplicates(papers, threshold)
        .iter()
        .map(|members| papers[choose_representative(papers, members)].clone())
        .collect()
}
