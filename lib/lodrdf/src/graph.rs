use crate::dataset::are_quads_isomorphic;
use crate::triple::{Quad, Triple};
use std::collections::HashSet;
use std::fmt;

/// An in-memory RDF [graph](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-graph)
/// with set semantics: inserting a triple twice keeps a single copy.
///
/// ```
/// use lodrdf::{Graph, NamedNode, Triple};
///
/// let mut graph = Graph::new();
/// let triple = Triple::new(
///     NamedNode::new_unchecked("http://example.com/s"),
///     NamedNode::new_unchecked("http://example.com/p"),
///     NamedNode::new_unchecked("http://example.com/o"),
/// );
/// graph.insert(triple.clone());
/// graph.insert(triple);
/// assert_eq!(graph.len(), 1);
/// ```
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Graph {
    triples: HashSet<Triple>,
}

impl Graph {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a triple, returning whether it was not already present.
    #[inline]
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    #[inline]
    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    #[inline]
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Checks that both graphs contain the same triples up to blank node relabeling.
    ///
    /// Blank node matching is done by iterated signature refinement, which is
    /// what round-trip tests need; it is not a full graph-canonicalization.
    pub fn is_isomorphic_with(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let a: Vec<Quad> = self.iter().cloned().map(Quad::from).collect();
        let b: Vec<Quad> = other.iter().cloned().map(Quad::from).collect();
        are_quads_isomorphic(&a, &b)
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::collections::hash_set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::hash_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl fmt::Display for Graph {
    /// Writes the graph as N-Triples statements, in no particular order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for triple in &self.triples {
            writeln!(f, "{triple} .")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlankNode, NamedNode};

    fn named(suffix: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{suffix}"))
    }

    #[test]
    fn duplicates_collapse() {
        let mut graph = Graph::new();
        let t = Triple::new(named("s"), named("p"), named("o"));
        assert!(graph.insert(t.clone()));
        assert!(!graph.insert(t));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn isomorphic_up_to_blank_node_renaming() {
        let mut a = Graph::new();
        let mut b = Graph::new();
        let b1 = BlankNode::new_unchecked("x");
        let b2 = BlankNode::new_unchecked("y");
        a.insert(Triple::new(b1.clone(), named("p"), named("o")));
        a.insert(Triple::new(b1, named("q"), named("o2")));
        b.insert(Triple::new(b2.clone(), named("p"), named("o")));
        b.insert(Triple::new(b2, named("q"), named("o2")));
        assert!(a.is_isomorphic_with(&b));
    }

    #[test]
    fn not_isomorphic_when_blank_node_split() {
        let mut a = Graph::new();
        let mut b = Graph::new();
        let shared = BlankNode::new_unchecked("x");
        a.insert(Triple::new(shared.clone(), named("p"), named("o")));
        a.insert(Triple::new(shared, named("q"), named("o2")));
        b.insert(Triple::new(BlankNode::new_unchecked("y"), named("p"), named("o")));
        b.insert(Triple::new(BlankNode::new_unchecked("z"), named("q"), named("o2")));
        assert!(!a.is_isomorphic_with(&b));
    }
}
