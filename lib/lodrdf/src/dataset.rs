use crate::triple::{GraphName, Quad, Subject, Term};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// An in-memory RDF [dataset](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-dataset)
/// with set semantics over quads.
///
/// The default graph is always present, possibly empty.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Dataset {
    quads: HashSet<Quad>,
}

impl Dataset {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a quad, returning whether it was not already present.
    #[inline]
    pub fn insert(&mut self, quad: Quad) -> bool {
        self.quads.insert(quad)
    }

    #[inline]
    pub fn remove(&mut self, quad: &Quad) -> bool {
        self.quads.remove(quad)
    }

    #[inline]
    pub fn contains(&self, quad: &Quad) -> bool {
        self.quads.contains(quad)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter()
    }

    /// The names of the non-default graphs at least one quad belongs to.
    pub fn graph_names(&self) -> impl Iterator<Item = &GraphName> {
        let mut seen = HashSet::new();
        self.quads
            .iter()
            .map(|q| &q.graph_name)
            .filter(move |name| !name.is_default_graph() && seen.insert(*name))
    }

    /// Iterates the quads of a single graph.
    pub fn graph<'a>(&'a self, name: &'a GraphName) -> impl Iterator<Item = &'a Quad> + 'a {
        self.quads.iter().filter(move |q| q.graph_name == *name)
    }

    /// Checks that both datasets contain the same quads up to blank node relabeling.
    pub fn is_isomorphic_with(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let a: Vec<Quad> = self.iter().cloned().collect();
        let b: Vec<Quad> = other.iter().cloned().collect();
        are_quads_isomorphic(&a, &b)
    }
}

impl Extend<Quad> for Dataset {
    fn extend<I: IntoIterator<Item = Quad>>(&mut self, iter: I) {
        self.quads.extend(iter);
    }
}

impl FromIterator<Quad> for Dataset {
    fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
        Self {
            quads: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Dataset {
    type Item = Quad;
    type IntoIter = std::collections::hash_set::IntoIter<Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Quad;
    type IntoIter = std::collections::hash_set::Iter<'a, Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.iter()
    }
}

impl fmt::Display for Dataset {
    /// Writes the dataset as N-Quads statements, in no particular order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for quad in &self.quads {
            writeln!(f, "{quad} .")?;
        }
        Ok(())
    }
}

/// Quad multiset equality up to blank node relabeling, by iterated signature
/// refinement: every blank node starts with the same signature, then picks up
/// the hashes of the quads it occurs in (tagged with the occurrence position)
/// until the signature multiset stabilizes. Automorphic graphs that this
/// cannot distinguish are treated as isomorphic.
pub(crate) fn are_quads_isomorphic(a: &[Quad], b: &[Quad]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    canonical_hashes(a) == canonical_hashes(b)
}

fn canonical_hashes(quads: &[Quad]) -> Vec<u64> {
    let mut signatures: HashMap<String, u64> = HashMap::new();
    for quad in quads {
        collect_blank_nodes(quad, &mut signatures);
    }

    let max_rounds = signatures.len() + 1;
    for _ in 0..max_rounds {
        let mut next: HashMap<String, u64> = signatures.keys().map(|k| (k.clone(), 0)).collect();
        for quad in quads {
            let quad_hash = hash_quad(quad, &signatures);
            refine_quad(quad, quad_hash, &mut next);
        }
        if next == signatures {
            break;
        }
        signatures = next;
    }

    let mut hashes: Vec<u64> = quads
        .iter()
        .map(|quad| hash_quad(quad, &signatures))
        .collect();
    hashes.sort_unstable();
    hashes
}

fn collect_blank_nodes(quad: &Quad, signatures: &mut HashMap<String, u64>) {
    fn from_subject(subject: &Subject, signatures: &mut HashMap<String, u64>) {
        match subject {
            Subject::BlankNode(node) => {
                signatures.insert(node.as_str().to_owned(), 0);
            }
            Subject::Triple(t) => {
                from_subject(&t.subject, signatures);
                from_term(&t.object, signatures);
            }
            Subject::NamedNode(_) => (),
        }
    }
    fn from_term(term: &Term, signatures: &mut HashMap<String, u64>) {
        match term {
            Term::BlankNode(node) => {
                signatures.insert(node.as_str().to_owned(), 0);
            }
            Term::Triple(t) => {
                from_subject(&t.subject, signatures);
                from_term(&t.object, signatures);
            }
            Term::NamedNode(_) | Term::Literal(_) => (),
        }
    }
    from_subject(&quad.subject, signatures);
    from_term(&quad.object, signatures);
    if let GraphName::BlankNode(node) = &quad.graph_name {
        signatures.insert(node.as_str().to_owned(), 0);
    }
}

fn hash_quad(quad: &Quad, signatures: &HashMap<String, u64>) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_subject(&quad.subject, signatures, &mut hasher);
    quad.predicate.as_str().hash(&mut hasher);
    hash_term(&quad.object, signatures, &mut hasher);
    match &quad.graph_name {
        GraphName::NamedNode(node) => {
            2u8.hash(&mut hasher);
            node.as_str().hash(&mut hasher);
        }
        GraphName::BlankNode(node) => {
            1u8.hash(&mut hasher);
            signatures.get(node.as_str()).copied().unwrap_or(0).hash(&mut hasher);
        }
        GraphName::DefaultGraph => 0u8.hash(&mut hasher),
    }
    hasher.finish()
}

fn hash_subject(subject: &Subject, signatures: &HashMap<String, u64>, hasher: &mut DefaultHasher) {
    match subject {
        Subject::NamedNode(node) => {
            2u8.hash(hasher);
            node.as_str().hash(hasher);
        }
        Subject::BlankNode(node) => {
            1u8.hash(hasher);
            signatures.get(node.as_str()).copied().unwrap_or(0).hash(hasher);
        }
        Subject::Triple(t) => {
            3u8.hash(hasher);
            hash_subject(&t.subject, signatures, hasher);
            t.predicate.as_str().hash(hasher);
            hash_term(&t.object, signatures, hasher);
        }
    }
}

fn hash_term(term: &Term, signatures: &HashMap<String, u64>, hasher: &mut DefaultHasher) {
    match term {
        Term::NamedNode(node) => {
            2u8.hash(hasher);
            node.as_str().hash(hasher);
        }
        Term::BlankNode(node) => {
            1u8.hash(hasher);
            signatures.get(node.as_str()).copied().unwrap_or(0).hash(hasher);
        }
        Term::Literal(literal) => {
            4u8.hash(hasher);
            literal.to_string().hash(hasher);
        }
        Term::Triple(t) => {
            3u8.hash(hasher);
            hash_subject(&t.subject, signatures, hasher);
            t.predicate.as_str().hash(hasher);
            hash_term(&t.object, signatures, hasher);
        }
    }
}

fn refine_quad(quad: &Quad, quad_hash: u64, next: &mut HashMap<String, u64>) {
    fn bump(next: &mut HashMap<String, u64>, id: &str, quad_hash: u64, position: u32) {
        let mut hasher = DefaultHasher::new();
        quad_hash.hash(&mut hasher);
        position.hash(&mut hasher);
        let contribution = hasher.finish();
        if let Some(signature) = next.get_mut(id) {
            // Commutative so that quad iteration order does not matter
            *signature = signature.wrapping_add(contribution);
        }
    }
    fn from_subject(subject: &Subject, quad_hash: u64, position: u32, next: &mut HashMap<String, u64>) {
        match subject {
            Subject::BlankNode(node) => bump(next, node.as_str(), quad_hash, position),
            Subject::Triple(t) => {
                from_subject(&t.subject, quad_hash, position.wrapping_mul(3).wrapping_add(10), next);
                from_term(&t.object, quad_hash, position.wrapping_mul(3).wrapping_add(20), next);
            }
            Subject::NamedNode(_) => (),
        }
    }
    fn from_term(term: &Term, quad_hash: u64, position: u32, next: &mut HashMap<String, u64>) {
        match term {
            Term::BlankNode(node) => bump(next, node.as_str(), quad_hash, position),
            Term::Triple(t) => {
                from_subject(&t.subject, quad_hash, position.wrapping_mul(3).wrapping_add(10), next);
                from_term(&t.object, quad_hash, position.wrapping_mul(3).wrapping_add(20), next);
            }
            Term::NamedNode(_) | Term::Literal(_) => (),
        }
    }
    from_subject(&quad.subject, quad_hash, 0, next);
    from_term(&quad.object, quad_hash, 1, next);
    if let GraphName::BlankNode(node) = &quad.graph_name {
        bump(next, node.as_str(), quad_hash, 2);
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
    fn graph_partitioning() {
        let mut dataset = Dataset::new();
        let g = GraphName::NamedNode(named("g"));
        dataset.insert(Quad::new(named("s"), named("p"), named("o"), g.clone()));
        dataset.insert(Quad::new(
            named("s"),
            named("p"),
            named("o"),
            GraphName::DefaultGraph,
        ));
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.graph_names().count(), 1);
        assert_eq!(dataset.graph(&g).count(), 1);
    }

    #[test]
    fn isomorphism_covers_graph_names() {
        let mut a = Dataset::new();
        let mut b = Dataset::new();
        a.insert(Quad::new(
            named("s"),
            named("p"),
            named("o"),
            BlankNode::new_unchecked("g1"),
        ));
        b.insert(Quad::new(
            named("s"),
            named("p"),
            named("o"),
            BlankNode::new_unchecked("g2"),
        ));
        assert!(a.is_isomorphic_with(&b));
    }
}
