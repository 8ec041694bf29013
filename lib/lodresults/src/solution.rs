//! The [`QuerySolution`] row type shared by all the SPARQL results parsers.

use lodrdf::{Term, Variable};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

/// One row of a SPARQL solution sequence: a set of variables with their
/// optional bindings.
///
/// The variable list is shared between all the rows of a given result set.
///
/// ```
/// use lodrdf::{Literal, Variable};
/// use lodresults::QuerySolution;
///
/// let variables = vec![Variable::new("name")?, Variable::new("age")?];
/// let solution = QuerySolution::from((variables, vec![Some(Literal::from("Alice").into()), None]));
/// assert_eq!(solution.get("name"), Some(&Literal::from("Alice").into()));
/// assert_eq!(solution.get(1), None); // ?age is unbound
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct QuerySolution {
    variables: Arc<[Variable]>,
    values: Vec<Option<Term>>,
}

impl QuerySolution {
    /// Returns the value bound at a given position ([`usize`]) or to a given
    /// variable ([`&str`](str) or [`Variable`]), if any.
    ///
    /// ```
    /// use lodrdf::{Literal, Variable};
    /// use lodresults::QuerySolution;
    ///
    /// let variables = vec![Variable::new("name")?, Variable::new("age")?];
    /// let solution =
    ///     QuerySolution::from((variables, vec![Some(Literal::from("Alice").into()), None]));
    /// assert_eq!(solution.get("name"), Some(&Literal::from("Alice").into()));
    /// assert_eq!(solution.get(1), None);
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn get(&self, index: impl VariableSolutionIndex) -> Option<&Term> {
        self.values.get(index.index(self)?)?.as_ref()
    }

    /// The number of columns in the row, bound or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row binds no variable at all.
    ///
    /// ```
    /// use lodrdf::Variable;
    /// use lodresults::QuerySolution;
    ///
    /// let variables = vec![Variable::new("name")?, Variable::new("age")?];
    /// let solution = QuerySolution::from((variables, vec![None, None]));
    /// assert!(solution.is_empty());
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Iterates over the bound variables only, in column order.
    ///
    /// ```
    /// use lodrdf::{Literal, Variable};
    /// use lodresults::QuerySolution;
    ///
    /// let variables = vec![Variable::new("name")?, Variable::new("age")?];
    /// let solution =
    ///     QuerySolution::from((variables, vec![Some(Literal::from("Alice").into()), None]));
    /// let bound = solution.iter().collect::<Vec<_>>();
    /// assert_eq!(bound, vec![(&Variable::new("name")?, &Literal::from("Alice").into())]);
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.into_iter()
    }

    /// The full column contents, unbound columns included.
    #[inline]
    pub fn values(&self) -> &[Option<Term>] {
        &self.values
    }

    /// The variables of the row, in column order, bound or not.
    #[inline]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }
}

impl<V: Into<Arc<[Variable]>>, S: Into<Vec<Option<Term>>>> From<(V, S)> for QuerySolution {
    #[inline]
    fn from((variables, values): (V, S)) -> Self {
        Self {
            variables: variables.into(),
            values: values.into(),
        }
    }
}

impl<'a> IntoIterator for &'a QuerySolution {
    type Item = (&'a Variable, &'a Term);
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        Iter {
            variables: self.variables.iter(),
            values: self.values.iter(),
        }
    }
}

impl Index<usize> for QuerySolution {
    type Output = Term;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        self.get(index)
            .unwrap_or_else(|| panic!("no value for column {index} in this solution"))
    }
}

impl Index<&str> for QuerySolution {
    type Output = Term;

    #[inline]
    fn index(&self, index: &str) -> &Self::Output {
        self.get(index)
            .unwrap_or_else(|| panic!("no value for the variable ?{index} in this solution"))
    }
}

impl Index<&Variable> for QuerySolution {
    type Output = Term;

    #[inline]
    fn index(&self, index: &Variable) -> &Self::Output {
        self.get(index)
            .unwrap_or_else(|| panic!("no value for the variable {index} in this solution"))
    }
}

impl Index<Variable> for QuerySolution {
    type Output = Term;

    #[inline]
    fn index(&self, index: Variable) -> &Self::Output {
        self.index(&index)
    }
}

impl PartialEq for QuerySolution {
    fn eq(&self, other: &Self) -> bool {
        // Two rows are equal when they agree on the bound variables, whatever
        // the column order or the unbound columns.
        self.iter().all(|(k, v)| other.get(k) == Some(v))
            && other.iter().all(|(k, v)| self.get(k) == Some(v))
    }
}

impl Eq for QuerySolution {}

impl fmt::Debug for QuerySolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// An iterator over the bound variables of a [`QuerySolution`].
pub struct Iter<'a> {
    variables: std::slice::Iter<'a, Variable>,
    values: std::slice::Iter<'a, Option<Term>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Variable, &'a Term);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let variable = self.variables.next()?;
            if let Some(value) = self.values.next()? {
                return Some((variable, value));
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.values.size_hint().1)
    }
}

/// A utility trait to get values for a given variable or tuple position.
///
/// See [`QuerySolution::get`].
pub trait VariableSolutionIndex {
    fn index(self, solution: &QuerySolution) -> Option<usize>;
}

impl VariableSolutionIndex for usize {
    #[inline]
    fn index(self, _: &QuerySolution) -> Option<usize> {
        Some(self)
    }
}

impl VariableSolutionIndex for &str {
    #[inline]
    fn index(self, solution: &QuerySolution) -> Option<usize> {
        solution.variables.iter().position(|v| v.as_str() == self)
    }
}

impl VariableSolutionIndex for &Variable {
    #[inline]
    fn index(self, solution: &QuerySolution) -> Option<usize> {
        VariableSolutionIndex::index(self.as_str(), solution)
    }
}

impl VariableSolutionIndex for Variable {
    #[inline]
    fn index(self, solution: &QuerySolution) -> Option<usize> {
        (&self).index(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodrdf::Literal;

    #[test]
    fn get_accepts_positions_names_and_variables() -> Result<(), Box<dyn std::error::Error>> {
        let name = Variable::new("name")?;
        let solution = QuerySolution::from((
            vec![name.clone()],
            vec![Some(Literal::from("Alice").into())],
        ));
        let alice = Term::from(Literal::from("Alice"));
        assert_eq!(solution.get(0), Some(&alice));
        assert_eq!(solution.get("name"), Some(&alice));
        assert_eq!(solution.get(&name), Some(&alice));
        assert_eq!(solution.get(name), Some(&alice));
        Ok(())
    }

    #[test]
    fn equality_ignores_column_order_and_unbound_columns() -> Result<(), Box<dyn std::error::Error>>
    {
        let a = QuerySolution::from((
            vec![Variable::new("x")?, Variable::new("y")?],
            vec![Some(Literal::from("Alice").into()), None],
        ));
        let b = QuerySolution::from((
            vec![Variable::new("y")?, Variable::new("x")?, Variable::new("z")?],
            vec![None, Some(Literal::from("Alice").into()), None],
        ));
        let c = QuerySolution::from((
            vec![Variable::new("x")?],
            vec![Some(Literal::from(2).into())],
        ));
        assert_eq!(a, b);
        assert_ne!(a, c);
        Ok(())
    }
}
