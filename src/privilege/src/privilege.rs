//! Privileges and the privilege algebra
//!
//! A privilege pairs a [`PrivilegeName`] with the automaton of every string
//! it authorizes (index names, action names, user names). The algebra is
//! written once, generic over a [`PrivilegeDomain`], so privileges from
//! unrelated domains share it without ever being mixed.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use cretoai_automaton::{algebra, Automaton, MatchPredicate};
use once_cell::sync::OnceCell;

use crate::error::Result;
use crate::name::PrivilegeName;

/// Capabilities a privilege domain supplies to the shared algebra
///
/// Implemented by uninhabited marker types, one per domain.
pub trait PrivilegeDomain: Sized + Send + Sync + 'static {
    /// Domain label used in logs and error messages
    const KIND: &'static str;

    /// The privilege granting nothing
    fn none() -> Privilege<Self>;

    /// Builds a privilege of this domain
    fn create(name: PrivilegeName, automaton: Automaton) -> Privilege<Self> {
        Privilege::new(name, automaton)
    }
}

struct Inner {
    name: PrivilegeName,
    automaton: Automaton,
    predicate: OnceCell<MatchPredicate>,
}

/// An immutable named privilege of domain `D`
///
/// Cloning is cheap. Equality and hashing use the name only; use
/// [`implies`](Self::implies) and [`is_alias`](Self::is_alias) to compare
/// what two privileges actually grant.
pub struct Privilege<D> {
    inner: Arc<Inner>,
    _domain: PhantomData<fn() -> D>,
}

impl<D: PrivilegeDomain> Privilege<D> {
    pub fn new(name: PrivilegeName, automaton: Automaton) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                automaton,
                predicate: OnceCell::new(),
            }),
            _domain: PhantomData,
        }
    }

    pub fn name(&self) -> &PrivilegeName {
        &self.inner.name
    }

    pub fn automaton(&self) -> &Automaton {
        &self.inner.automaton
    }

    /// Match predicate for authorization checks, built on first use
    pub fn predicate(&self) -> &MatchPredicate {
        self.inner
            .predicate
            .get_or_init(|| MatchPredicate::new(&self.inner.automaton))
    }

    /// True if everything `other` grants is also granted by `self`
    pub fn implies(&self, other: &Self) -> bool {
        algebra::subset_of(other.automaton(), self.automaton())
    }

    /// True if both privileges grant exactly the same strings
    pub fn is_alias(&self, other: &Self) -> bool {
        self.implies(other) && other.implies(self)
    }

    /// Privilege granting what either grants
    ///
    /// Returns one of the operands unchanged when it already implies the
    /// other.
    pub fn plus(&self, other: &Self) -> Result<Self> {
        if other.implies(self) {
            return Ok(other.clone());
        }
        if self.implies(other) {
            return Ok(self.clone());
        }

        let automaton = algebra::union_and_determinize(self.automaton(), other.automaton())?;
        Ok(D::create(self.name().add(other.name()), automaton))
    }

    /// Privilege granting what `self` grants minus what `other` grants
    ///
    /// The difference is only computed when `other` is strictly contained in
    /// `self`. When the two merely overlap, `self` is returned unchanged.
    pub fn minus(&self, other: &Self) -> Result<Self> {
        if other.implies(self) {
            return Ok(D::none());
        }
        if *other == D::none() || !self.implies(other) {
            return Ok(self.clone());
        }

        let automaton = algebra::minus_and_determinize(self.automaton(), other.automaton())?;
        Ok(D::create(self.name().remove(other.name()), automaton))
    }
}

impl<D> Clone for Privilege<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _domain: PhantomData,
        }
    }
}

impl<D> PartialEq for Privilege<D> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name
    }
}

impl<D> Eq for Privilege<D> {}

impl<D> Hash for Privilege<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
    }
}

impl<D: PrivilegeDomain> fmt::Debug for Privilege<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Privilege")
            .field("domain", &D::KIND)
            .field("name", &self.inner.name.to_string())
            .field("automaton", &self.inner.automaton)
            .finish()
    }
}

impl<D> fmt::Display for Privilege<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cretoai_automaton::PatternCompiler;
    use once_cell::sync::Lazy;

    enum Test {}

    static NONE: Lazy<Privilege<Test>> =
        Lazy::new(|| Privilege::new(PrivilegeName::none(), Automaton::empty()));

    impl PrivilegeDomain for Test {
        const KIND: &'static str = "test";

        fn none() -> Privilege<Self> {
            NONE.clone()
        }
    }

    fn privilege(name: &str, patterns: &[&str]) -> Privilege<Test> {
        let automaton = PatternCompiler::new().compile_set(patterns).unwrap();
        Privilege::new(PrivilegeName::from(name), automaton)
    }

    #[test]
    fn test_implies() {
        let all = privilege("all", &["index-*"]);
        let prod = privilege("prod", &["index-prod"]);
        assert!(all.implies(&prod));
        assert!(!prod.implies(&all));
        assert!(all.implies(&all));
        assert!(all.implies(&Test::none()));
    }

    #[test]
    fn test_is_alias() {
        let a = privilege("a", &["logs-*"]);
        let b = privilege("b", &["/logs-.*/"]);
        assert!(a.is_alias(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_plus() {
        let logs = privilege("logs", &["logs-*"]);
        let metrics = privilege("metrics", &["metrics-*"]);
        let both = logs.plus(&metrics).unwrap();

        assert_eq!(both.name().to_string(), "logs,metrics");
        assert!(both.predicate().test("logs-app"));
        assert!(both.predicate().test("metrics-app"));
        assert!(!both.predicate().test("traces-app"));
    }

    #[test]
    fn test_plus_returns_implying_operand() {
        let wide = privilege("wide", &["logs-*"]);
        let narrow = privilege("narrow", &["logs-app"]);
        assert_eq!(wide.plus(&narrow).unwrap(), wide);
        assert_eq!(narrow.plus(&wide).unwrap(), wide);
    }

    #[test]
    fn test_minus_contained() {
        let wide = privilege("logs,secure", &["logs-*"]);
        let secure = privilege("secure", &["logs-secure*"]);
        let rest = wide.minus(&secure).unwrap();

        assert_eq!(rest.name().to_string(), "logs");
        assert!(rest.predicate().test("logs-app"));
        assert!(!rest.predicate().test("logs-secure-audit"));
    }

    #[test]
    fn test_minus_identities() {
        let a = privilege("a", &["logs-*"]);
        assert_eq!(a.minus(&a).unwrap(), Test::none());
        assert_eq!(a.minus(&Test::none()).unwrap(), a);
        assert_eq!(a.plus(&Test::none()).unwrap(), a);
        assert_eq!(a.plus(&a).unwrap(), a);
    }

    #[test]
    fn test_equality_is_by_name() {
        let a = privilege("read", &["a*"]);
        let b = privilege("read", &["b*"]);
        assert_eq!(a, b);
        assert!(!a.is_alias(&b));
    }

    #[test]
    fn test_predicate_is_built_once() {
        let a = privilege("a", &["x*"]);
        let first = a.predicate() as *const MatchPredicate;
        let clone = a.clone();
        let second = clone.predicate() as *const MatchPredicate;
        assert_eq!(first, second);
    }
}
