//! AND/OR over [`Expr`], closed over the literal / conjunction /
//! disjunction shapes.
//!
//! OR concatenates conjunction lists. AND distributes over OR; a chain of
//! `k` ANDed disjunctions of `n` conjunctions each yields `n^k`
//! conjunctions. Nothing is deduplicated or simplified.

use std::ops::{Add, Mul};

use log::debug;

use crate::types::{Conjunction, Disjunction, Expr};

impl Expr {
    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        self * other
    }

    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        self + other
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        let mut conjunctions = self.into_disjunction().into_conjunctions();
        conjunctions.extend(rhs.into_disjunction().into_conjunctions());
        Expr::Disjunction(Disjunction::new(conjunctions))
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        match (self, rhs) {
            (Expr::Literal(a), Expr::Literal(b)) => {
                Expr::Conjunction(Conjunction::new(vec![a, b]))
            }
            (Expr::Literal(l), Expr::Conjunction(c)) => Expr::Conjunction(c.prepend(l)),
            (Expr::Conjunction(c), Expr::Literal(l)) => Expr::Conjunction(c.append(l)),
            (Expr::Conjunction(a), Expr::Conjunction(b)) => Expr::Conjunction(a.concat(&b)),
            (Expr::Literal(l), Expr::Disjunction(d)) => {
                Expr::Disjunction(map_conjunctions(d, |c| c.prepend(l.clone())))
            }
            (Expr::Disjunction(d), Expr::Literal(l)) => {
                Expr::Disjunction(map_conjunctions(d, |c| c.append(l.clone())))
            }
            (Expr::Conjunction(c), Expr::Disjunction(d)) => {
                Expr::Disjunction(map_conjunctions(d, |other| c.clone().concat(&other)))
            }
            (Expr::Disjunction(d), Expr::Conjunction(c)) => {
                Expr::Disjunction(map_conjunctions(d, |other| other.concat(&c)))
            }
            (Expr::Disjunction(a), Expr::Disjunction(b)) => Expr::Disjunction(distribute(&a, &b)),
        }
    }
}

fn map_conjunctions(d: Disjunction, f: impl FnMut(Conjunction) -> Conjunction) -> Disjunction {
    Disjunction::new(d.into_conjunctions().into_iter().map(f).collect())
}

/// `(a1 OR a2) AND (b1 OR b2)` → `a1b1 OR a1b2 OR a2b1 OR a2b2`.
///
/// `left` is the outer loop. That order is what makes `(A or B) and (C or D)`
/// come out as `OR[AND[A,C], AND[A,D], AND[B,C], AND[B,D]]`.
fn distribute(left: &Disjunction, right: &Disjunction) -> Disjunction {
    let size = left.len() * right.len();
    debug!(
        "distributing {} x {} conjunctions into {size}",
        left.len(),
        right.len()
    );
    let mut conjunctions = Vec::with_capacity(size);
    for a in left.conjunctions() {
        for b in right.conjunctions() {
            conjunctions.push(a.clone().concat(b));
        }
    }
    Disjunction::new(conjunctions)
}
