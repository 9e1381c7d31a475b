//! The candidate library.
use crate::{
    learner::Learner,
    screen::{Screen, Screening},
};


/// One (learner, screen) pair of a [`Library`].
#[derive(Debug, Clone)]
pub struct Candidate<L, S = Screening> {
    pub(crate) learner: L,
    pub(crate) screen: S,
    pub(crate) name: String,
}


impl<L: Learner, S: Screen> Candidate<L, S> {
    /// Construct a new candidate.
    /// Its name is `"{learner}_{screen}"`.
    pub fn new(learner: L, screen: S) -> Self {
        let name = format!("{}_{}", learner.name(), screen.name());
        Self { learner, screen, name }
    }
}


impl<L, S> Candidate<L, S> {
    /// Returns the name of this candidate.
    pub fn name(&self) -> &str {
        &self.name
    }


    /// Returns the learner.
    pub fn learner(&self) -> &L {
        &self.learner
    }


    /// Returns the screen.
    pub fn screen(&self) -> &S {
        &self.screen
    }
}


/// An ordered list of candidates.
/// A candidate is identified by its position.
///
/// ```
/// use ministack::prelude::*;
///
/// let library = Library::cross(
///     vec![Algorithm::Mean(MeanLearner), Algorithm::Linear(LinearRegression::new())],
///     vec![Screening::All, Screening::Correlation { top_k: 2 }],
/// );
/// assert_eq!(library.len(), 4);
/// assert_eq!(library.names()[1], "Mean_Corr(top=2)");
/// ```
#[derive(Debug, Clone)]
pub struct Library<L, S = Screening> {
    candidates: Vec<Candidate<L, S>>,
}


impl<L, S> Default for Library<L, S> {
    fn default() -> Self {
        Self { candidates: Vec::new() }
    }
}


impl<L: Learner, S: Screen> Library<L, S> {
    /// Construct an empty library.
    pub fn new() -> Self {
        Self::default()
    }


    /// Append a candidate.
    pub fn push(mut self, learner: L, screen: S) -> Self {
        self.candidates.push(Candidate::new(learner, screen));
        self
    }


    /// Every learner paired with every screen.
    /// Candidates of one learner are adjacent.
    pub fn cross(learners: Vec<L>, screens: Vec<S>) -> Self
        where L: Clone,
              S: Clone,
    {
        let candidates = learners.into_iter()
            .flat_map(|learner| {
                screens.iter()
                    .cloned()
                    .map(move |screen| Candidate::new(learner.clone(), screen))
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { candidates }
    }
}


impl<L: Learner> Library<L, Screening> {
    /// Every learner with [`Screening::All`].
    pub fn from_learners(learners: Vec<L>) -> Self {
        let candidates = learners.into_iter()
            .map(|learner| Candidate::new(learner, Screening::All))
            .collect();
        Self { candidates }
    }
}


impl<L, S> Library<L, S> {
    /// Returns the number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }


    /// Returns `true` if there is no candidate.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }


    /// Returns the candidate names, in order.
    pub fn names(&self) -> Vec<String> {
        self.candidates.iter()
            .map(|c| c.name.clone())
            .collect()
    }


    /// Returns the `j`-th candidate.
    pub fn get(&self, j: usize) -> Option<&Candidate<L, S>> {
        self.candidates.get(j)
    }


    /// Returns the candidates.
    pub fn candidates(&self) -> &[Candidate<L, S>] {
        &self.candidates[..]
    }
}
