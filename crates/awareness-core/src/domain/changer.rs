//! StateChanger model: what a handler hands back to the engine.
//!
//! A handler never touches the store. It returns a [`HandlerResult`] made of
//! zero or more [`StateChanger`]s, and the engine decides how and when each one
//! becomes a mutation.

use std::fmt;
use std::future::{Future, IntoFuture};

use futures::future::BoxFuture;

use super::errors::HandlerFailure;
use super::state::{Delta, State};

type TransformFn = dyn FnOnce(&State) -> Result<Delta, HandlerFailure> + Send;

/// A function from the state at application time to a [`Delta`].
///
/// Must be pure. The store may hold its lock while a transform runs, so a
/// transform that invokes an entry point can deadlock.
pub struct Transform(Box<TransformFn>);

impl Transform {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&State) -> Result<Delta, HandlerFailure> + Send + 'static,
    {
        Self(Box::new(f))
    }

    pub fn infallible<F>(f: F) -> Self
    where
        F: FnOnce(&State) -> Delta + Send + 'static,
    {
        Self::new(move |previous| Ok(f(previous)))
    }

    pub fn apply(self, previous: &State) -> Result<Delta, HandlerFailure> {
        (self.0)(previous)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

/// An asynchronous value that eventually yields another changer, or nothing.
pub struct Deferred(BoxFuture<'static, Result<Option<StateChanger>, HandlerFailure>>);

impl Deferred {
    pub fn new<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Result<Option<StateChanger>, HandlerFailure>> + Send + 'static,
    {
        Self(Box::pin(fut))
    }
}

impl IntoFuture for Deferred {
    type Output = Result<Option<StateChanger>, HandlerFailure>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        self.0
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

/// One pull from a [`StepSource`].
#[derive(Debug)]
pub enum Step {
    /// The source has more steps; this one's changer.
    Yielded(StateChanger),
    /// The source is exhausted; its final changer, if any.
    Complete(Option<StateChanger>),
}

/// A lazily pulled, ordered sequence of changers.
///
/// Returning `Err` from `next_step` is a source failure. It is not routed to
/// an error slot; see `SequenceDriver`.
pub trait StepSource: Send {
    fn next_step(&mut self) -> Result<Step, HandlerFailure>;
}

/// Adapts an iterator of `Result<StateChanger, _>` into a [`StepSource`].
///
/// Exhaustion completes with no final changer.
pub struct IterSteps<I> {
    inner: I,
}

impl<I> IterSteps<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I> StepSource for IterSteps<I>
where
    I: Iterator<Item = Result<StateChanger, HandlerFailure>> + Send,
{
    fn next_step(&mut self) -> Result<Step, HandlerFailure> {
        match self.inner.next() {
            Some(Ok(changer)) => Ok(Step::Yielded(changer)),
            Some(Err(failure)) => Err(failure),
            None => Ok(Step::Complete(None)),
        }
    }
}

/// Boxed step source carried by [`StateChanger::Stepwise`].
pub struct Stepwise(Box<dyn StepSource>);

impl Stepwise {
    pub fn new(source: impl StepSource + 'static) -> Self {
        Self(Box::new(source))
    }

    pub fn next_step(&mut self) -> Result<Step, HandlerFailure> {
        self.0.next_step()
    }
}

impl fmt::Debug for Stepwise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Stepwise(..)")
    }
}

/// How a handler asks for state to change.
#[derive(Debug)]
pub enum StateChanger {
    Delta(Delta),
    Transform(Transform),
    Deferred(Deferred),
    Stepwise(Stepwise),
}

impl StateChanger {
    pub fn transform<F>(f: F) -> Self
    where
        F: FnOnce(&State) -> Delta + Send + 'static,
    {
        Self::Transform(Transform::infallible(f))
    }

    pub fn try_transform<F>(f: F) -> Self
    where
        F: FnOnce(&State) -> Result<Delta, HandlerFailure> + Send + 'static,
    {
        Self::Transform(Transform::new(f))
    }

    pub fn deferred<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Result<Option<StateChanger>, HandlerFailure>> + Send + 'static,
    {
        Self::Deferred(Deferred::new(fut))
    }

    /// Each item becomes one step, applied in order with frame pacing.
    pub fn steps<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = StateChanger>,
        I::IntoIter: Send + 'static,
    {
        Self::try_steps(steps.into_iter().map(Ok::<StateChanger, HandlerFailure>))
    }

    /// Like [`StateChanger::steps`]; an `Err` item fails the source itself.
    pub fn try_steps<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = Result<StateChanger, HandlerFailure>>,
        I::IntoIter: Send + 'static,
    {
        Self::Stepwise(Stepwise::new(IterSteps::new(steps.into_iter())))
    }

    pub fn stepwise(source: impl StepSource + 'static) -> Self {
        Self::Stepwise(Stepwise::new(source))
    }

    pub fn kind(&self) -> ChangerKind {
        match self {
            StateChanger::Delta(_) => ChangerKind::Delta,
            StateChanger::Transform(_) => ChangerKind::Transform,
            StateChanger::Deferred(_) => ChangerKind::Deferred,
            StateChanger::Stepwise(_) => ChangerKind::Stepwise,
        }
    }
}

impl From<Delta> for StateChanger {
    fn from(delta: Delta) -> Self {
        StateChanger::Delta(delta)
    }
}

/// Variant tag, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangerKind {
    Delta,
    Transform,
    Deferred,
    Stepwise,
}

impl fmt::Display for ChangerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangerKind::Delta => "delta",
            ChangerKind::Transform => "transform",
            ChangerKind::Deferred => "deferred",
            ChangerKind::Stepwise => "stepwise",
        };
        f.write_str(s)
    }
}

/// What a handler returns: nothing, one changer, or several.
///
/// Several changers are resolved independently. Their relative order is not
/// guaranteed once any of them suspends, so sibling changers must not depend
/// on each other's effects.
#[derive(Debug, Default)]
pub enum HandlerResult {
    #[default]
    Nothing,
    One(StateChanger),
    Many(Vec<StateChanger>),
}

impl HandlerResult {
    pub fn into_changers(self) -> Vec<StateChanger> {
        match self {
            HandlerResult::Nothing => Vec::new(),
            HandlerResult::One(changer) => vec![changer],
            HandlerResult::Many(changers) => changers,
        }
    }
}

impl From<()> for HandlerResult {
    fn from(_: ()) -> Self {
        HandlerResult::Nothing
    }
}

impl From<Delta> for HandlerResult {
    fn from(delta: Delta) -> Self {
        HandlerResult::One(StateChanger::Delta(delta))
    }
}

impl From<StateChanger> for HandlerResult {
    fn from(changer: StateChanger) -> Self {
        HandlerResult::One(changer)
    }
}

impl From<Option<StateChanger>> for HandlerResult {
    fn from(changer: Option<StateChanger>) -> Self {
        changer.map_or(HandlerResult::Nothing, HandlerResult::One)
    }
}

impl From<Vec<StateChanger>> for HandlerResult {
    fn from(changers: Vec<StateChanger>) -> Self {
        HandlerResult::Many(changers)
    }
}
