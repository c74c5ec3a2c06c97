use std::error::Error as StdError;
use std::marker::PhantomData;

/// Error reporter is any object that can collect errors found by [`Validation`] or
/// [`ContextualValidation`].
///
/// Validation of a [`crate::SedDocument`] descends through models, changes, simulations and
/// outputs, and each level has its own error type. The reporter of a parent level is
/// re-used by the children through [`ErrorReporter::wrap`], which converts child errors
/// into the parent error type on the fly.
pub trait ErrorReporter<E: StdError>: Sized {
    /// Report an error into this [`ErrorReporter`].
    fn report<E2: Into<E>>(&mut self, error: E2);

    /// Wrap a mutable reference to this [`ErrorReporter`] into a [`ReporterWrapper`]
    /// which automatically performs type conversions from `E2`.
    fn wrap<E2: StdError + Into<E>>(&mut self) -> ReporterWrapper<'_, E2, E, Self> {
        ReporterWrapper {
            inner: self,
            _e1: PhantomData,
            _e2: PhantomData,
        }
    }
}

/// The default [`ErrorReporter`] that collects all errors into a vector.
pub struct VecReporter<E: StdError> {
    errors: Vec<E>,
}

impl<E: StdError> Default for VecReporter<E> {
    fn default() -> Self {
        VecReporter { errors: Vec::new() }
    }
}

impl<E: StdError> VecReporter<E> {
    /// Consume the reporter and return everything that was reported, in reporting order.
    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }

    fn into_result(self) -> Result<(), Vec<E>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// An [`ErrorReporter`] that defers to an inner [`ErrorReporter`]
/// by performing type conversion from `E1` into `E2` using `Into`.
pub struct ReporterWrapper<'a, E1: StdError + Into<E2>, E2: StdError, W: ErrorReporter<E2>> {
    inner: &'a mut W,
    _e1: PhantomData<E1>,
    _e2: PhantomData<E2>,
}

impl<E1: StdError + Into<E2>, E2: StdError, W: ErrorReporter<E2>> ErrorReporter<E1>
    for ReporterWrapper<'_, E1, E2, W>
{
    fn report<X: Into<E1>>(&mut self, error: X) {
        self.inner.report(error.into());
    }
}

impl<E: StdError> ErrorReporter<E> for VecReporter<E> {
    fn report<X: Into<E>>(&mut self, error: X) {
        self.errors.push(error.into());
    }
}

/// Implemented by SED-ML elements that can only be validated against an enclosing element.
///
/// Most SED-ML elements reference each other by id (a task references a model and a
/// simulation, a curve references data generators, ...), so their validation needs the
/// enclosing [`crate::SedDocument`] as context. The context is immutable during validation.
///
/// Validation does not terminate when the first error is found. Instead, it collects all
/// errors into the provided [`ErrorReporter`].
pub trait ContextualValidation<Context> {
    /// The type of error that can be reported during validation.
    type Error: StdError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, context: &Context, reporter: &mut R);

    fn validate(&self, context: &Context) -> Result<(), Vec<Self::Error>> {
        let mut reporter = VecReporter::default();
        self.validate_all(context, &mut reporter);
        reporter.into_result()
    }
}

/// Implemented by objects that can be validated on their own.
///
/// Each validation process reports errors using a provided [`ErrorReporter`]. Compared to
/// traits like `From` and `Into`, validation can produce more than one error.
pub trait Validation {
    type Error: StdError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, reporter: &mut R);

    fn validate(&self) -> Result<(), Vec<Self::Error>> {
        let mut reporter = VecReporter::default();
        self.validate_all(&mut reporter);
        reporter.into_result()
    }
}
