//! Single-entry memoization over a [`QuoteRuntime`].
//!
//! Interactive editing re-prices the same specification many times in a row; when the inputs
//! hash identically the previous evaluation is returned as is.

use std::sync::Mutex;

use crate::cpq::{QuoteEvaluation, QuoteInput, QuoteRuntime};

pub struct MemoizedQuoteRuntime<R> {
    inner: R,
    last: Mutex<Option<(blake3::Hash, QuoteEvaluation)>>,
}

impl<R> MemoizedQuoteRuntime<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, last: Mutex::new(None) }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

/// Content hash of the inputs; `None` when they cannot be serialized.
pub fn input_fingerprint(input: &QuoteInput<'_>) -> Option<blake3::Hash> {
    let bytes = serde_json::to_vec(input).ok()?;
    Some(blake3::hash(&bytes))
}

impl<R> QuoteRuntime for MemoizedQuoteRuntime<R>
where
    R: QuoteRuntime,
{
    fn evaluate(&self, input: QuoteInput<'_>) -> QuoteEvaluation {
        let Some(fingerprint) = input_fingerprint(&input) else {
            return self.inner.evaluate(input);
        };

        if let Ok(guard) = self.last.lock() {
            if let Some((cached, evaluation)) = guard.as_ref() {
                if *cached == fingerprint {
                    tracing::trace!(
                        event_name = "pricing.cache.hit",
                        fingerprint = %fingerprint.to_hex(),
                        "reusing previous evaluation"
                    );
                    return evaluation.clone();
                }
            }
        }

        let evaluation = self.inner.evaluate(input);
        if let Ok(mut guard) = self.last.lock() {
            *guard = Some((fingerprint, evaluation.clone()));
        }
        evaluation
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal::Decimal;

    use super::{input_fingerprint, MemoizedQuoteRuntime};
    use crate::cpq::{
        catalog::RateCatalog, DeterministicQuoteRuntime, QuoteEvaluation, QuoteInput, QuoteRuntime,
    };
    use crate::domain::spec::{ProjectSpecification, ServiceType};

    #[derive(Default)]
    struct CountingRuntime {
        calls: AtomicUsize,
        inner: DeterministicQuoteRuntime<crate::cpq::pricing::DeterministicPricingEngine>,
    }

    impl QuoteRuntime for CountingRuntime {
        fn evaluate(&self, input: QuoteInput<'_>) -> QuoteEvaluation {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.evaluate(input)
        }
    }

    #[test]
    fn identical_inputs_hit_the_cache() {
        let runtime = MemoizedQuoteRuntime::new(CountingRuntime::default());
        let mut spec = ProjectSpecification::new(ServiceType::Project);
        spec.metrics.project.dashboards = 1;
        let catalog = RateCatalog::empty();

        let first = runtime.evaluate(QuoteInput::live(&spec, &catalog));
        let second = runtime.evaluate(QuoteInput::live(&spec, &catalog));

        assert_eq!(first, second);
        assert_eq!(runtime.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn changed_inputs_recompute() {
        let runtime = MemoizedQuoteRuntime::new(CountingRuntime::default());
        let mut spec = ProjectSpecification::new(ServiceType::Project);
        spec.metrics.project.dashboards = 1;
        let catalog = RateCatalog::empty();

        runtime.evaluate(QuoteInput::live(&spec, &catalog));
        spec.commercial_discount = Decimal::from(10);
        let discounted = runtime.evaluate(QuoteInput::live(&spec, &catalog));

        assert_eq!(discounted.breakdown.discount_amount, Decimal::from(550));
        assert_eq!(runtime.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fingerprint_tracks_catalog_contents() {
        let spec = ProjectSpecification::new(ServiceType::Staffing);
        let empty = RateCatalog::empty();
        let populated = RateCatalog::new(vec![crate::domain::rate::RateCatalogEntry::new(
            "Pipe",
            "Media",
            Decimal::from(3_000),
            Decimal::ONE,
        )]);

        assert_ne!(
            input_fingerprint(&QuoteInput::live(&spec, &empty)),
            input_fingerprint(&QuoteInput::live(&spec, &populated))
        );
    }
}
