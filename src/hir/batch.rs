//! Ordered, optionally parallel mapping over independent items.

use rayon::prelude::*;

use super::diagnostics::DiagnosticCollector;
use super::error::Result;

/// Map `f` over `items`, preserving input order.
///
/// Each call gets its own [`DiagnosticCollector`]; the collectors are merged
/// into `diagnostics` in input order once every item succeeded, so the
/// outcome does not depend on `parallel`. If any item fails, nothing is
/// merged and one of the errors is returned.
pub(crate) fn map_in_order<T, R, F>(
    items: &[T],
    parallel: bool,
    diagnostics: &mut DiagnosticCollector,
    f: F,
) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T, &mut DiagnosticCollector) -> Result<R> + Sync + Send,
{
    let run = |item: &T| {
        let mut local = DiagnosticCollector::new();
        f(item, &mut local).map(|result| (result, local))
    };

    let outcomes: Vec<(R, DiagnosticCollector)> = if parallel {
        items.par_iter().map(run).collect::<Result<_>>()?
    } else {
        items.iter().map(run).collect::<Result<_>>()?
    };

    let mut results = Vec::with_capacity(outcomes.len());
    for (result, local) in outcomes {
        diagnostics.extend(local);
        results.push(result);
    }
    Ok(results)
}
