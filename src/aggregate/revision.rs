//! Revision fallback and term truncation.
//!
//! A dataset publishes a chain of revisions ordered from authoritative (`final`)
//! to increasingly preliminary. The authoritative revision lags real time, so a
//! term that ends recently may only be covered by a preliminary one.
//!
//! Selection walks the chain until some revision contains the requested end
//! date. If none does, the revision reaching furthest forward is used and the
//! term is truncated to its last date.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::data::SeriesProvider;
use crate::domain::{Coordinate, Revision, RevisionSeries, RevisionStatus};
use crate::error::TermError;

/// Series chosen for a term, plus how it was chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub series: RevisionSeries,
    pub revision: Revision,
    pub status: RevisionStatus,
    /// End date to use for the term. Differs from the requested end only when a
    /// preliminary series ran out before it.
    pub effective_end: NaiveDate,
}

impl ResolvedSeries {
    pub fn is_truncated(&self, requested_end: NaiveDate) -> bool {
        self.effective_end != requested_end
    }
}

/// Pick the most authoritative revision able to cover `end`.
///
/// `preferred`, when given, is probed first. Each probe is one `fetch_series`
/// call; probing stops at the first sufficient revision.
pub fn resolve_series<P: SeriesProvider + ?Sized>(
    provider: &P,
    coordinate: Coordinate,
    dataset: &str,
    end: NaiveDate,
    preferred: Option<&str>,
) -> Result<ResolvedSeries, TermError> {
    let chain = provider.revision_chain(coordinate, dataset)?;
    let authoritative = chain
        .first()
        .cloned()
        .ok_or_else(|| TermError::EmptyRevisionChain(dataset.to_string()))?;

    let order = probe_order(&chain, dataset, preferred)?;

    // Best insufficient candidate so far: (revision, series).
    let mut fallback: Option<(Revision, RevisionSeries)> = None;

    for revision in order {
        let series = provider.fetch_series(coordinate, dataset, &revision)?;
        debug!(
            dataset,
            %revision,
            last = ?series.last_key(),
            %end,
            "probed revision"
        );

        if series.contains(end) {
            let status = status_of(&revision, &authoritative);
            return Ok(ResolvedSeries {
                series,
                revision,
                status,
                effective_end: end,
            });
        }

        let reaches_further = match &fallback {
            None => true,
            Some((_, best)) => series.last_key() > best.last_key(),
        };
        if reaches_further {
            fallback = Some((revision, series));
        }
    }

    let (revision, series) = fallback.ok_or_else(|| TermError::EmptyRevisionChain(dataset.to_string()))?;
    let status = status_of(&revision, &authoritative);

    let effective_end = match (status, series.last_key()) {
        (RevisionStatus::Preliminary, Some(last)) if last < end => {
            warn!(
                dataset,
                %revision,
                requested_end = %end,
                effective_end = %last,
                "preliminary data ends early; truncating term"
            );
            last
        }
        (_, None) => return Err(TermError::MissingDate(end)),
        _ => end,
    };

    info!(dataset, %revision, status = status.label(), "no revision covers the requested end");
    Ok(ResolvedSeries {
        series,
        revision,
        status,
        effective_end,
    })
}

/// Fetch the series a term should be computed on.
///
/// Without `use_prelim` only the authoritative revision is read and the result
/// is always final.
pub fn select_series<P: SeriesProvider + ?Sized>(
    provider: &P,
    coordinate: Coordinate,
    dataset: &str,
    end: NaiveDate,
    use_prelim: bool,
    preferred: Option<&str>,
) -> Result<ResolvedSeries, TermError> {
    if use_prelim {
        return resolve_series(provider, coordinate, dataset, end, preferred);
    }

    let revision = provider
        .revision_chain(coordinate, dataset)?
        .into_iter()
        .next()
        .ok_or_else(|| TermError::EmptyRevisionChain(dataset.to_string()))?;
    let series = provider.fetch_authoritative(coordinate, dataset)?;
    Ok(ResolvedSeries {
        series,
        revision,
        status: RevisionStatus::Final,
        effective_end: end,
    })
}

fn probe_order(chain: &[Revision], dataset: &str, preferred: Option<&str>) -> Result<Vec<Revision>, TermError> {
    let Some(name) = preferred else {
        return Ok(chain.to_vec());
    };

    let preferred = chain
        .iter()
        .find(|r| r.as_str() == name)
        .cloned()
        .ok_or_else(|| TermError::UnknownRevision {
            dataset: dataset.to_string(),
            revision: name.to_string(),
        })?;

    let mut order = Vec::with_capacity(chain.len());
    order.push(preferred.clone());
    order.extend(chain.iter().filter(|r| **r != preferred).cloned());
    Ok(order)
}

fn status_of(revision: &Revision, authoritative: &Revision) -> RevisionStatus {
    if revision == authoritative {
        RevisionStatus::Final
    } else {
        RevisionStatus::Preliminary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryProvider;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily(start: NaiveDate, end: NaiveDate, value: f64) -> RevisionSeries {
        start.iter_days().take_while(|x| *x <= end).map(|x| (x, value)).collect()
    }

    fn coord() -> Coordinate {
        Coordinate::new(10.0, 20.0)
    }

    fn provider() -> MemoryProvider {
        MemoryProvider::new()
            .with_series("chirps", coord(), "final", daily(d(2020, 1, 1), d(2020, 6, 30), 1.0))
            .with_series("chirps", coord(), "prelim", daily(d(2020, 1, 1), d(2020, 7, 20), 2.0))
    }

    #[test]
    fn final_revision_used_when_it_covers_the_end() {
        let p = provider();
        let r = resolve_series(&p, coord(), "chirps", d(2020, 6, 30), None).unwrap();
        assert_eq!(r.status, RevisionStatus::Final);
        assert_eq!(r.revision, Revision::new("final"));
        assert_eq!(r.effective_end, d(2020, 6, 30));
        assert_eq!(p.series_fetches(), 1);
    }

    #[test]
    fn falls_back_to_prelim_when_final_is_short() {
        let p = provider();
        let r = resolve_series(&p, coord(), "chirps", d(2020, 7, 10), None).unwrap();
        assert_eq!(r.status, RevisionStatus::Preliminary);
        assert_eq!(r.revision, Revision::new("prelim"));
        assert_eq!(r.effective_end, d(2020, 7, 10));
        assert!(!r.is_truncated(d(2020, 7, 10)));
    }

    #[test]
    fn truncates_to_last_prelim_date() {
        let p = provider();
        let r = resolve_series(&p, coord(), "chirps", d(2020, 8, 1), None).unwrap();
        assert_eq!(r.status, RevisionStatus::Preliminary);
        assert_eq!(r.effective_end, d(2020, 7, 20));
        assert!(r.is_truncated(d(2020, 8, 1)));
    }

    #[test]
    fn preferred_revision_probed_first() {
        let p = provider();
        let r = resolve_series(&p, coord(), "chirps", d(2020, 3, 1), Some("prelim")).unwrap();
        assert_eq!(r.revision, Revision::new("prelim"));
        assert_eq!(r.status, RevisionStatus::Preliminary);
        assert_eq!(p.series_fetches(), 1);
    }

    #[test]
    fn unknown_preferred_revision_is_an_error() {
        let err = resolve_series(&provider(), coord(), "chirps", d(2020, 3, 1), Some("draft")).unwrap_err();
        assert!(matches!(err, TermError::UnknownRevision { .. }));
    }

    #[test]
    fn final_only_chain_is_not_truncated() {
        let p = MemoryProvider::new().with_series(
            "chirps",
            coord(),
            "final",
            daily(d(2020, 1, 1), d(2020, 1, 31), 1.0),
        );
        let r = resolve_series(&p, coord(), "chirps", d(2020, 2, 10), None).unwrap();
        assert_eq!(r.status, RevisionStatus::Final);
        assert_eq!(r.effective_end, d(2020, 2, 10));
    }

    #[test]
    fn select_without_prelim_reads_only_final() {
        let p = provider();
        let r = select_series(&p, coord(), "chirps", d(2020, 8, 1), false, Some("prelim")).unwrap();
        assert_eq!(r.status, RevisionStatus::Final);
        assert_eq!(r.revision, Revision::new("final"));
        assert_eq!(r.effective_end, d(2020, 8, 1));
        assert_eq!(p.series_fetches(), 1);
    }

    /// Serves a fixed authoritative series regardless of the chain's own data.
    struct PinnedAuthoritative {
        inner: MemoryProvider,
        pinned: RevisionSeries,
    }

    impl SeriesProvider for PinnedAuthoritative {
        fn revision_chain(&self, coordinate: Coordinate, dataset: &str) -> Result<Vec<Revision>, TermError> {
            self.inner.revision_chain(coordinate, dataset)
        }

        fn fetch_series(
            &self,
            coordinate: Coordinate,
            dataset: &str,
            revision: &Revision,
        ) -> Result<RevisionSeries, TermError> {
            self.inner.fetch_series(coordinate, dataset, revision)
        }

        fn fetch_authoritative(&self, _: Coordinate, _: &str) -> Result<RevisionSeries, TermError> {
            Ok(self.pinned.clone())
        }
    }

    #[test]
    fn select_without_prelim_goes_through_fetch_authoritative() {
        let p = PinnedAuthoritative {
            inner: provider(),
            pinned: daily(d(2020, 1, 1), d(2020, 1, 3), 9.0),
        };
        let r = select_series(&p, coord(), "chirps", d(2020, 1, 3), false, None).unwrap();
        assert_eq!(r.series, p.pinned);
        assert_eq!(r.revision, Revision::new("final"));
        assert_eq!(p.inner.series_fetches(), 0);
    }

    #[test]
    fn fetch_errors_propagate() {
        let err = resolve_series(&provider(), coord(), "era5", d(2020, 1, 1), None).unwrap_err();
        assert_eq!(err, TermError::DatasetNotFound("era5".to_string()));
    }
}
