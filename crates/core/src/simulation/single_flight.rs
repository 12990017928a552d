//! Serialized ticks for concurrent triggers

use std::sync::Mutex;

use crate::classification::DangerClassifier;
use crate::error::ResponseError;
use crate::grid::Board;
use crate::simulation::{IterationOrchestrator, ResetCollaborator, TickReport};

/// Orchestrator behind a lock so that at most one tick runs at a time
///
/// Zone identity and hysteresis depend on strict tick order. Callers that may
/// trigger ticks from several threads share one of these instead of the
/// orchestrator itself.
pub struct SerializedResponse<C, R> {
    inner: Mutex<IterationOrchestrator<C, R>>,
}

impl<C: DangerClassifier, R: ResetCollaborator> SerializedResponse<C, R> {
    /// Wrap an orchestrator
    pub fn new(orchestrator: IterationOrchestrator<C, R>) -> Self {
        Self {
            inner: Mutex::new(orchestrator),
        }
    }

    /// Run one tick, waiting for any tick already in progress
    ///
    /// # Errors
    /// Returns [`ResponseError::LockPoisoned`] if a previous tick panicked,
    /// or whatever the tick itself returns.
    pub fn tick(&self, board: &mut Board) -> Result<TickReport, ResponseError> {
        let mut orchestrator = self
            .inner
            .lock()
            .map_err(|_| ResponseError::LockPoisoned("orchestrator"))?;
        orchestrator.tick(board)
    }

    /// Run `f` with shared access to the orchestrator between ticks
    ///
    /// # Errors
    /// Returns [`ResponseError::LockPoisoned`] if a previous tick panicked.
    pub fn inspect<T>(
        &self,
        f: impl FnOnce(&IterationOrchestrator<C, R>) -> T,
    ) -> Result<T, ResponseError> {
        let orchestrator = self
            .inner
            .lock()
            .map_err(|_| ResponseError::LockPoisoned("orchestrator"))?;
        Ok(f(&orchestrator))
    }

    /// Unwrap the orchestrator
    ///
    /// # Errors
    /// Returns [`ResponseError::LockPoisoned`] if a previous tick panicked.
    pub fn into_inner(self) -> Result<IterationOrchestrator<C, R>, ResponseError> {
        self.inner
            .into_inner()
            .map_err(|_| ResponseError::LockPoisoned("orchestrator"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::ClassificationDelta;
    use crate::config::ResponseConfig;
    use crate::core_types::{GridCoord, Terrain};
    use crate::grid::SpatialIndex;
    use crate::simulation::ExtinguishedCellReset;
    use std::sync::Arc;
    use std::thread;

    /// Classifier that blows up mid-tick
    struct CrashingClassifier;

    impl DangerClassifier for CrashingClassifier {
        fn classify(&mut self, _board: &Board, _spatial: &SpatialIndex) -> ClassificationDelta {
            panic!("classifier crashed");
        }
    }

    #[test]
    fn test_concurrent_ticks_are_serialized() {
        let orchestrator = IterationOrchestrator::new(ResponseConfig::with_board(10, 10)).unwrap();
        let shared = Arc::new(SerializedResponse::new(orchestrator));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let mut board = Board::new(10, 10, Terrain::Forest);
                    board.ignite(GridCoord::new(2, 2), 3.0).unwrap();
                    shared.tick(&mut board).unwrap().tick
                })
            })
            .collect();
        let mut ticks: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ticks.sort_unstable();
        assert_eq!(ticks, vec![1, 2, 3, 4]);
        assert_eq!(shared.inspect(IterationOrchestrator::ticks).unwrap(), 4);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let orchestrator = IterationOrchestrator::with_collaborators(
            ResponseConfig::with_board(10, 10),
            CrashingClassifier,
            Vec::new(),
            ExtinguishedCellReset,
        )
        .unwrap();
        let shared = Arc::new(SerializedResponse::new(orchestrator));

        let worker = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let mut board = Board::new(10, 10, Terrain::Forest);
                let _ = shared.tick(&mut board);
            })
        };
        assert!(worker.join().is_err());

        let mut board = Board::new(10, 10, Terrain::Forest);
        assert!(matches!(
            shared.tick(&mut board),
            Err(ResponseError::LockPoisoned(_))
        ));
        assert!(matches!(
            shared.inspect(IterationOrchestrator::ticks),
            Err(ResponseError::LockPoisoned(_))
        ));
        let Ok(shared) = Arc::try_unwrap(shared) else {
            panic!("worker still holds the orchestrator");
        };
        assert!(matches!(
            shared.into_inner(),
            Err(ResponseError::LockPoisoned(_))
        ));
    }
}
