//! Background preview rendering with latest-wins scheduling.
//!
//! Committing a selection while a render is underway must not pile up work or
//! let an older result land on top of a newer one. [`PreviewSequencer`] is the
//! pure bookkeeping core: it keeps at most one job in flight and a single
//! pending slot that newer submissions overwrite. A completion gate discards
//! any result older than the newest one already seen, so previews are applied
//! in commit order no matter when the renders finish.
//!
//! [`PreviewCoordinator`] couples the sequencer to a worker thread fed over
//! `std::sync::mpsc`. The default renderer runs the cutout and downscales the
//! result to the configured preview size.

use std::sync::{mpsc, Arc};
use std::thread;

use bandcut_core::{cutout, fit_within, FilterType, RasterImage, SelectionRange, TransformError};

/// Identifier for a submitted preview render, increasing in commit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Everything a render needs: the source pixels and the committed band.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub image: Arc<RasterImage>,
    pub range: SelectionRange,
}

/// What [`PreviewSequencer::complete`] decided about a finished render.
#[derive(Debug)]
pub struct Completion {
    /// Whether the result may be applied. Stale results must be discarded.
    pub fresh: bool,
    /// The next job to start, if one was waiting.
    pub next: Option<(RequestId, PreviewRequest)>,
}

/// Pure scheduling state for preview renders.
///
/// `submit` assigns ids and decides whether to dispatch now or queue;
/// `complete` gates results and hands back the queued job. The sequencer
/// never blocks and never touches a thread, which keeps the scheduling
/// rules testable on their own.
#[derive(Debug, Default)]
pub struct PreviewSequencer {
    next_id: u64,
    in_flight: Option<RequestId>,
    pending: Option<(RequestId, PreviewRequest)>,
    last_completed: Option<RequestId>,
}

impl PreviewSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new render request.
    ///
    /// Returns the job to dispatch when the sequencer is idle. While a render
    /// is in flight the request is parked in the pending slot instead, and a
    /// request already parked there is discarded: only the latest parameters
    /// matter once the in-flight render finishes.
    pub fn submit(&mut self, request: PreviewRequest) -> Option<(RequestId, PreviewRequest)> {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        if self.in_flight.is_none() {
            self.in_flight = Some(id);
            Some((id, request))
        } else {
            self.pending = Some((id, request));
            None
        }
    }

    /// Records a finished render and decides what happens next.
    ///
    /// The result is fresh only when `id` is newer than every id completed
    /// before it. A render from an older commit that finishes late therefore
    /// reports stale and must not replace the current preview. Completing the
    /// in-flight job also releases the pending one for dispatch.
    pub fn complete(&mut self, id: RequestId) -> Completion {
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
        let fresh = self.last_completed.map_or(true, |newest| id > newest);
        if fresh {
            self.last_completed = Some(id);
        }
        let next = if self.in_flight.is_none() {
            let job = self.pending.take();
            if let Some((next_id, _)) = &job {
                self.in_flight = Some(*next_id);
            }
            job
        } else {
            None
        };
        Completion { fresh, next }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Newest id whose render has finished, fresh or stale.
    pub fn last_completed(&self) -> Option<RequestId> {
        self.last_completed
    }
}

/// Outcome of a preview render, drained via [`PreviewCoordinator::poll`].
#[derive(Debug)]
pub enum PreviewEvent {
    /// A fresh render finished; the image is ready to display.
    Ready {
        id: RequestId,
        image: Arc<RasterImage>,
    },
    /// The render failed. The previous preview should stay on screen.
    Failed { id: RequestId, error: TransformError },
}

type Renderer = dyn Fn(PreviewRequest) -> Result<RasterImage, TransformError> + Send;
type RenderResult = (RequestId, Result<RasterImage, TransformError>);

/// Drives preview renders on a dedicated worker thread.
///
/// Callers `submit` requests as selections are committed and `poll` from
/// their event loop to collect finished previews. Scheduling follows
/// [`PreviewSequencer`]; the worker only ever sees one job at a time.
pub struct PreviewCoordinator {
    sequencer: PreviewSequencer,
    jobs_tx: Option<mpsc::Sender<(RequestId, PreviewRequest)>>,
    results_rx: mpsc::Receiver<RenderResult>,
    worker: Option<thread::JoinHandle<()>>,
}

impl PreviewCoordinator {
    /// Coordinator with the standard renderer: apply the cutout, then fit the
    /// result within `max_preview_edge` on both axes using bilinear sampling.
    pub fn new(max_preview_edge: u32) -> Self {
        let edge = max_preview_edge.max(1);
        Self::with_renderer(move |request| {
            let cut = cutout(&request.image, &request.range)?;
            Ok(fit_within(&cut, edge, edge, FilterType::Bilinear))
        })
    }

    /// Coordinator with a caller-supplied render function.
    pub fn with_renderer<F>(renderer: F) -> Self
    where
        F: Fn(PreviewRequest) -> Result<RasterImage, TransformError> + Send + 'static,
    {
        let renderer: Box<Renderer> = Box::new(renderer);
        let (jobs_tx, jobs_rx) = mpsc::channel::<(RequestId, PreviewRequest)>();
        let (results_tx, results_rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            while let Ok((id, request)) = jobs_rx.recv() {
                let outcome = renderer(request);
                if results_tx.send((id, outcome)).is_err() {
                    break;
                }
            }
        });
        Self {
            sequencer: PreviewSequencer::new(),
            jobs_tx: Some(jobs_tx),
            results_rx,
            worker: Some(worker),
        }
    }

    /// Queues a render for the given request. Supersedes any still-pending
    /// request that has not started yet.
    pub fn submit(&mut self, request: PreviewRequest) {
        if let Some(job) = self.sequencer.submit(request) {
            self.dispatch(job);
        }
    }

    /// Drains finished renders without blocking.
    ///
    /// Stale results are dropped here; fresh ones come back as events in
    /// completion order. Render failures are reported rather than swallowed
    /// so the caller can tell the user the preview is out of date.
    pub fn poll(&mut self) -> Vec<PreviewEvent> {
        let mut events = Vec::new();
        while let Ok((id, outcome)) = self.results_rx.try_recv() {
            let completion = self.sequencer.complete(id);
            if let Some(job) = completion.next {
                self.dispatch(job);
            }
            if !completion.fresh {
                log::debug!("discarding stale preview result {}", id.value());
                continue;
            }
            match outcome {
                Ok(image) => events.push(PreviewEvent::Ready {
                    id,
                    image: Arc::new(image),
                }),
                Err(error) => {
                    log::warn!("preview render {} failed: {error}", id.value());
                    events.push(PreviewEvent::Failed { id, error });
                }
            }
        }
        events
    }

    /// True when no render is running and none is waiting.
    pub fn is_idle(&self) -> bool {
        !self.sequencer.is_busy() && !self.sequencer.has_pending()
    }

    fn dispatch(&mut self, job: (RequestId, PreviewRequest)) {
        if let Some(tx) = &self.jobs_tx {
            if tx.send(job).is_err() {
                log::warn!("preview worker is gone; dropping render request");
            }
        }
    }
}

impl Drop for PreviewCoordinator {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::debug!("preview worker panicked during shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use bandcut_core::Axis;

    use super::*;

    fn solid_image(width: u32, height: u32) -> Arc<RasterImage> {
        Arc::new(RasterImage::new(
            width,
            height,
            vec![128; (width as usize) * (height as usize) * 3],
        ))
    }

    fn request_with_start(start: f64) -> PreviewRequest {
        PreviewRequest {
            image: solid_image(10, 4),
            range: SelectionRange::new(start, 0.5, Axis::Vertical),
        }
    }

    fn drain_until_idle(coordinator: &mut PreviewCoordinator) -> Vec<PreviewEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        loop {
            events.extend(coordinator.poll());
            if coordinator.is_idle() {
                return events;
            }
            assert!(Instant::now() < deadline, "preview worker did not finish in time");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_submit_when_idle_dispatches_immediately() {
        let mut sequencer = PreviewSequencer::new();

        let job = sequencer.submit(request_with_start(0.1));

        let (id, _) = job.expect("idle sequencer dispatches");
        assert_eq!(id.value(), 1);
        assert!(sequencer.is_busy());
        assert!(!sequencer.has_pending());
    }

    #[test]
    fn test_submit_while_busy_parks_request() {
        let mut sequencer = PreviewSequencer::new();
        sequencer.submit(request_with_start(0.1));

        let job = sequencer.submit(request_with_start(0.2));

        assert!(job.is_none());
        assert!(sequencer.has_pending());
    }

    #[test]
    fn test_newer_submit_replaces_pending() {
        let mut sequencer = PreviewSequencer::new();
        let (first_id, _) = sequencer.submit(request_with_start(0.1)).unwrap();
        sequencer.submit(request_with_start(0.2));
        sequencer.submit(request_with_start(0.3));

        let completion = sequencer.complete(first_id);

        // The middle request never ran; only the latest one is dispatched.
        let (next_id, next_request) = completion.next.expect("pending job dispatched");
        assert_eq!(next_id.value(), 3);
        assert_eq!(next_request.range.start, 0.3);
        assert!(!sequencer.has_pending());
        assert!(sequencer.is_busy());
    }

    #[test]
    fn test_complete_without_pending_goes_idle() {
        let mut sequencer = PreviewSequencer::new();
        let (id, _) = sequencer.submit(request_with_start(0.1)).unwrap();

        let completion = sequencer.complete(id);

        assert!(completion.fresh);
        assert!(completion.next.is_none());
        assert!(!sequencer.is_busy());
    }

    #[test]
    fn test_ids_increase_across_discarded_requests() {
        let mut sequencer = PreviewSequencer::new();
        let (first_id, _) = sequencer.submit(request_with_start(0.1)).unwrap();
        sequencer.submit(request_with_start(0.2));
        sequencer.submit(request_with_start(0.3));
        let completion = sequencer.complete(first_id);
        let (third_id, _) = completion.next.unwrap();

        let third_completion = sequencer.complete(third_id);
        let (fourth_id, _) = sequencer.submit(request_with_start(0.4)).unwrap();

        assert!(third_completion.fresh);
        assert_eq!(fourth_id.value(), 4);
    }

    #[test]
    fn test_late_result_for_older_commit_reports_stale() {
        let mut sequencer = PreviewSequencer::new();
        let (first_id, _) = sequencer.submit(request_with_start(0.1)).unwrap();
        sequencer.submit(request_with_start(0.2));
        let first = sequencer.complete(first_id);
        let (second_id, _) = first.next.unwrap();
        let second = sequencer.complete(second_id);
        assert!(first.fresh);
        assert!(second.fresh);

        // A duplicate delivery of the first result arrives after the second
        // was applied. It must not pass the gate.
        let replay = sequencer.complete(first_id);

        assert!(!replay.fresh);
        assert_eq!(sequencer.last_completed(), Some(second_id));
    }

    #[test]
    fn test_coordinator_renders_latest_request() {
        // Renderer encodes the request's band start in the output width so
        // the test can tell which request produced each event.
        let mut coordinator = PreviewCoordinator::with_renderer(|request| {
            let tag = (request.range.start * 100.0).round() as u32;
            Ok(RasterImage::new(tag, 1, vec![0; (tag as usize) * 3]))
        });

        coordinator.submit(request_with_start(0.01));
        coordinator.submit(request_with_start(0.02));
        coordinator.submit(request_with_start(0.03));

        let events = drain_until_idle(&mut coordinator);

        let widths: Vec<u32> = events
            .iter()
            .map(|event| match event {
                PreviewEvent::Ready { image, .. } => image.width,
                PreviewEvent::Failed { .. } => panic!("render should not fail"),
            })
            .collect();
        // The first request was already running; the middle one was
        // superseded before it could start and never rendered.
        assert_eq!(widths, vec![1, 3]);
    }

    #[test]
    fn test_coordinator_event_ids_strictly_increase() {
        let mut coordinator = PreviewCoordinator::with_renderer(|request| {
            Ok(RasterImage::clone(&request.image))
        });
        for step in 1..=4 {
            coordinator.submit(request_with_start(f64::from(step) * 0.1));
        }

        let events = drain_until_idle(&mut coordinator);

        let ids: Vec<u64> = events
            .iter()
            .map(|event| match event {
                PreviewEvent::Ready { id, .. } => id.value(),
                PreviewEvent::Failed { id, .. } => id.value(),
            })
            .collect();
        assert!(!ids.is_empty());
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_coordinator_reports_render_failure() {
        let mut coordinator =
            PreviewCoordinator::with_renderer(|_| Err(TransformError::EmptyResult));

        coordinator.submit(request_with_start(0.1));
        let events = drain_until_idle(&mut coordinator);

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            PreviewEvent::Failed {
                error: TransformError::EmptyResult,
                ..
            }
        ));

        // The coordinator keeps accepting work after a failure.
        coordinator.submit(request_with_start(0.2));
        let events = drain_until_idle(&mut coordinator);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_default_renderer_cuts_and_fits() {
        let mut coordinator = PreviewCoordinator::new(8);

        // Removing [0.0, 0.25) of 32 columns leaves 24, fitted to 8x1.
        coordinator.submit(PreviewRequest {
            image: solid_image(32, 4),
            range: SelectionRange::new(0.0, 0.25, Axis::Vertical),
        });
        let events = drain_until_idle(&mut coordinator);

        assert_eq!(events.len(), 1);
        match &events[0] {
            PreviewEvent::Ready { image, .. } => {
                assert_eq!(image.width, 8);
                assert_eq!(image.height, 1);
            }
            PreviewEvent::Failed { .. } => panic!("render should not fail"),
        }
    }

    #[test]
    fn test_default_renderer_keeps_small_results_unscaled() {
        let mut coordinator = PreviewCoordinator::new(1920);

        coordinator.submit(PreviewRequest {
            image: solid_image(10, 4),
            range: SelectionRange::new(0.2, 0.5, Axis::Vertical),
        });
        let events = drain_until_idle(&mut coordinator);

        match &events[0] {
            PreviewEvent::Ready { image, .. } => {
                assert_eq!(image.width, 7);
                assert_eq!(image.height, 4);
            }
            PreviewEvent::Failed { .. } => panic!("render should not fail"),
        }
    }

    #[test]
    fn test_default_renderer_surfaces_entire_image_error() {
        let mut coordinator = PreviewCoordinator::new(1920);

        coordinator.submit(PreviewRequest {
            image: solid_image(10, 4),
            range: SelectionRange::new(0.0, 1.0, Axis::Horizontal),
        });
        let events = drain_until_idle(&mut coordinator);

        assert!(matches!(
            events[0],
            PreviewEvent::Failed {
                error: TransformError::EntireImageSelected,
                ..
            }
        ));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
