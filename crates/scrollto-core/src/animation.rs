//! Scroll animation engine
//!
//! Combines the easing table and timing utilities into one in-flight scroll
//! animation. Geometry is captured once at construction ([`AnimationPlan`]);
//! each `start()` gets a fresh [`Trajectory`] that a 16ms timer advances until
//! two consecutive ticks land on the same position or `stop()` is called.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;

use crate::config::AnimationConfig;
use crate::dom::{ListenerTarget, NodeId, Viewport};
use crate::easing::EasingName;
use crate::stream::PositionStream;
use crate::timing::{direction, interpolate, progress, tick_duration, TICK_MS};

/// Geometry of one animation, fixed at construction
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPlan {
    /// Scroll offset of the owner when the animation was created
    pub start_position: f64,
    /// Absolute offset to reach, in the scroll owner's coordinates
    pub to: f64,
    /// Travel distance with the resolved offset folded in; may be negative
    pub distance: f64,
    /// Offset resolved from the base offset and the offset map
    pub mapped_offset: f64,
    pub duration_ms: u64,
    pub easing: EasingName,
}

impl AnimationPlan {
    /// Capture the starting geometry
    ///
    /// `to` is viewport-relative when a container scrolls on its own and is
    /// converted into the container's scroll coordinates. Without a container
    /// the distance is `to` itself rather than `|start - to|`; callers rely on
    /// this, so it is kept as-is.
    ///
    /// Outside a browser (`is_browser == false`) the offset map is ignored
    /// because no viewport width is available.
    pub fn new(
        viewport: &dyn Viewport,
        container: Option<NodeId>,
        listener_target: ListenerTarget,
        to: f64,
        config: &AnimationConfig,
        is_browser: bool,
    ) -> Self {
        let is_window = listener_target.is_window();
        let window_scroll = viewport.window_scroll_y();

        let start_position = match container {
            Some(node) if !is_window => viewport.scroll_top(node),
            _ => window_scroll,
        };

        // Nested containers: viewport-relative target to container scroll space
        let to = match container {
            Some(node) if !is_window => to - viewport.bounding_top(node) + start_position,
            _ => to,
        };

        let directional = start_position - to;
        let mut distance = if container.is_some() {
            directional.abs()
        } else {
            to
        };

        let mapped_offset = if is_browser {
            config
                .offset_map
                .resolve(config.offset, viewport.viewport_width())
        } else {
            config.offset
        };

        distance += mapped_offset * if directional <= 0.0 { 1.0 } else { -1.0 };

        Self {
            start_position,
            to,
            distance,
            mapped_offset,
            duration_ms: config.duration_ms,
            easing: config.easing,
        }
    }

    /// Position after `elapsed_ms` of animation
    #[inline]
    pub fn position_at(&self, elapsed_ms: u64) -> f64 {
        let eased = self.easing.apply(progress(elapsed_ms, self.duration_ms));
        interpolate(
            self.start_position,
            direction(self.start_position, self.to),
            self.distance,
            eased,
        )
    }
}

/// Outcome of advancing a trajectory by one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// A new position to emit and apply
    Emit(f64),
    /// Same position as the previous tick; the animation is done
    Converged,
}

/// Per-run animation state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    elapsed_ms: u64,
    current: Option<f64>,
    previous: Option<f64>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one fixed tick
    ///
    /// Convergence uses exact equality between consecutive positions.
    pub fn advance(&mut self, plan: &AnimationPlan) -> Tick {
        self.elapsed_ms += TICK_MS;
        let position = plan.position_at(self.elapsed_ms);
        self.current = Some(position);

        if self.previous == Some(position) {
            return Tick::Converged;
        }
        self.previous = Some(position);
        Tick::Emit(position)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn current_position(&self) -> Option<f64> {
        self.current
    }

    pub fn previous_position(&self) -> Option<f64> {
        self.previous
    }
}

struct Run {
    trajectory: Trajectory,
    timer: Option<JoinHandle<()>>,
    stream: PositionStream,
    /// Bumped by every start and halt; a timer task only ticks its own run
    generation: u64,
}

impl Run {
    /// Cancel the timer and close the stream
    ///
    /// `abort()` only lands at the task's next await. A tick already waiting
    /// on the run lock sees a newer generation and does nothing.
    fn halt(&mut self) {
        self.generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.stream.close();
    }
}

struct Inner {
    viewport: Arc<dyn Viewport>,
    container: Option<NodeId>,
    listener_target: ListenerTarget,
    plan: AnimationPlan,
    run: Mutex<Run>,
}

impl Inner {
    fn lock_run(&self) -> MutexGuard<'_, Run> {
        self.run.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// One tick of run `generation`; returns whether the loop should keep going
    fn tick(&self, generation: u64) -> bool {
        let mut run = self.lock_run();
        if run.generation != generation || run.stream.is_closed() {
            return false;
        }

        match run.trajectory.advance(&self.plan) {
            Tick::Converged => {
                debug!(
                    elapsed_ms = run.trajectory.elapsed_ms(),
                    position = ?run.trajectory.current_position(),
                    "Scroll animation converged"
                );
                run.halt();
                false
            }
            Tick::Emit(position) => {
                run.stream.emit(position);
                self.apply(position.floor());
                true
            }
        }
    }

    fn apply(&self, y: f64) {
        match self.listener_target {
            ListenerTarget::Window => self.viewport.window_scroll_to(0.0, y),
            ListenerTarget::Element(node) => self
                .viewport
                .set_scroll_top(self.container.unwrap_or(node), y),
        }
    }
}

/// One scroll animation driven by a fixed 16ms timer
///
/// Cloning yields another handle to the same animation, so an interrupt
/// handler can hold one and call [`ScrollAnimation::stop`].
#[derive(Clone)]
pub struct ScrollAnimation {
    inner: Arc<Inner>,
}

impl ScrollAnimation {
    /// Create an animation; see [`AnimationPlan::new`] for the geometry rules
    pub fn new(
        viewport: Arc<dyn Viewport>,
        container: Option<NodeId>,
        listener_target: ListenerTarget,
        to: f64,
        config: &AnimationConfig,
        is_browser: bool,
    ) -> Self {
        let plan = AnimationPlan::new(
            viewport.as_ref(),
            container,
            listener_target,
            to,
            config,
            is_browser,
        );
        debug!(
            start = plan.start_position,
            to = plan.to,
            distance = plan.distance,
            offset = plan.mapped_offset,
            easing = %plan.easing,
            "Scroll animation created"
        );
        Self {
            inner: Arc::new(Inner {
                viewport,
                container,
                listener_target,
                plan,
                run: Mutex::new(Run {
                    trajectory: Trajectory::new(),
                    timer: None,
                    stream: PositionStream::new(),
                    generation: 0,
                }),
            }),
        }
    }

    pub fn plan(&self) -> &AnimationPlan {
        &self.inner.plan
    }

    pub fn listener_target(&self) -> ListenerTarget {
        self.inner.listener_target
    }

    /// Start the tick loop and return the replay-buffered position stream
    ///
    /// A loop that is already running is stopped first, closing its stream.
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> PositionStream {
        let mut run = self.inner.lock_run();
        if run.timer.is_some() {
            debug!("Restarting scroll animation, stopping previous run");
            run.halt();
        }
        if run.stream.is_closed() || run.trajectory.elapsed_ms() > 0 {
            run.stream = PositionStream::new();
        }
        run.trajectory = Trajectory::new();
        run.generation += 1;

        let inner = Arc::clone(&self.inner);
        let generation = run.generation;
        let period = tick_duration();
        run.timer = Some(tokio::spawn(async move {
            // First tick one period after start, like a browser interval
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if !inner.tick(generation) {
                    break;
                }
            }
        }));

        run.stream.clone()
    }

    /// Stop the tick loop and close the stream
    ///
    /// Idempotent: stopping an idle animation leaves it idle.
    pub fn stop(&self) {
        let mut run = self.inner.lock_run();
        if run.timer.is_some() {
            debug!(
                elapsed_ms = run.trajectory.elapsed_ms(),
                "Scroll animation stopped"
            );
        }
        run.halt();
    }

    /// Advance one tick without a timer
    ///
    /// For hosts that drive their own frame loop. Returns `false` once the
    /// animation has converged or been stopped.
    pub fn step(&self) -> bool {
        let generation = self.inner.lock_run().generation;
        self.inner.tick(generation)
    }

    /// Whether a timer is armed
    pub fn is_running(&self) -> bool {
        self.inner.lock_run().timer.is_some()
    }

    /// Stream of the current (or most recent) run
    pub fn stream(&self) -> PositionStream {
        self.inner.lock_run().stream.clone()
    }

    /// Snapshot of the current run's state
    pub fn trajectory(&self) -> Trajectory {
        self.inner.lock_run().trajectory.clone()
    }
}
