use std::time::Duration;

use indexmap::IndexSet;

use crate::error::{DashError, DashResult};
use crate::interaction::ZoomCommand;
use crate::render::{ApplyMode, ChartBackend, ChartSurface, ContainerRef, LayoutSpec};

/// Call observed by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    SetOption {
        mode: ApplyMode,
        panes: usize,
        series: usize,
    },
    Clear,
    Resize,
    DispatchZoom(ZoomCommand),
    SubscribeZoom,
}

/// Headless backend used by tests and non-browser hosts.
///
/// It records every lifecycle call so behavior can be asserted without a
/// chart library.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    mounted: IndexSet<ContainerRef>,
    next_serial: u64,
    pub created: usize,
    pub disposed: Vec<u64>,
    pub resize_subscriptions: usize,
    pub deferred_resizes: Vec<Duration>,
}

impl RecordingBackend {
    #[must_use]
    pub fn with_mounted<I, S>(element_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut backend = Self::default();
        for element_id in element_ids {
            backend.mount(ContainerRef::new(element_id));
        }
        backend
    }

    pub fn mount(&mut self, container: ContainerRef) {
        self.mounted.insert(container);
    }

    pub fn unmount(&mut self, container: &ContainerRef) -> bool {
        self.mounted.shift_remove(container)
    }
}

impl ChartBackend for RecordingBackend {
    type Surface = RecordingSurface;

    fn is_mounted(&self, container: &ContainerRef) -> bool {
        self.mounted.contains(container)
    }

    fn init(&mut self, container: &ContainerRef, theme: &str) -> DashResult<Self::Surface> {
        if !self.is_mounted(container) {
            return Err(DashError::Backend(format!(
                "container `{}` is not mounted",
                container.element_id()
            )));
        }
        let serial = self.next_serial;
        self.next_serial += 1;
        self.created += 1;
        Ok(RecordingSurface {
            serial,
            container: container.clone(),
            theme: theme.to_owned(),
            current: None,
            calls: Vec::new(),
            reject_next_apply: false,
        })
    }

    fn dispose(&mut self, surface: Self::Surface) {
        self.disposed.push(surface.serial);
    }

    fn subscribe_resize(&mut self) -> DashResult<()> {
        self.resize_subscriptions += 1;
        Ok(())
    }

    fn schedule_deferred_resize(&mut self, delay: Duration) {
        self.deferred_resizes.push(delay);
    }
}

#[derive(Debug)]
pub struct RecordingSurface {
    serial: u64,
    container: ContainerRef,
    theme: String,
    current: Option<LayoutSpec>,
    calls: Vec<SurfaceCall>,
    /// When set, the next `set_option` fails and leaves the content untouched.
    pub reject_next_apply: bool,
}

impl RecordingSurface {
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    #[must_use]
    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    #[must_use]
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Spec currently shown, `None` after creation or a clear.
    #[must_use]
    pub fn current(&self) -> Option<&LayoutSpec> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(&SurfaceCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.count(|call| matches!(call, SurfaceCall::Clear))
    }

    #[must_use]
    pub fn resize_count(&self) -> usize {
        self.count(|call| matches!(call, SurfaceCall::Resize))
    }

    #[must_use]
    pub fn zoom_subscriptions(&self) -> usize {
        self.count(|call| matches!(call, SurfaceCall::SubscribeZoom))
    }

    #[must_use]
    pub fn dispatched_zooms(&self) -> Vec<&ZoomCommand> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::DispatchZoom(command) => Some(command),
                _ => None,
            })
            .collect()
    }
}

impl ChartSurface for RecordingSurface {
    fn set_option(&mut self, spec: &LayoutSpec, mode: ApplyMode) -> DashResult<()> {
        if self.reject_next_apply {
            self.reject_next_apply = false;
            return Err(DashError::Backend("surface rejected option".to_owned()));
        }
        self.calls.push(SurfaceCall::SetOption {
            mode,
            panes: spec.pane_count(),
            series: spec.series.len(),
        });
        // Merge is only used when the component layout is unchanged, so the
        // merged result equals the incoming spec.
        self.current = Some(spec.clone());
        Ok(())
    }

    fn clear(&mut self) {
        self.calls.push(SurfaceCall::Clear);
        self.current = None;
    }

    fn resize(&mut self) {
        self.calls.push(SurfaceCall::Resize);
    }

    fn dispatch_zoom(&mut self, command: &ZoomCommand) -> DashResult<()> {
        self.calls.push(SurfaceCall::DispatchZoom(command.clone()));
        Ok(())
    }

    fn subscribe_zoom(&mut self) -> DashResult<()> {
        self.calls.push(SurfaceCall::SubscribeZoom);
        Ok(())
    }
}
