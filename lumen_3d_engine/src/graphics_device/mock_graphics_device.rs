/// Mock graphics device for unit tests (no GPU required)
///
/// Every mock object shares one `MockGpuState`. Tests script acquisition and
/// present results through it and inspect what the frame loop did: recorded
/// commands, fence waits, chain constructions, idle waits.
///
/// GPU completion is simulated lazily: a submission stays pending until
/// something waits on its fence (the slot's fence in `acquire_next_image`,
/// the image owner's fence in `submit`, or `wait_idle`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::frame::SurfaceProvider;
use crate::graphics_device::{
    ClearValue, Extent2D, GraphicsDevice, ImageAcquisition, ImagesInFlight, PresentationChain,
    Rect2D, SurfaceFormat, SurfaceStatus, TextureFormat, Viewport, MAX_FRAMES_IN_FLIGHT,
};

// ============================================================================
// Shared state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockCommandBuffer(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockRenderPass(pub u64);

/// One call observed by the mock, in call order
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Acquire { chain: u64, frame: usize },
    Begin(MockCommandBuffer),
    End(MockCommandBuffer),
    BeginRenderPass { cb: MockCommandBuffer, chain: u64, image: u32, clear_values: Vec<ClearValue> },
    SetViewport(MockCommandBuffer, Viewport),
    SetScissor(MockCommandBuffer, Rect2D),
    EndRenderPass(MockCommandBuffer),
    Submit { cb: MockCommandBuffer, chain: u64, image: u32, frame: usize },
    WaitIdle,
    CreateChain { id: u64, extent: Extent2D, previous: Option<u64> },
}

/// State shared by the mock device, its chains and the test
#[derive(Debug)]
pub struct MockGpuState {
    /// Scripted acquisition results, consumed front first
    pub acquire_script: VecDeque<ImageAcquisition>,
    /// Scripted present results, consumed front first (Optimal when empty)
    pub present_script: VecDeque<SurfaceStatus>,
    /// Formats handed to the next chains, consumed front first
    pub format_script: VecDeque<SurfaceFormat>,
    /// Format used when `format_script` is empty
    pub default_format: SurfaceFormat,
    /// Image count of chains built from now on
    pub image_count: usize,
    /// Sync slot count of chains built from now on
    pub frames_in_flight: usize,

    /// Error returned by the next acquisition
    pub acquire_error: Option<Error>,
    /// Error returned by the next submission
    pub submit_error: Option<Error>,
    /// Error returned by the next chain construction
    pub create_chain_error: Option<Error>,

    /// Every call, in order
    pub calls: Vec<MockCall>,
    /// Pending flag per allocated command buffer
    pub command_buffer_pending: Vec<bool>,
    /// Command buffers currently allocated
    pub live_command_buffers: Vec<MockCommandBuffer>,
    /// Times a command buffer was begun while its previous submission was pending
    pub recorded_while_pending: usize,
    /// Number of slot fence waits performed by acquisitions
    pub fence_waits: usize,
    /// Number of waits on an image's previous owner performed by submissions
    pub image_fence_waits: usize,
    /// Highest number of simultaneously unsignaled fences
    pub max_pending_submissions: usize,

    pub chains_created: u64,
    pub chains_alive: usize,
    pub max_chains_alive: usize,
    pub wait_idle_count: usize,
    /// Value of `chains_alive` at each `wait_idle`
    pub chains_alive_at_wait_idle: Vec<usize>,
}

impl MockGpuState {
    fn new() -> Self {
        Self {
            acquire_script: VecDeque::new(),
            present_script: VecDeque::new(),
            format_script: VecDeque::new(),
            default_format: SurfaceFormat::new(TextureFormat::B8G8R8A8_SRGB, TextureFormat::D32_FLOAT),
            image_count: 3,
            frames_in_flight: MAX_FRAMES_IN_FLIGHT,
            acquire_error: None,
            submit_error: None,
            create_chain_error: None,
            calls: Vec::new(),
            command_buffer_pending: Vec::new(),
            live_command_buffers: Vec::new(),
            recorded_while_pending: 0,
            fence_waits: 0,
            image_fence_waits: 0,
            max_pending_submissions: 0,
            chains_created: 0,
            chains_alive: 0,
            max_chains_alive: 0,
            wait_idle_count: 0,
            chains_alive_at_wait_idle: Vec::new(),
        }
    }

    /// Command buffers begun so far, in order
    pub fn begun_command_buffers(&self) -> Vec<MockCommandBuffer> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Begin(cb) => Some(*cb),
                _ => None,
            })
            .collect()
    }

    /// Frame slots passed to submissions so far, in order
    pub fn submitted_frames(&self) -> Vec<usize> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Submit { frame, .. } => Some(*frame),
                _ => None,
            })
            .collect()
    }

    pub fn count_calls(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    fn pending_count(&self) -> usize {
        self.command_buffer_pending.iter().filter(|pending| **pending).count()
    }
}

pub type SharedMockState = Arc<Mutex<MockGpuState>>;

fn lock(state: &SharedMockState) -> MutexGuard<'_, MockGpuState> {
    state.lock().unwrap()
}

// ============================================================================
// Mock Presentation Chain
// ============================================================================

#[derive(Debug)]
pub struct MockPresentationChain {
    pub id: u64,
    pub extent: Extent2D,
    pub format: SurfaceFormat,
    pub image_count: usize,
    pub frames_in_flight: usize,
    /// Command buffer whose submission each slot's fence still guards
    pub slot_pending: Vec<Option<MockCommandBuffer>>,
    pub images_in_flight: ImagesInFlight,
    next_image: u32,
    state: SharedMockState,
}

impl MockPresentationChain {
    fn signal_slot(&mut self, state: &mut MockGpuState, frame_index: usize) {
        if let Some(cb) = self.slot_pending[frame_index].take() {
            state.command_buffer_pending[cb.0] = false;
        }
    }
}

impl PresentationChain for MockPresentationChain {
    type CommandBuffer = MockCommandBuffer;
    type RenderPass = MockRenderPass;

    fn acquire_next_image(&mut self, frame_index: usize) -> Result<ImageAcquisition> {
        let shared = self.state.clone();
        let mut state = lock(&shared);
        state.calls.push(MockCall::Acquire { chain: self.id, frame: frame_index });

        if let Some(error) = state.acquire_error.take() {
            return Err(error);
        }

        state.fence_waits += 1;
        self.signal_slot(&mut state, frame_index);

        if let Some(result) = state.acquire_script.pop_front() {
            return Ok(result);
        }

        let image = self.next_image;
        self.next_image = (self.next_image + 1) % self.image_count as u32;
        Ok(ImageAcquisition::Ready(image))
    }

    fn submit(
        &mut self,
        command_buffer: MockCommandBuffer,
        image_index: u32,
        frame_index: usize,
    ) -> Result<SurfaceStatus> {
        let shared = self.state.clone();
        let mut state = lock(&shared);
        state.calls.push(MockCall::Submit {
            cb: command_buffer,
            chain: self.id,
            image: image_index,
            frame: frame_index,
        });

        if let Some(error) = state.submit_error.take() {
            return Err(error);
        }

        if let Some(owner) = self.images_in_flight.owner(image_index) {
            if self.slot_pending[owner].is_some() {
                state.image_fence_waits += 1;
                self.signal_slot(&mut state, owner);
            }
        }
        self.images_in_flight.claim(image_index, frame_index);

        self.slot_pending[frame_index] = Some(command_buffer);
        state.command_buffer_pending[command_buffer.0] = true;
        let pending = state.pending_count();
        state.max_pending_submissions = state.max_pending_submissions.max(pending);

        Ok(state.present_script.pop_front().unwrap_or(SurfaceStatus::Optimal))
    }

    fn format(&self) -> SurfaceFormat {
        self.format
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn image_count(&self) -> usize {
        self.image_count
    }

    fn frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    fn render_pass(&self) -> MockRenderPass {
        MockRenderPass(self.id)
    }
}

impl Drop for MockPresentationChain {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.chains_alive -= 1;
        }
    }
}

// ============================================================================
// Mock Graphics Device
// ============================================================================

pub struct MockGraphicsDevice {
    pub state: SharedMockState,
}

impl MockGraphicsDevice {
    /// Device plus a handle on its shared state
    pub fn new() -> (Self, SharedMockState) {
        let state = Arc::new(Mutex::new(MockGpuState::new()));
        (Self { state: state.clone() }, state)
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    type CommandBuffer = MockCommandBuffer;
    type Chain = MockPresentationChain;

    fn create_presentation_chain(
        &self,
        extent: Extent2D,
        previous: Option<&MockPresentationChain>,
    ) -> Result<MockPresentationChain> {
        let mut state = lock(&self.state);

        if let Some(error) = state.create_chain_error.take() {
            return Err(error);
        }
        assert!(!extent.is_zero(), "mock chain built with zero extent");

        state.chains_created += 1;
        state.chains_alive += 1;
        state.max_chains_alive = state.max_chains_alive.max(state.chains_alive);
        let id = state.chains_created;
        state.calls.push(MockCall::CreateChain {
            id,
            extent,
            previous: previous.map(|chain| chain.id),
        });

        let format = state.format_script.pop_front().unwrap_or(state.default_format);
        let image_count = state.image_count;
        let frames_in_flight = state.frames_in_flight;

        Ok(MockPresentationChain {
            id,
            extent,
            format,
            image_count,
            frames_in_flight,
            slot_pending: vec![None; frames_in_flight],
            images_in_flight: ImagesInFlight::new(image_count),
            next_image: 0,
            state: self.state.clone(),
        })
    }

    fn allocate_command_buffers(&self, count: usize) -> Result<Vec<MockCommandBuffer>> {
        let mut state = lock(&self.state);
        let first = state.command_buffer_pending.len();
        let buffers: Vec<_> = (first..first + count).map(MockCommandBuffer).collect();
        state.command_buffer_pending.resize(first + count, false);
        state.live_command_buffers.extend(buffers.iter().copied());
        Ok(buffers)
    }

    fn free_command_buffers(&self, command_buffers: &[MockCommandBuffer]) {
        let mut state = lock(&self.state);
        state.live_command_buffers.retain(|cb| !command_buffers.contains(cb));
    }

    fn begin_command_buffer(&self, command_buffer: MockCommandBuffer) -> Result<()> {
        let mut state = lock(&self.state);
        if state.command_buffer_pending[command_buffer.0] {
            state.recorded_while_pending += 1;
        }
        state.calls.push(MockCall::Begin(command_buffer));
        Ok(())
    }

    fn end_command_buffer(&self, command_buffer: MockCommandBuffer) -> Result<()> {
        lock(&self.state).calls.push(MockCall::End(command_buffer));
        Ok(())
    }

    fn cmd_begin_render_pass(
        &self,
        command_buffer: MockCommandBuffer,
        chain: &MockPresentationChain,
        image_index: u32,
        clear_values: &[ClearValue],
    ) {
        lock(&self.state).calls.push(MockCall::BeginRenderPass {
            cb: command_buffer,
            chain: chain.id,
            image: image_index,
            clear_values: clear_values.to_vec(),
        });
    }

    fn cmd_set_viewport(&self, command_buffer: MockCommandBuffer, viewport: &Viewport) {
        lock(&self.state).calls.push(MockCall::SetViewport(command_buffer, *viewport));
    }

    fn cmd_set_scissor(&self, command_buffer: MockCommandBuffer, scissor: &Rect2D) {
        lock(&self.state).calls.push(MockCall::SetScissor(command_buffer, *scissor));
    }

    fn cmd_end_render_pass(&self, command_buffer: MockCommandBuffer) {
        lock(&self.state).calls.push(MockCall::EndRenderPass(command_buffer));
    }

    fn wait_idle(&self) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.push(MockCall::WaitIdle);
        state.wait_idle_count += 1;
        let alive = state.chains_alive;
        state.chains_alive_at_wait_idle.push(alive);
        for pending in state.command_buffer_pending.iter_mut() {
            *pending = false;
        }
        Ok(())
    }
}

// ============================================================================
// Mock Surface
// ============================================================================

/// Poll-driven surface with a scripted extent sequence
///
/// Each `wait_events` call pops the next extent from `extent_script`, which
/// simulates the OS delivering a resize while the window is minimized.
#[derive(Debug)]
pub struct MockSurface {
    pub extent: Extent2D,
    pub extent_script: VecDeque<Extent2D>,
    pub resized: bool,
    pub close_requested: bool,
    pub poll_count: usize,
    pub wait_count: usize,
}

impl MockSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            extent: Extent2D::new(width, height),
            extent_script: VecDeque::new(),
            resized: false,
            close_requested: false,
            poll_count: 0,
            wait_count: 0,
        }
    }

    /// Simulate a resize notification
    pub fn resize(&mut self, width: u32, height: u32) {
        self.extent = Extent2D::new(width, height);
        self.resized = true;
    }
}

impl SurfaceProvider for MockSurface {
    fn current_extent(&self) -> Extent2D {
        self.extent
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }

    fn poll_events(&mut self) {
        self.poll_count += 1;
    }

    fn wait_events(&mut self) {
        self.wait_count += 1;
        if let Some(extent) = self.extent_script.pop_front() {
            self.extent = extent;
            self.resized = true;
        }
    }

    fn was_resized(&self) -> bool {
        self.resized
    }

    fn clear_resized_flag(&mut self) {
        self.resized = false;
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
