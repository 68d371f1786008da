// Library interface for HandsOn
// This allows tests and the CLI to access the crate's functionality

pub mod config;
pub mod config_file;
pub mod constants;
pub mod easing;
pub mod fatigue;
pub mod hotkeys;
pub mod injection;
pub mod motion;
pub mod pointer;
pub mod typing;
pub mod utils;

use anyhow::Result;
use config_file::RuntimeConfig;
use fatigue::FatigueCounter;
use injection::{
    FocusProbe, InputEvent, NoFocusProbe, Pacer, PointerInjector, RecordingInjector, ScreenSize,
    TextInjector, VirtualClock,
};
use log::info;
use motion::Point;
use pointer::PointerActuator;
use std::sync::Arc;
use std::time::Duration;
use typing::instance_lock::InstanceLock;
use typing::{SessionOutcome, Typist};

/// Screen assumed by the recording back-end
pub const DRY_RUN_SCREEN: ScreenSize = ScreenSize::new(1440.0, 900.0);

/// Pointer and keyboard actuation wired to one back-end
pub struct HandsOnCore {
    pub fatigue: Arc<FatigueCounter>,
    runtime: Arc<RuntimeConfig>,
    pointer: PointerActuator,
    typist: Typist,
    recording: Option<(RecordingInjector, VirtualClock)>,
}

impl HandsOnCore {
    fn assemble(
        runtime: Arc<RuntimeConfig>,
        pointer_injector: impl PointerInjector + 'static,
        text_injector: impl TextInjector + 'static,
        focus: impl FocusProbe + 'static,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        let config = runtime.current();
        let lock_path = config
            .lock_file
            .clone()
            .unwrap_or_else(InstanceLock::default_path);

        let fatigue = Arc::new(FatigueCounter::new());
        let pointer = PointerActuator::new(pointer_injector, pacer.clone(), fatigue.clone());
        let typist = Typist::new(text_injector, pacer, InstanceLock::new(lock_path))
            .with_settings(config.typing_settings())
            .with_focus_probe(focus)
            .with_runtime_settings(runtime.clone());

        Self {
            fatigue,
            runtime,
            pointer,
            typist,
            recording: None,
        }
    }

    /// Records events instead of injecting them and never sleeps
    pub fn dry_run(runtime: Arc<RuntimeConfig>) -> Self {
        let recorder = RecordingInjector::new(DRY_RUN_SCREEN);
        recorder.set_cursor(Point::new(
            DRY_RUN_SCREEN.width / 2.0,
            DRY_RUN_SCREEN.height / 2.0,
        ));
        let clock = VirtualClock::new();

        let mut core = Self::assemble(
            runtime,
            recorder.clone(),
            recorder.clone(),
            NoFocusProbe,
            Arc::new(clock.clone()),
        );
        core.recording = Some((recorder, clock));
        info!("Dry run: events are recorded, not injected");
        core
    }

    /// CoreGraphics injection with control hotkeys bound per typing session
    #[cfg(target_os = "macos")]
    pub fn native(runtime: Arc<RuntimeConfig>) -> Result<Self> {
        use anyhow::{bail, Context};
        use hotkeys::{ControlKeys, GlobalHotkeyBinder};
        use injection::macos::{
            check_accessibility_permissions, CoreGraphicsInjector, FrontmostWindowProbe,
            RunLoopPacer,
        };

        if !check_accessibility_permissions() {
            bail!("Accessibility permissions not granted. Enable HandsOn in System Settings > Privacy & Security > Accessibility");
        }

        let keys = ControlKeys::from_config(&runtime.current())
            .context("Invalid control hotkeys in configuration")?;
        let mut core = Self::assemble(
            runtime,
            CoreGraphicsInjector::new(),
            CoreGraphicsInjector::new(),
            FrontmostWindowProbe,
            Arc::new(RunLoopPacer),
        );
        core.typist = core.typist.with_binder(GlobalHotkeyBinder::new(keys));
        Ok(core)
    }

    #[cfg(not(target_os = "macos"))]
    pub fn native(_runtime: Arc<RuntimeConfig>) -> Result<Self> {
        anyhow::bail!("Native input injection is only available on macOS; use --dry-run")
    }

    pub fn pointer(&mut self) -> &mut PointerActuator {
        &mut self.pointer
    }

    pub fn typist(&mut self) -> &mut Typist {
        &mut self.typist
    }

    /// Start a fresh pointer session: fatigue back to zero
    pub fn begin_pointer_session(&self) {
        self.fatigue.reset();
    }

    /// Type with the latest WPM and error rate from the configuration
    pub fn type_text(&mut self, text: &str) -> Result<SessionOutcome> {
        self.typist
            .set_settings(self.runtime.current().typing_settings());
        self.typist.type_text(text)
    }

    /// Events recorded so far (dry run only)
    pub fn recorded_events(&self) -> Option<Vec<InputEvent>> {
        self.recording.as_ref().map(|(recorder, _)| recorder.events())
    }

    /// Text as it would appear after the recorded keystrokes (dry run only)
    pub fn rendered_text(&self) -> Option<String> {
        self.recording
            .as_ref()
            .map(|(recorder, _)| recorder.rendered_text())
    }

    /// Sum of all pauses that were skipped (dry run only)
    pub fn simulated_time(&self) -> Option<Duration> {
        self.recording.as_ref().map(|(_, clock)| clock.total())
    }
}
