//! Virtual machine.
use crate::{
    asm,
    constants::*,
    cpu::PixardisCpu,
    error::PixardisResult,
    interp,
};

/// Construction-time knobs. The defaults suit the sample programs and
/// deterministic test runs.
#[derive(Debug, Clone, Copy)]
pub struct PixardisConf {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub max_call_depth: usize,
}

impl Default for PixardisConf {
    fn default() -> Self {
        Self {
            width: DISPLAY_WIDTH,
            height: DISPLAY_HEIGHT,
            seed: DEFAULT_SEED,
            max_call_depth: MAX_CALL_DEPTH,
        }
    }
}

/// Result of a bounded execution burst.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub success: bool,
    pub error: Option<String>,
}

/// The Pixardis stack machine with its attached framebuffer.
///
/// The host drives it cooperatively: load a program, call
/// [`step`](PixardisVm::step) once per animation frame with a cycle
/// budget, then blit [`framebuffer`](PixardisVm::framebuffer) and
/// drain the print log.
pub struct PixardisVm {
    cpu: PixardisCpu,
    conf: PixardisConf,
}

impl PixardisVm {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_conf(PixardisConf {
            width,
            height,
            ..PixardisConf::default()
        })
    }

    pub fn with_conf(conf: PixardisConf) -> Self {
        Self {
            cpu: PixardisCpu::new(conf.width, conf.height, conf.seed, conf.max_call_depth),
            conf,
        }
    }

    /// Assemble and install a program, replacing any previous one and
    /// rewinding the program counter to 0. The framebuffer and print
    /// buffer survive the load so hosts can inspect post-run state.
    pub fn load_program(&mut self, assembly: &str) -> PixardisResult<()> {
        let program = asm::assemble(assembly)?;
        self.cpu.load(program);
        Ok(())
    }

    /// Execute up to `cycles` instructions.
    pub fn step(&mut self, cycles: usize) -> StepOutcome {
        match interp::run(&mut self.cpu, cycles) {
            Ok(()) => StepOutcome {
                success: true,
                error: None,
            },
            Err(error) => StepOutcome {
                success: false,
                error: Some(error.to_string()),
            },
        }
    }

    /// Discard all machine state and start over with the same
    /// configuration, seed included.
    pub fn reset(&mut self) {
        self.cpu = PixardisCpu::new(
            self.conf.width,
            self.conf.height,
            self.conf.seed,
            self.conf.max_call_depth,
        );
    }

    // ------------------------------------------------------------------------
    // Host views

    /// RGB bytes, `3 * width * height`, row-major from the top-left.
    pub fn framebuffer(&self) -> &[u8] {
        self.cpu.display.as_bytes()
    }

    pub fn width(&self) -> usize {
        self.cpu.display.width()
    }

    pub fn height(&self) -> usize {
        self.cpu.display.height()
    }

    /// Lines accumulated by `print` since the last clear.
    pub fn print_output(&self) -> &[String] {
        &self.cpu.print_buffer
    }

    pub fn clear_print_output(&mut self) {
        self.cpu.print_buffer.clear();
    }

    pub fn halted(&self) -> bool {
        self.cpu.halted
    }

    /// Message recorded when the machine stopped on a fault.
    pub fn error(&self) -> Option<String> {
        self.cpu.error.as_ref().map(|error| error.to_string())
    }

    /// Text rendering of the framebuffer for troubleshooting.
    pub fn dump_display(&self) -> Result<String, std::fmt::Error> {
        self.cpu.display.dump_ascii()
    }
}
