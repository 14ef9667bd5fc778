//! Hardware vector probe.
//!
//! Generates a small stub that reads `vcsr` and then `vlenb`, executes
//! it once, and folds the observed vector register length into the
//! capability flags. On a CPU without the vector extension either read
//! traps; the trap handler must resume at the continuation point with
//! `a0 = 0`, which the probe reports as "no vector unit".
//!
//! ```text
//!               mv   a0, zero
//! fault_pc:     csrr a0, vcsr
//!               mv   a0, zero
//! fault_pc2:    csrr a0, vlenb
//! continuation: ret
//! ```

use std::io;
use std::sync::OnceLock;

use rvjit_core::{FeatureError, Features};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::assembler::Assembler;
use super::opcodes::{CSR_VCSR, CSR_VLENB};
use super::regs::{A0, ZR};
use crate::CodeBuffer;

const STUB_BUF_SIZE: usize = 4096;

/// `HWCAP` bit advertising the vector extension.
pub const HWCAP_ISA_V: u64 = 1 << (b'V' - b'A');

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe stub: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Feature(#[from] FeatureError),
}

/// Absolute addresses shared with the trap handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultPoints {
    pub fault_pc: usize,
    pub fault_pc2: usize,
    pub continuation_pc: usize,
}

impl FaultPoints {
    /// Where execution resumes after a trap at `pc`, if `pc` is one of
    /// the two fault points. The resumed code must see `a0 = 0`.
    pub fn resume_pc(&self, pc: usize) -> Option<usize> {
        (pc == self.fault_pc || pc == self.fault_pc2).then_some(self.continuation_pc)
    }
}

/// The generated probe sequence and its fault points.
pub struct ProbeStub {
    buf: CodeBuffer,
    points: FaultPoints,
}

impl ProbeStub {
    pub fn generate() -> io::Result<Self> {
        let mut buf = CodeBuffer::new(STUB_BUF_SIZE)?;
        let (fault_pc, fault_pc2, continuation_pc) = {
            let mut asm = Assembler::new(&mut buf, false);
            asm.mv(A0, ZR);
            let fault_pc = asm.pc();
            asm.csrr(A0, CSR_VCSR);
            asm.mv(A0, ZR);
            let fault_pc2 = asm.pc();
            asm.csrr(A0, CSR_VLENB);
            let continuation_pc = asm.pc();
            asm.ret();
            (fault_pc, fault_pc2, continuation_pc)
        };
        let points = FaultPoints {
            fault_pc: buf.addr_of(fault_pc),
            fault_pc2: buf.addr_of(fault_pc2),
            continuation_pc: buf.addr_of(continuation_pc),
        };
        debug!(
            entry = format_args!("{:#x}", buf.addr_of(0)),
            fault_pc = format_args!("{:#x}", points.fault_pc),
            fault_pc2 = format_args!("{:#x}", points.fault_pc2),
            continuation_pc = format_args!("{:#x}", points.continuation_pc),
            size = buf.offset(),
            "generated vector probe stub"
        );
        Ok(Self { buf, points })
    }

    pub fn points(&self) -> FaultPoints {
        self.points
    }

    /// Absolute address of the first instruction.
    pub fn entry(&self) -> usize {
        self.buf.addr_of(0)
    }

    pub fn code(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub fn buffer(&self) -> &CodeBuffer {
        &self.buf
    }
}

/// Runs a probe stub and returns the value left in `a0`.
///
/// Implementations must honour the trap contract of [`FaultPoints`].
pub trait StubExecutor {
    fn execute(&mut self, stub: &ProbeStub) -> Result<u32, ProbeError>;
}

/// Executes the stub on the host CPU.
///
/// Only RISC-V Linux hosts can run the stub; elsewhere the vector unit
/// is reported absent without executing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeExecutor;

impl StubExecutor for NativeExecutor {
    #[cfg(all(target_arch = "riscv64", target_os = "linux"))]
    fn execute(&mut self, stub: &ProbeStub) -> Result<u32, ProbeError> {
        stub.buf.set_executable()?;
        super::trap::flush_icache(stub.entry(), stub.code().len());
        // SAFETY: the buffer holds a complete, executable function that
        // follows the C calling convention and returns through `ra`.
        let entry: extern "C" fn() -> u64 = unsafe { std::mem::transmute(stub.buf.base_ptr()) };
        let a0 = super::trap::with_fault_handler(stub.points, || entry())?;
        Ok(a0 as u32)
    }

    #[cfg(not(all(target_arch = "riscv64", target_os = "linux")))]
    fn execute(&mut self, _stub: &ProbeStub) -> Result<u32, ProbeError> {
        debug!("host cannot run RISC-V code, reporting no vector unit");
        Ok(0)
    }
}

/// Outcome of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    /// Observed vector register length in bytes, 0 if absent.
    pub vlenb: u32,
    /// Fault points of the stub that ran; `None` if no stub was executed.
    pub points: Option<FaultPoints>,
}

impl ProbeResult {
    pub fn supported(&self) -> bool {
        self.vlenb != 0
    }
}

/// Run the probe with `executor` and fold the result into `features`.
///
/// Skipped when `use_rvv` is already off. Absence of the vector unit is
/// not an error: `use_rvv` is cleared and the result reports 0.
pub fn probe_vector_support<E>(
    features: &mut Features,
    executor: &mut E,
) -> Result<ProbeResult, ProbeError>
where
    E: StubExecutor + ?Sized,
{
    if !features.use_rvv {
        features.apply_vector_length(0)?;
        return Ok(ProbeResult {
            vlenb: 0,
            points: None,
        });
    }

    let stub = ProbeStub::generate()?;
    let vlenb = executor.execute(&stub)?;
    features.apply_vector_length(vlenb)?;
    info!(
        vlenb,
        use_rvv = features.use_rvv,
        max_vector_size = ?features.max_vector_size,
        "vector probe finished"
    );
    Ok(ProbeResult {
        vlenb,
        points: Some(stub.points()),
    })
}

/// Whether the kernel advertises the vector extension.
pub fn hwcap_has_vector() -> bool {
    #[cfg(all(target_arch = "riscv64", target_os = "linux"))]
    {
        // SAFETY: getauxval has no preconditions.
        let hwcap = unsafe { libc::getauxval(libc::AT_HWCAP) } as u64;
        hwcap & HWCAP_ISA_V != 0
    }
    #[cfg(not(all(target_arch = "riscv64", target_os = "linux")))]
    {
        false
    }
}

static PROBED_VLENB: OnceLock<u32> = OnceLock::new();

/// Process-wide capability detection: `HWCAP` check, then a native
/// probe. The native probe runs at most once per process.
pub fn detect_vector_support(features: &mut Features) -> Result<ProbeResult, ProbeError> {
    if features.use_rvv && !hwcap_has_vector() {
        warn!("RVV is not supported on this CPU");
        features.use_rvv = false;
    }

    if features.use_rvv {
        if let Some(&vlenb) = PROBED_VLENB.get() {
            debug!(vlenb, "reusing vector probe result");
            features.apply_vector_length(vlenb)?;
            return Ok(ProbeResult {
                vlenb,
                points: None,
            });
        }
    }

    let result = probe_vector_support(features, &mut NativeExecutor)?;
    if result.points.is_some() {
        let _ = PROBED_VLENB.set(result.vlenb);
    }
    Ok(result)
}
