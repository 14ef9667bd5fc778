pub mod assembler;
pub mod compress;
pub mod format;
pub mod opcodes;
pub mod probe;
pub mod regs;
pub mod reloc;
pub mod rvc;
pub mod vector;

mod region;
#[cfg(all(target_arch = "riscv64", target_os = "linux"))]
mod trap;

pub use assembler::{Assembler, BranchCond, BranchTarget};
pub use compress::CompactForm;
pub use format::{Aqrl, RoundingMode};
pub use probe::{
    FaultPoints, NativeExecutor, ProbeError, ProbeResult, ProbeStub, StubExecutor,
};
pub use region::RegionGuard;
pub use regs::{FReg, Reg, RegClass, RegEncoding, VReg};
pub use vector::{Lmul, Nf, Sew, VType, VectorMask, Vma, Vta};
