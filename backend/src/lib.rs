pub mod code_buffer;
pub mod riscv;

pub use code_buffer::CodeBuffer;
pub use riscv::{Assembler, BranchCond, BranchTarget, CompactForm, FReg, Reg, VReg};
